//! Shared "fit and plot" workflow used by the library API and the CLI.
//!
//! validate options -> fit -> (optional) render -> return parameters
//!
//! Two entry points:
//! - [`fit_and_plot`] owns the figure: it decides whether to render at all,
//!   writes the image file and prints the terminal plot.
//! - [`fit_and_plot_on`] draws onto a caller's Plotters area and leaves
//!   presenting it to the caller, so several fits can share one figure.

use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};

use crate::domain::{FitResult, Samples};
use crate::error::FitError;
use crate::fit::{FitOptions, curve_fit};
use crate::models::Model;
use crate::plot::{PlotOptions, PlotStyle, draw_fit, fitted_curve, render_ascii_plot, save_figure};

/// Fit `model` to `samples` and optionally render the result.
///
/// Plot options are validated before the solver runs. With neither `show`
/// nor `save` set, nothing is drawn and no file is written.
pub fn fit_and_plot<M>(
    samples: &Samples,
    model: &M,
    fit_opts: &FitOptions,
    plot: &PlotOptions,
) -> Result<FitResult, FitError>
where
    M: Model + ?Sized,
{
    plot.validate()?;

    let fit = curve_fit(samples, model, fit_opts)?;
    if !plot.is_rendering() {
        return Ok(fit);
    }

    let data: Vec<(f64, f64)> = samples.points().collect();
    let curve = fitted_curve(samples, model, &fit)?;

    if plot.save {
        save_figure(&data, &curve, plot)?;
    }
    if plot.show {
        let (width, height) = plot.terminal_size;
        println!("{}", render_ascii_plot(&data, &curve, &plot.style, width, height));
    }

    Ok(fit)
}

/// Fit `model` to `samples` and draw the result onto `area`.
///
/// The area is not presented; the caller owns the root and decides when the
/// figure is complete.
pub fn fit_and_plot_on<DB, M>(
    area: &DrawingArea<DB, Shift>,
    samples: &Samples,
    model: &M,
    fit_opts: &FitOptions,
    style: &PlotStyle,
) -> Result<FitResult, FitError>
where
    DB: DrawingBackend,
    M: Model + ?Sized,
{
    let fit = curve_fit(samples, model, fit_opts)?;

    let data: Vec<(f64, f64)> = samples.points().collect();
    let curve = fitted_curve(samples, model, &fit)?;
    draw_fit(area, &data, &curve, style)?;

    Ok(fit)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;

    use approx::assert_abs_diff_eq;
    use plotters::prelude::*;

    use super::*;
    use crate::models::{FnModel, ModelKind};

    fn line_samples() -> Samples {
        Samples::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![3.0, 5.0, 7.0, 9.0, 11.0])
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fitplot-pipeline-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn without_show_or_save_nothing_is_written() {
        let title = format!("fitplot-no-render-{}", std::process::id());
        let plot = PlotOptions::default().with_style(PlotStyle::default().with_title(&title));
        let default_path = plot.output_path();

        let fit = fit_and_plot(&line_samples(), &ModelKind::Linear, &FitOptions::default(), &plot)
            .unwrap();

        assert_abs_diff_eq!(fit.params[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.params[1], 1.0, epsilon = 1e-6);
        assert!(!default_path.exists());
    }

    #[test]
    fn bad_plot_options_fail_before_the_model_is_called() {
        let calls = Cell::new(0usize);
        let model = FnModel::new(2, |x, p: &[f64]| {
            calls.set(calls.get() + 1);
            p[0] * x + p[1]
        });
        let mut plot = PlotOptions::default().with_save(true);
        plot.dpi = 0;

        let err = fit_and_plot(&line_samples(), &model, &FitOptions::default(), &plot).unwrap_err();
        assert!(matches!(err, FitError::InvalidOption { option: "figure_size", .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn oversized_figure_fails_before_fitting() {
        let calls = Cell::new(0usize);
        let model = FnModel::new(2, |x, p: &[f64]| {
            calls.set(calls.get() + 1);
            p[0] * x + p[1]
        });
        let mut plot = PlotOptions::default().with_save(true);
        plot.dpi = u32::MAX;

        let err = fit_and_plot(&line_samples(), &model, &FitOptions::default(), &plot).unwrap_err();
        assert!(matches!(err, FitError::InvalidOption { option: "figure_size", .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn save_writes_the_requested_file() {
        let dir = scratch_dir("save");
        let path = dir.join("line.svg");
        let mut plot = PlotOptions::default()
            .with_style(PlotStyle::default().with_title("Line"))
            .with_save(true)
            .with_file_name(&path);
        plot.dpi = 50;

        let fit = fit_and_plot(&line_samples(), &ModelKind::Linear, &FitOptions::default(), &plot)
            .unwrap();
        assert_abs_diff_eq!(fit.params[0], 2.0, epsilon = 1e-6);

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Line"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn save_into_missing_directory_is_an_io_error() {
        let dir = scratch_dir("missing");
        let path = dir.join("absent").join("line.png");
        let mut plot = PlotOptions::default().with_save(true).with_file_name(&path);
        plot.dpi = 50;

        let err = fit_and_plot(&line_samples(), &ModelKind::Linear, &FitOptions::default(), &plot)
            .unwrap_err();
        assert!(matches!(err, FitError::Io { .. }));
        assert_eq!(err.exit_code(), 4);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn two_fits_share_one_caller_figure() {
        let decay = Samples::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            (0..5).map(|i| 3.0 * (-0.5 * i as f64).exp()).collect::<Vec<_>>(),
        );

        let mut svg = String::new();
        let (line_fit, decay_fit) = {
            let root = SVGBackend::with_string(&mut svg, (640, 960)).into_drawing_area();
            let panels = root.split_evenly((2, 1));
            let line_fit = fit_and_plot_on(
                &panels[0],
                &line_samples(),
                &ModelKind::Linear,
                &FitOptions::default(),
                &PlotStyle::default().with_title("upper panel"),
            )
            .unwrap();
            let decay_fit = fit_and_plot_on(
                &panels[1],
                &decay,
                &ModelKind::Exponential,
                &FitOptions::default().with_guess(vec![1.0, -0.1]),
                &PlotStyle::default().with_title("lower panel"),
            )
            .unwrap();
            root.present().unwrap();
            (line_fit, decay_fit)
        };

        assert_abs_diff_eq!(line_fit.params[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(decay_fit.params[0], 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(decay_fit.params[1], -0.5, epsilon = 1e-5);
        assert!(svg.contains("upper panel") && svg.contains("lower panel"));
    }
}
