//! Plotting: configuration, Plotters charts, image export and terminal display.

pub mod ascii;
pub mod chart;
pub mod export;
pub mod options;

pub use ascii::render_ascii_plot;
pub use chart::draw_fit;
pub use export::{ImageKind, save_figure};
pub use options::{PlotOptions, PlotStyle};

use crate::domain::{FitResult, Samples};
use crate::error::FitError;
use crate::models::Model;

/// The fitted curve: `model` evaluated at the sample x-values with the fitted
/// parameters, ordered by x so it draws as a single line.
pub fn fitted_curve<M>(samples: &Samples, model: &M, fit: &FitResult) -> Result<Vec<(f64, f64)>, FitError>
where
    M: Model + ?Sized,
{
    let y = model.evaluate(&samples.x, fit.values());
    if y.len() != samples.len() {
        return Err(FitError::Shape(format!(
            "model returned {} values for {} x-values",
            y.len(),
            samples.len()
        )));
    }

    let mut curve: Vec<(f64, f64)> = samples.x.iter().copied().zip(y).collect();
    curve.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitReport;
    use crate::models::ModelKind;
    use nalgebra::DMatrix;

    #[test]
    fn curve_is_sorted_by_x() {
        let samples = Samples::new(vec![3.0, 1.0, 2.0], vec![0.0, 0.0, 0.0]);
        let fit = FitResult {
            params: vec![2.0, 1.0],
            std_errors: vec![0.0, 0.0],
            covariance: DMatrix::zeros(2, 2),
            report: FitReport {
                evaluations: 1,
                termination: "ResidualsZero".into(),
                chi_square: 0.0,
                dof: 1,
                absolute_sigma: false,
            },
        };

        let curve = fitted_curve(&samples, &ModelKind::Linear, &fit).unwrap();
        assert_eq!(curve, vec![(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]);
    }
}
