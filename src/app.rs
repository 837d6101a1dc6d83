//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads or generates the sample set
//! - runs the fit (and optional plot) pipeline
//! - prints the summary, JSON or residual table

use std::io::Write;

use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, DemoArgs, FitArgs, PlotArgs, ReportArgs, SolverArgs};
use crate::data::{SampleSpec, generate_samples};
use crate::domain::{FitResult, OutputMode, Samples};
use crate::error::FitError;
use crate::fit::FitOptions;
use crate::models::{Model, ModelKind};
use crate::plot::{PlotOptions, PlotStyle};
use crate::report::{ModelInfo, compute_residuals, format_fit_summary, format_residuals, rms};

pub mod pipeline;

/// Entry point for the `fitplot` binary.
pub fn run() -> Result<(), FitError> {
    // A local `.env` may carry `RUST_LOG`; it must be loaded before the logger.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Models => {
            print!("{}", format_model_list());
            Ok(())
        }
    }
}

/// Initialise `env_logger` with a compact `LEVEL [module]: message` format.
///
/// `verbose` raises the default level (0 = warn, 1 = info, 2 = debug,
/// 3+ = trace); an explicit `RUST_LOG` wins.
pub fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let _ = env_logger::builder()
        .format(|buf, record| {
            let module = record
                .module_path()
                .and_then(|m| m.split("::").last())
                .unwrap_or("fitplot");
            writeln!(buf, "{:5} [{}]: {}", record.level(), module, record.args())
        })
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), FitError> {
    // Selectors are checked before the CSV is touched.
    let plot = plot_options_from_args(&args.plot)?;
    let samples = crate::io::load_samples(&args.csv, !args.no_header)?;
    let fit_opts = fit_options_from_args(&args.solver);

    fit_and_report(args.model, &samples, &fit_opts, &plot, &args.report)
}

fn handle_demo(args: DemoArgs) -> Result<(), FitError> {
    let plot = plot_options_from_args(&args.plot)?;
    let params = if args.params.is_empty() {
        vec![1.0; args.model.param_count()]
    } else {
        args.params.clone()
    };
    let spec = SampleSpec {
        n: args.samples,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
        with_errors: args.with_errors,
    };
    let samples = generate_samples(args.model, &params, &spec)?;
    log::info!(
        "Generated {} {} samples (seed {}, true params {:?})",
        samples.len(),
        args.model.display_name(),
        args.seed,
        params
    );
    let fit_opts = fit_options_from_args(&args.solver);

    fit_and_report(args.model, &samples, &fit_opts, &plot, &args.report)
}

fn fit_and_report(
    model: ModelKind,
    samples: &Samples,
    fit_opts: &FitOptions,
    plot: &PlotOptions,
    report: &ReportArgs,
) -> Result<(), FitError> {
    let fit = pipeline::fit_and_plot(samples, &model, fit_opts, plot)?;
    let mode = if report.bare { OutputMode::Bare } else { OutputMode::WithUncertainty };

    if report.json {
        println!("{}", format_json(model, &fit, mode)?);
        return Ok(());
    }

    let info = ModelInfo {
        name: model.display_name(),
        formula: model.formula(),
        param_names: model.param_names(),
    };
    print!("{}", format_fit_summary(&info, samples, &fit, mode));

    if report.residuals {
        let residuals = compute_residuals(samples, &model, &fit)?;
        println!();
        print!("{}", format_residuals(&residuals));
        println!("RMS residual: {:.6}", rms(&residuals));
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    model: ModelKind,
    param_names: &'a [&'a str],
    #[serde(flatten)]
    params: JsonParams<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonParams<'a> {
    Full(&'a FitResult),
    Bare { params: &'a [f64] },
}

/// JSON view of a fit. Non-finite numbers (infinite standard errors) are
/// written as `null`.
fn format_json(model: ModelKind, fit: &FitResult, mode: OutputMode) -> Result<String, FitError> {
    let params = match mode {
        OutputMode::WithUncertainty => JsonParams::Full(fit),
        OutputMode::Bare => JsonParams::Bare { params: fit.values() },
    };
    let out = JsonOutput {
        model,
        param_names: model.param_names(),
        params,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

fn format_model_list() -> String {
    let mut out = String::new();
    for kind in ModelKind::ALL {
        let name = clap::ValueEnum::to_possible_value(&kind)
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<12} {:<36} ({} params: {})\n",
            name,
            kind.formula(),
            kind.param_count(),
            kind.param_names().join(", ")
        ));
    }
    out
}

pub fn fit_options_from_args(args: &SolverArgs) -> FitOptions {
    let opts = FitOptions::default()
        .with_absolute_sigma(args.absolute_sigma)
        .with_patience(args.patience);
    if args.guess.is_empty() {
        opts
    } else {
        opts.with_guess(args.guess.clone())
    }
}

pub fn plot_options_from_args(args: &PlotArgs) -> Result<PlotOptions, FitError> {
    let mut style = PlotStyle::default()
        .with_title(&args.title)
        .with_labels(&args.x_label, &args.y_label)
        .with_marker_size(args.marker_size)
        .with_log_scale(args.log_scale.as_deref())?
        .with_scientific_notation(args.sci.as_deref())?;
    style.grid = !args.no_grid;
    style.legend = !args.no_legend;

    let mut opts = PlotOptions::default()
        .with_style(style)
        .with_show(args.show)
        .with_save(args.save || args.output.is_some());
    if let Some(path) = &args.output {
        opts = opts.with_file_name(path);
    }
    opts.dpi = args.dpi;
    opts.figure_size = (args.width, args.height);
    opts.terminal_size = (args.columns, args.rows);

    opts.validate()?;
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{AxisSelection, FitReport};
    use nalgebra::DMatrix;

    fn plot_args(extra: &[&str]) -> PlotArgs {
        let mut argv = vec!["fitplot", "demo"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Demo(args) => args.plot,
            _ => unreachable!(),
        }
    }

    #[test]
    fn plot_args_map_onto_options() {
        let args = plot_args(&["--output", "fig.svg", "--log-scale", "x", "--no-grid", "--title", "Run 7"]);
        let opts = plot_options_from_args(&args).unwrap();

        assert!(opts.save && !opts.show);
        assert_eq!(opts.output_path(), std::path::PathBuf::from("fig.svg"));
        assert_eq!(opts.style.log_scale, Some(AxisSelection::X));
        assert_eq!(opts.style.scientific_notation, None);
        assert!(!opts.style.grid && opts.style.legend);
        assert_eq!(opts.style.title, "Run 7");
    }

    #[test]
    fn unknown_selector_is_an_invalid_option() {
        let args = plot_args(&["--sci", "z"]);
        let err = plot_options_from_args(&args).unwrap_err();
        assert!(matches!(err, FitError::InvalidOption { option: "scientific_notation", .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_guess_means_default() {
        let args = SolverArgs {
            guess: Vec::new(),
            absolute_sigma: true,
            patience: 10,
        };
        let opts = fit_options_from_args(&args);
        assert!(opts.initial_guess.is_none());
        assert!(opts.absolute_sigma);
        assert_eq!(opts.patience, 10);
    }

    #[test]
    fn json_output_nulls_infinite_errors_and_honours_bare_mode() {
        let fit = FitResult {
            params: vec![2.0, 1.0],
            std_errors: vec![f64::INFINITY, 0.5],
            covariance: DMatrix::identity(2, 2),
            report: FitReport {
                evaluations: 3,
                termination: "ResidualsZero".into(),
                chi_square: 0.0,
                dof: 0,
                absolute_sigma: false,
            },
        };

        let full: serde_json::Value =
            serde_json::from_str(&format_json(ModelKind::Linear, &fit, OutputMode::WithUncertainty).unwrap())
                .unwrap();
        assert_eq!(full["model"], "linear");
        assert_eq!(full["std_errors"][0], serde_json::Value::Null);
        assert_eq!(full["std_errors"][1], 0.5);
        assert_eq!(full["report"]["dof"], 0);

        let bare: serde_json::Value =
            serde_json::from_str(&format_json(ModelKind::Linear, &fit, OutputMode::Bare).unwrap()).unwrap();
        assert_eq!(bare["params"][0], 2.0);
        assert!(bare.get("std_errors").is_none());
    }

    #[test]
    fn model_list_names_every_model() {
        let list = format_model_list();
        assert_eq!(list.lines().count(), ModelKind::ALL.len());
        assert!(list.contains("power"));
        assert!(list.contains("a*exp(b*x)"));
    }
}
