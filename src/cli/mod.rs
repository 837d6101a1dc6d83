//! Command-line parsing for the `fitplot` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and plotting code; `app` maps these structs onto `FitOptions` and
//! `PlotOptions`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fitplot", version, about = "Nonlinear least-squares curve fitting with plots")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG`
    /// overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a built-in model to x,y[,sigma] data from a CSV file.
    Fit(FitArgs),
    /// Generate a seeded noisy sample from a model and fit it back.
    Demo(DemoArgs),
    /// List the built-in models.
    Models,
}

/// Options for `fitplot fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// CSV file with `x`, `y` and optional `sigma` columns.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Model to fit.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// The CSV has no header row; columns are x, y[, sigma].
    #[arg(long)]
    pub no_header: bool,

    #[command(flatten)]
    pub solver: SolverArgs,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// Options for `fitplot demo`.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Model to sample from and fit.
    #[arg(short, long, value_enum, default_value_t = ModelKind::Linear)]
    pub model: ModelKind,

    /// True parameters, comma-separated (defaults to all ones).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub params: Vec<f64>,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub samples: usize,

    #[arg(long, default_value_t = 0.0)]
    pub x_min: f64,

    #[arg(long, default_value_t = 10.0)]
    pub x_max: f64,

    /// Standard deviation of the Gaussian noise added to y.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Attach the noise level as per-point y errors (weighted fit).
    #[arg(long)]
    pub with_errors: bool,

    #[command(flatten)]
    pub solver: SolverArgs,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// Solver controls.
#[derive(Debug, Args, Clone)]
pub struct SolverArgs {
    /// Initial guess, comma-separated (defaults to all ones).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub guess: Vec<f64>,

    /// Treat y errors as absolute instead of relative weights.
    #[arg(long)]
    pub absolute_sigma: bool,

    /// Maximum solver iterations, as a multiple of (parameters + 1).
    #[arg(long, default_value_t = 100)]
    pub patience: usize,
}

/// What to print.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Print the fit result as JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,

    /// Print parameter values only, without standard errors.
    #[arg(long)]
    pub bare: bool,

    /// Also print the per-sample residual table.
    #[arg(long)]
    pub residuals: bool,
}

/// Plot cosmetics and destinations.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Render the plot in the terminal. Conflicts with `--json`.
    #[arg(long, conflicts_with = "json")]
    pub show: bool,

    /// Write the plot to an image file (`<title>.png` unless `--output`).
    #[arg(long)]
    pub save: bool,

    /// Image file; implies `--save`. A `.svg` extension writes SVG.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "Title")]
    pub title: String,

    #[arg(long, default_value = "X")]
    pub x_label: String,

    #[arg(long, default_value = "Y")]
    pub y_label: String,

    /// Log-scaled axes: x, y, both or none.
    #[arg(long, value_name = "AXES")]
    pub log_scale: Option<String>,

    /// Scientific-notation tick labels: x, y, both or none.
    #[arg(long, value_name = "AXES")]
    pub sci: Option<String>,

    /// Marker radius in pixels.
    #[arg(long, default_value_t = 3)]
    pub marker_size: u32,

    #[arg(long, default_value_t = 200)]
    pub dpi: u32,

    /// Figure width in inches.
    #[arg(long, default_value_t = 6.4)]
    pub width: f64,

    /// Figure height in inches.
    #[arg(long, default_value_t = 4.8)]
    pub height: f64,

    /// Terminal plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub columns: usize,

    /// Terminal plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub rows: usize,

    #[arg(long)]
    pub no_grid: bool,

    #[arg(long)]
    pub no_legend: bool,
}
