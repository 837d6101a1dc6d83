//! `fitplot` library crate.
//!
//! Fits observed x/y data to a parametric model with Levenberg-Marquardt,
//! optionally draws the data and fitted curve with Plotters, and returns the
//! parameters with or without standard errors.
//!
//! The binary (`fitplot`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit-and-plot call can be embedded in other programs
//!
//! ```no_run
//! use fitplot::{FitOptions, FnModel, PlotOptions, Samples, fit_and_plot};
//!
//! let samples = Samples::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![3.0, 5.0, 7.0, 9.0, 11.0]);
//! let line = FnModel::new(2, |x, p: &[f64]| p[0] * x + p[1]);
//! let plot = PlotOptions::default().with_save(true).with_file_name("line.png");
//!
//! let fit = fit_and_plot(&samples, &line, &FitOptions::default(), &plot)?;
//! for p in fit.with_uncertainty() {
//!     println!("{p:.3}");
//! }
//! # Ok::<(), fitplot::FitError>(())
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use app::pipeline::{fit_and_plot, fit_and_plot_on};
pub use domain::{AxisSelection, FitReport, FitResult, OutputMode, Samples, Uncertain};
pub use error::FitError;
pub use fit::{FitOptions, curve_fit};
pub use models::{FnModel, Model, ModelKind};
pub use plot::{PlotOptions, PlotStyle};
