//! Curve fitting.
//!
//! Responsibilities:
//!
//! - validate the sample set against the model arity
//! - run the Levenberg-Marquardt solver on weighted residuals
//! - estimate the parameter covariance and standard errors

pub mod fitter;

pub use fitter::*;
