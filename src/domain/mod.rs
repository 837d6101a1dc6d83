//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observed sample set (`Samples`)
//! - plot option selectors (`AxisSelection`)
//! - fit outputs (`FitResult`, `FitReport`, `Uncertain`)

pub mod types;

pub use types::*;
