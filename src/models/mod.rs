//! Parametric models.
//!
//! Models are small, pure evaluators so that the fitting and plotting code can
//! stay generic over them.

pub mod model;

pub use model::*;
