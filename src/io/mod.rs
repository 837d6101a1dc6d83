//! Input helpers.
//!
//! - CSV ingest of sample sets (`ingest`)

pub mod ingest;

pub use ingest::*;
