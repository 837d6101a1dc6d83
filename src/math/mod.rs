//! Numerical helpers around the solver: finite-difference Jacobians and
//! SVD-based covariance estimation.

pub mod covariance;
pub mod jacobian;

pub use covariance::*;
pub use jacobian::*;
