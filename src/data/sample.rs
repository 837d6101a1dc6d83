//! Seeded synthetic samples drawn from a built-in model.
//!
//! Used by `fitplot demo` and by tests that need realistic noisy data without
//! shipping fixture files. The same seed always yields the same samples.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Samples;
use crate::error::FitError;
use crate::models::{Model, ModelKind};

/// How to lay out and perturb a synthetic sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    /// Number of points, evenly spaced over `[x_min, x_max]`.
    pub n: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the additive Gaussian noise.
    pub noise: f64,
    pub seed: u64,
    /// Attach `noise` as the per-point y error (ignored when `noise == 0`).
    pub with_errors: bool,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            n: 50,
            x_min: 0.0,
            x_max: 10.0,
            noise: 0.1,
            seed: 42,
            with_errors: false,
        }
    }
}

/// Generate samples of `kind` at the true parameters `params`.
pub fn generate_samples(kind: ModelKind, params: &[f64], spec: &SampleSpec) -> Result<Samples, FitError> {
    if params.len() != kind.param_count() {
        return Err(FitError::Shape(format!(
            "{} takes {} parameters, got {}",
            kind.display_name(),
            kind.param_count(),
            params.len()
        )));
    }
    if spec.n < 2 {
        return Err(FitError::InvalidData("sample count must be >= 2".into()));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_max > spec.x_min) {
        return Err(FitError::InvalidData(format!(
            "invalid x range [{}, {}]",
            spec.x_min, spec.x_max
        )));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0) {
        return Err(FitError::InvalidData(format!("invalid noise level {}", spec.noise)));
    }

    let step = (spec.x_max - spec.x_min) / (spec.n - 1) as f64;
    let x: Vec<f64> = (0..spec.n).map(|i| spec.x_min + step * i as f64).collect();
    let mut y = kind.evaluate(&x, params);

    if spec.noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let normal = Normal::new(0.0, spec.noise)
            .map_err(|e| FitError::InvalidData(format!("noise distribution error: {e}")))?;
        for yi in &mut y {
            *yi += normal.sample(&mut rng);
        }
    }

    if y.iter().any(|v| !v.is_finite()) {
        return Err(FitError::InvalidData(format!(
            "{} is not finite on [{}, {}] with these parameters",
            kind.display_name(),
            spec.x_min,
            spec.x_max
        )));
    }

    let samples = Samples::new(x, y);
    if spec.with_errors && spec.noise > 0.0 {
        Ok(samples.with_errors(vec![spec.noise; spec.n]))
    } else {
        Ok(samples)
    }
}
