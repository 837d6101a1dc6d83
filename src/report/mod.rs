//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, Samples};
use crate::error::FitError;
use crate::models::Model;

/// One observed sample against the fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    /// `y_obs - y_fit`.
    pub residual: f64,
    /// Residual divided by the sample's y error (equal to `residual` when
    /// unweighted).
    pub normalized: f64,
}

/// Compute fitted values and residuals for each sample, in input order.
pub fn compute_residuals<M>(samples: &Samples, model: &M, fit: &FitResult) -> Result<Vec<Residual>, FitError>
where
    M: Model + ?Sized,
{
    let fitted = model.evaluate(&samples.x, fit.values());
    if fitted.len() != samples.len() {
        return Err(FitError::Shape(format!(
            "model returned {} values for {} x-values",
            fitted.len(),
            samples.len()
        )));
    }

    let mut out = Vec::with_capacity(samples.len());
    for (i, y_fit) in fitted.into_iter().enumerate() {
        if !y_fit.is_finite() {
            return Err(FitError::InvalidData(format!(
                "non-finite model prediction at x = {}",
                samples.x[i]
            )));
        }
        let residual = samples.y[i] - y_fit;
        out.push(Residual {
            x: samples.x[i],
            y_obs: samples.y[i],
            y_fit,
            residual,
            normalized: residual / samples.sigma(i),
        });
    }
    Ok(out)
}

/// Root mean square of the raw residuals.
pub fn rms(residuals: &[Residual]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let ss: f64 = residuals.iter().map(|r| r.residual * r.residual).sum();
    (ss / residuals.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{FitOptions, curve_fit};
    use crate::models::ModelKind;
    use approx::assert_abs_diff_eq;

    #[test]
    fn residuals_follow_input_order_and_weights() {
        let samples = Samples::new(vec![3.0, 1.0, 2.0, 4.0], vec![7.5, 3.0, 5.0, 9.0])
            .with_errors(vec![0.5, 1.0, 1.0, 1.0]);
        let fit = curve_fit(&samples, &ModelKind::Linear, &FitOptions::default()).unwrap();
        let res = compute_residuals(&samples, &ModelKind::Linear, &fit).unwrap();

        assert_eq!(res.len(), 4);
        assert_eq!(res[0].x, 3.0);
        for (r, s) in res.iter().zip([0.5, 1.0, 1.0, 1.0]) {
            assert_abs_diff_eq!(r.residual, r.y_obs - r.y_fit, epsilon = 1e-12);
            assert_abs_diff_eq!(r.normalized, r.residual / s, epsilon = 1e-12);
        }
        assert!(rms(&res) > 0.0);
    }

    #[test]
    fn rms_of_perfect_fit_is_zero() {
        let samples = Samples::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![3.0, 5.0, 7.0, 9.0, 11.0]);
        let fit = curve_fit(&samples, &ModelKind::Linear, &FitOptions::default()).unwrap();
        let res = compute_residuals(&samples, &ModelKind::Linear, &fit).unwrap();
        assert_abs_diff_eq!(rms(&res), 0.0, epsilon = 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }
}
