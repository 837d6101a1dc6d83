//! Parameter covariance from the Jacobian at the optimum.
//!
//! For residuals `r(p)` with Jacobian `J` (m × n, m ≥ n), the unscaled
//! covariance is `(JᵀJ)⁻¹`. We compute it through an SVD rather than forming
//! `JᵀJ` (which squares the condition number):
//!
//! ```text
//! J D⁻¹ = U S Vᵀ          (D = diag of column norms)
//! (JᵀJ)⁻¹ = D⁻¹ V S⁻² Vᵀ D⁻¹
//! ```
//!
//! Column equilibration makes the rank test independent of parameter units.
//! The Jacobian is a finite-difference estimate, so singular values below
//! `SINGULAR_RTOL · s_max` are treated as zero; any such value means some
//! parameter combination is not constrained by the data.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Relative singular-value cutoff, `sqrt(ε)`.
const SINGULAR_RTOL: f64 = 1.490_116_119_384_765_6e-8;

/// Compute `(JᵀJ)⁻¹` via SVD of the column-equilibrated Jacobian.
pub fn unscaled_covariance(jacobian: &DMatrix<f64>) -> Result<DMatrix<f64>, FitError> {
    let n = jacobian.ncols();
    if n == 0 {
        return Err(FitError::SingularCovariance("no parameters".into()));
    }

    let norms = DVector::from_iterator(n, jacobian.column_iter().map(|c| c.norm()));
    if let Some(j) = norms.iter().position(|v| !(v.is_finite() && *v > 0.0)) {
        return Err(FitError::SingularCovariance(format!(
            "parameter {j} has no influence on the residuals"
        )));
    }

    let mut scaled = jacobian.clone();
    for (j, mut col) in scaled.column_iter_mut().enumerate() {
        col /= norms[j];
    }

    let svd = scaled.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| FitError::SingularCovariance("SVD did not produce V".into()))?;
    let s = &svd.singular_values;

    let s_max = s.max();
    let rank = s.iter().filter(|&&v| v > SINGULAR_RTOL * s_max).count();
    if rank < n {
        return Err(FitError::SingularCovariance(format!(
            "Jacobian has rank {rank} for {n} parameters (redundant or unconstrained parameters)"
        )));
    }

    let inv_s2 = DMatrix::from_diagonal(&s.map(|v| 1.0 / (v * v)));
    let inner = v_t.transpose() * inv_s2 * &v_t;

    let inv_d = DMatrix::from_diagonal(&norms.map(|v| 1.0 / v));
    let cov = &inv_d * inner * &inv_d;

    // Symmetrize away rounding noise.
    Ok((&cov + cov.transpose()) * 0.5)
}
