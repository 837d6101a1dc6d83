//! Finite-difference Jacobian for opaque models.
//!
//! User models are black boxes (only their arity is known), so the solver is
//! fed a numerical Jacobian of the residual vector:
//!
//! ```text
//! J[i, j] ≈ (r_i(p + h_j e_j) - r_i(p - h_j e_j)) / (2 h_j)
//! ```
//!
//! Central differences are second-order accurate, which matters for the
//! covariance estimate taken from `JᵀJ` at the optimum.

use nalgebra::{DMatrix, DVector};

/// Relative step for central differences, `ε^(1/3)`.
fn relative_step() -> f64 {
    f64::EPSILON.cbrt()
}

/// Compute the Jacobian of `residuals` at `params`.
///
/// Returns `None` if any residual evaluation fails or is non-finite.
pub fn central_jacobian<F>(params: &DVector<f64>, residuals: F) -> Option<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> Option<DVector<f64>>,
{
    let n = params.len();
    let mut columns = Vec::with_capacity(n);
    let mut work = params.clone();

    for j in 0..n {
        let pj = params[j];
        let h = relative_step() * pj.abs().max(1.0);

        work[j] = pj + h;
        let up = residuals(&work)?;
        let h_up = work[j] - pj;

        work[j] = pj - h;
        let down = residuals(&work)?;
        let h_down = pj - work[j];

        work[j] = pj;

        // Use the representable step so rounding in `pj ± h` does not bias the slope.
        let col = (up - down) / (h_up + h_down);
        if col.iter().any(|v| !v.is_finite()) {
            return None;
        }
        columns.push(col);
    }

    Some(DMatrix::from_columns(&columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn jacobian_of_linear_residuals_is_exact() {
        // r_i = a*x_i + b - y_i  =>  dr/da = x_i, dr/db = 1
        let x = [1.0, 2.0, 3.0];
        let p = DVector::from_vec(vec![2.0, 1.0]);
        let j = central_jacobian(&p, |p| {
            Some(DVector::from_iterator(3, x.iter().map(|xi| p[0] * xi + p[1])))
        })
        .unwrap();

        assert_eq!(j.shape(), (3, 2));
        for (i, xi) in x.iter().enumerate() {
            assert_abs_diff_eq!(j[(i, 0)], *xi, epsilon = 1e-8);
            assert_abs_diff_eq!(j[(i, 1)], 1.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn jacobian_of_exponential_matches_analytic() {
        let x = [0.0, 0.5, 1.0];
        let p = DVector::from_vec(vec![2.0, -1.0]);
        let j = central_jacobian(&p, |p| {
            Some(DVector::from_iterator(
                3,
                x.iter().map(|xi| p[0] * (p[1] * xi).exp()),
            ))
        })
        .unwrap();

        for (i, xi) in x.iter().enumerate() {
            let e = (-xi).exp();
            assert_abs_diff_eq!(j[(i, 0)], e, epsilon = 1e-7);
            assert_abs_diff_eq!(j[(i, 1)], 2.0 * xi * e, epsilon = 1e-7);
        }
    }

    #[test]
    fn failing_evaluation_yields_none() {
        let p = DVector::from_vec(vec![0.0]);
        let j = central_jacobian(&p, |p| {
            if p[0] > 0.0 {
                None
            } else {
                Some(DVector::from_vec(vec![p[0]]))
            }
        });
        assert!(j.is_none());
    }
}
