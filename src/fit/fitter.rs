//! Nonlinear least-squares fitting of a user model.
//!
//! Given:
//! - samples `(x_i, y_i)` with optional errors `σ_i`
//! - a model `f(x; p)` with `n` parameters
//! - an initial guess `p0` (ones by default)
//!
//! we hand the residuals
//!
//! ```text
//! r_i(p) = (f(x_i; p) - y_i) / σ_i
//! ```
//!
//! to the Levenberg-Marquardt solver, then estimate the parameter covariance
//! from the Jacobian at the optimum and derive standard errors from its
//! diagonal.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::domain::{FitReport, FitResult, Samples};
use crate::error::FitError;
use crate::math::{central_jacobian, unscaled_covariance};
use crate::models::Model;

/// MINPACK's default relative tolerance, `sqrt(ε)`.
const DEFAULT_TOL: f64 = 1.490_116_119_384_765_6e-8;

/// Options that affect how the solver is run and how uncertainties are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Starting point for the solver; `None` means a fresh vector of ones of
    /// the model's arity.
    pub initial_guess: Option<Vec<f64>>,

    /// Treat `y_err` as absolute standard deviations.
    ///
    /// When `false` the covariance is rescaled by the reduced chi-square
    /// `χ² / (L - n)`, so only the relative size of the errors matters.
    pub absolute_sigma: bool,

    /// Relative reduction of the sum of squares below which the solver stops.
    pub ftol: f64,
    /// Relative change of the parameters below which the solver stops.
    pub xtol: f64,
    /// Orthogonality between residuals and Jacobian columns below which the
    /// solver stops.
    pub gtol: f64,
    /// Evaluation budget multiplier: at most `patience · (n + 1)` evaluations.
    pub patience: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial_guess: None,
            absolute_sigma: false,
            ftol: DEFAULT_TOL,
            xtol: DEFAULT_TOL,
            gtol: 0.0,
            patience: 100,
        }
    }
}

impl FitOptions {
    pub fn with_guess(mut self, guess: impl Into<Vec<f64>>) -> Self {
        self.initial_guess = Some(guess.into());
        self
    }

    pub fn with_absolute_sigma(mut self, absolute_sigma: bool) -> Self {
        self.absolute_sigma = absolute_sigma;
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Resolve the starting point for a model with `n` parameters.
    fn resolve_guess(&self, n: usize) -> Result<DVector<f64>, FitError> {
        match &self.initial_guess {
            None => Ok(DVector::from_element(n, 1.0)),
            Some(g) if g.len() != n => Err(FitError::Shape(format!(
                "initial guess has {} values but the model has {n} parameters",
                g.len()
            ))),
            Some(g) if g.iter().any(|v| !v.is_finite()) => Err(FitError::InvalidData(
                "initial guess contains non-finite values".into(),
            )),
            Some(g) => Ok(DVector::from_column_slice(g)),
        }
    }
}

/// The curve-fitting problem as seen by the solver.
///
/// Holds the current parameters; data and model are borrowed.
struct CurveProblem<'a, M: Model + ?Sized> {
    samples: &'a Samples,
    model: &'a M,
    params: DVector<f64>,
}

impl<'a, M: Model + ?Sized> CurveProblem<'a, M> {
    /// Weighted residuals at `p`; `None` on non-finite or mis-shaped output.
    fn residuals_at(&self, p: &DVector<f64>) -> Option<DVector<f64>> {
        let y_fit = self.model.evaluate(&self.samples.x, p.as_slice());
        if y_fit.len() != self.samples.len() {
            return None;
        }

        let r = DVector::from_iterator(
            y_fit.len(),
            y_fit
                .iter()
                .zip(self.samples.y.iter())
                .enumerate()
                .map(|(i, (&f, &y))| (f - y) / self.samples.sigma(i)),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }
}

impl<'a, M: Model + ?Sized> LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'a, M> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.copy_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_at(&self.params)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        central_jacobian(&self.params, |p| self.residuals_at(p))
    }
}

/// Whether the solver stopped at an optimum.
///
/// `NoImprovementPossible` means the tolerances are below machine precision
/// at the current point, which we accept as converged.
fn is_converged(reason: &TerminationReason) -> bool {
    reason.was_successful() || matches!(reason, TerminationReason::NoImprovementPossible(_))
}

/// Fit `model` to `samples`.
///
/// Shapes are validated before the solver runs. The returned covariance is
/// scaled by the reduced chi-square unless `opts.absolute_sigma` is set; with
/// zero degrees of freedom that scale is undefined and every entry is `+∞`.
pub fn curve_fit<M>(samples: &Samples, model: &M, opts: &FitOptions) -> Result<FitResult, FitError>
where
    M: Model + ?Sized,
{
    let n = model.param_count();
    samples.validate(n)?;
    let p0 = opts.resolve_guess(n)?;

    // The vectorized contract is checked once up front so a mis-shaped model
    // is a shape error instead of an opaque solver failure.
    let initial = model.evaluate(&samples.x, p0.as_slice());
    if initial.len() != samples.len() {
        return Err(FitError::Shape(format!(
            "model returned {} values for {} x-values",
            initial.len(),
            samples.len()
        )));
    }

    let problem = CurveProblem {
        samples,
        model,
        params: p0,
    };
    let solver = LevenbergMarquardt::new()
        .with_ftol(opts.ftol)
        .with_xtol(opts.xtol)
        .with_gtol(opts.gtol)
        .with_patience(opts.patience);
    let (problem, report) = solver.minimize(problem);

    log::debug!(
        "LM finished after {} evaluations: {:?} (objective {:.6e})",
        report.number_of_evaluations,
        report.termination,
        report.objective_function
    );

    if !is_converged(&report.termination) {
        return Err(FitError::Convergence {
            reason: format!("{:?}", report.termination),
            evaluations: report.number_of_evaluations,
        });
    }

    let residuals = problem.residuals().ok_or_else(|| FitError::Convergence {
        reason: "residuals are not finite at the solution".into(),
        evaluations: report.number_of_evaluations,
    })?;
    let chi_square = residuals.norm_squared();
    let dof = samples.len() - n;

    let jacobian = problem.jacobian().ok_or_else(|| {
        FitError::SingularCovariance("Jacobian cannot be evaluated at the solution".into())
    })?;
    let mut covariance = unscaled_covariance(&jacobian)?;

    if !opts.absolute_sigma {
        if dof > 0 {
            covariance *= chi_square / dof as f64;
        } else {
            covariance.fill(f64::INFINITY);
        }
    }

    let std_errors: Vec<f64> = covariance.diagonal().iter().map(|v| v.sqrt()).collect();
    if std_errors.iter().any(|e| !e.is_finite()) {
        log::warn!(
            "Some parameters are unconstrained (infinite standard error); {} samples for {} parameters",
            samples.len(),
            n
        );
    }

    Ok(FitResult {
        params: problem.params.iter().copied().collect(),
        std_errors,
        covariance,
        report: FitReport {
            evaluations: report.number_of_evaluations,
            termination: format!("{:?}", report.termination),
            chi_square,
            dof,
            absolute_sigma: opts.absolute_sigma,
        },
    })
}
