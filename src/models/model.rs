//! Model evaluation.
//!
//! The fitter only relies on two things from a model:
//! - its arity (`param_count`)
//! - a vectorized evaluation `y = f(x; p)` over a slice of x-values
//!
//! Closures are lifted into models with [`FnModel`]; the CLI uses the small
//! built-in library in [`ModelKind`].

use clap::ValueEnum;
use serde::Serialize;

/// A parametric model `y = f(x; p1..pn)` with fixed arity `n >= 1`.
pub trait Model {
    /// Number of free parameters.
    fn param_count(&self) -> usize;

    /// Evaluate the model at every x-value.
    ///
    /// Implementations must return one y-value per x-value; the fitter treats
    /// any other length as a shape error.
    fn evaluate(&self, x: &[f64], params: &[f64]) -> Vec<f64>;
}

impl<M: Model + ?Sized> Model for &M {
    fn param_count(&self) -> usize {
        (**self).param_count()
    }

    fn evaluate(&self, x: &[f64], params: &[f64]) -> Vec<f64> {
        (**self).evaluate(x, params)
    }
}

/// Adapter turning a pointwise closure `f(x, params)` into a [`Model`].
///
/// ```
/// use fitplot::models::{FnModel, Model};
///
/// let line = FnModel::new(2, |x, p: &[f64]| p[0] * x + p[1]);
/// assert_eq!(line.evaluate(&[0.0, 1.0], &[2.0, 1.0]), vec![1.0, 3.0]);
/// ```
#[derive(Clone)]
pub struct FnModel<F> {
    n_params: usize,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    pub fn new(n_params: usize, f: F) -> Self {
        Self { n_params, f }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn param_count(&self) -> usize {
        self.n_params
    }

    fn evaluate(&self, x: &[f64], params: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| (self.f)(xi, params)).collect()
    }
}

impl<F> std::fmt::Debug for FnModel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModel")
            .field("n_params", &self.n_params)
            .finish_non_exhaustive()
    }
}

/// Built-in model library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `a·x + b`
    Linear,
    /// `a·x² + b·x + c`
    Quadratic,
    /// `a·x³ + b·x² + c·x + d`
    Cubic,
    /// `a·exp(b·x)`
    Exponential,
    /// `a·x^b`
    #[value(name = "power")]
    #[serde(rename = "power")]
    PowerLaw,
    /// `a·exp(-(x - mu)² / (2·sigma²))`
    Gaussian,
    /// `l / (1 + exp(-k·(x - x0)))`
    Logistic,
    /// `a·sin(omega·x + phi) + c`
    Sine,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        ModelKind::Linear,
        ModelKind::Quadratic,
        ModelKind::Cubic,
        ModelKind::Exponential,
        ModelKind::PowerLaw,
        ModelKind::Gaussian,
        ModelKind::Logistic,
        ModelKind::Sine,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear",
            ModelKind::Quadratic => "Quadratic",
            ModelKind::Cubic => "Cubic",
            ModelKind::Exponential => "Exponential",
            ModelKind::PowerLaw => "Power law",
            ModelKind::Gaussian => "Gaussian",
            ModelKind::Logistic => "Logistic",
            ModelKind::Sine => "Sine",
        }
    }

    pub fn formula(self) -> &'static str {
        match self {
            ModelKind::Linear => "a*x + b",
            ModelKind::Quadratic => "a*x^2 + b*x + c",
            ModelKind::Cubic => "a*x^3 + b*x^2 + c*x + d",
            ModelKind::Exponential => "a*exp(b*x)",
            ModelKind::PowerLaw => "a*x^b",
            ModelKind::Gaussian => "a*exp(-(x - mu)^2 / (2*sigma^2))",
            ModelKind::Logistic => "l / (1 + exp(-k*(x - x0)))",
            ModelKind::Sine => "a*sin(omega*x + phi) + c",
        }
    }

    /// Parameter names in the order the fitter reports them.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Linear => &["a", "b"],
            ModelKind::Quadratic => &["a", "b", "c"],
            ModelKind::Cubic => &["a", "b", "c", "d"],
            ModelKind::Exponential => &["a", "b"],
            ModelKind::PowerLaw => &["a", "b"],
            ModelKind::Gaussian => &["a", "mu", "sigma"],
            ModelKind::Logistic => &["l", "k", "x0"],
            ModelKind::Sine => &["a", "omega", "phi", "c"],
        }
    }
}

/// Predict `y(x)` for a built-in model.
///
/// # Panics
/// Panics if `p` is shorter than `model.param_count()`.
pub fn predict(model: ModelKind, x: f64, p: &[f64]) -> f64 {
    match model {
        ModelKind::Linear => p[0] * x + p[1],
        ModelKind::Quadratic => (p[0] * x + p[1]) * x + p[2],
        ModelKind::Cubic => ((p[0] * x + p[1]) * x + p[2]) * x + p[3],
        ModelKind::Exponential => p[0] * (p[1] * x).exp(),
        ModelKind::PowerLaw => p[0] * x.powf(p[1]),
        ModelKind::Gaussian => {
            let z = (x - p[1]) / p[2];
            p[0] * (-0.5 * z * z).exp()
        }
        ModelKind::Logistic => p[0] / (1.0 + (-p[1] * (x - p[2])).exp()),
        ModelKind::Sine => p[0] * (p[1] * x + p[2]).sin() + p[3],
    }
}

impl Model for ModelKind {
    fn param_count(&self) -> usize {
        self.param_names().len()
    }

    fn evaluate(&self, x: &[f64], params: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| predict(*self, xi, params)).collect()
    }
}
