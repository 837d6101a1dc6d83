//! Shared domain types.
//!
//! These types are transient: they are built from call arguments, flow through
//! the fit and plot stages, and are dropped when the call returns. Result types
//! derive `Serialize` so the CLI can print them as JSON.

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use serde::{Serialize, Serializer};

use crate::error::FitError;

/// Observed sample set: x-values, y-values and optional y errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Samples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Per-point standard deviation of `y`. When present the fit divides each
    /// residual by its error.
    pub y_err: Option<Vec<f64>>,
}

impl Samples {
    pub fn new(x: impl Into<Vec<f64>>, y: impl Into<Vec<f64>>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            y_err: None,
        }
    }

    /// Attach per-point y errors (weighted fit).
    pub fn with_errors(mut self, y_err: impl Into<Vec<f64>>) -> Self {
        self.y_err = Some(y_err.into());
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_weighted(&self) -> bool {
        self.y_err.is_some()
    }

    /// Check the sample set against a model with `n_params` parameters.
    ///
    /// Runs before the solver is touched: lengths must agree and cover at
    /// least one observation per parameter, values must be finite and errors
    /// strictly positive.
    pub fn validate(&self, n_params: usize) -> Result<(), FitError> {
        if self.x.len() != self.y.len() {
            return Err(FitError::Shape(format!(
                "x has {} values but y has {}",
                self.x.len(),
                self.y.len()
            )));
        }
        if let Some(err) = &self.y_err {
            if err.len() != self.y.len() {
                return Err(FitError::Shape(format!(
                    "y_err has {} values but y has {}",
                    err.len(),
                    self.y.len()
                )));
            }
        }
        if n_params == 0 {
            return Err(FitError::Shape("model must have at least one parameter".into()));
        }
        if self.len() < n_params {
            return Err(FitError::Shape(format!(
                "{} samples cannot determine {} parameters",
                self.len(),
                n_params
            )));
        }

        if let Some(i) = self.x.iter().position(|v| !v.is_finite()) {
            return Err(FitError::InvalidData(format!("x[{i}] is not finite")));
        }
        if let Some(i) = self.y.iter().position(|v| !v.is_finite()) {
            return Err(FitError::InvalidData(format!("y[{i}] is not finite")));
        }
        if let Some(err) = &self.y_err {
            if let Some(i) = err.iter().position(|v| !(v.is_finite() && *v > 0.0)) {
                return Err(FitError::InvalidData(format!(
                    "y_err[{i}] = {} must be positive and finite",
                    err[i]
                )));
            }
        }

        Ok(())
    }

    /// Error for point `i`; `1.0` for unweighted samples.
    pub fn sigma(&self, i: usize) -> f64 {
        self.y_err.as_ref().map_or(1.0, |e| e[i])
    }

    /// `(x, y)` pairs in input order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Axis selector for log scaling and scientific tick labels.
///
/// Parsed from `"x"`, `"y"` or `"both"`; "no axis" is `Option::None` at the
/// use site (or the literal `"none"` via [`AxisSelection::parse_option`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSelection {
    X,
    Y,
    Both,
}

impl AxisSelection {
    pub fn includes_x(self) -> bool {
        matches!(self, AxisSelection::X | AxisSelection::Both)
    }

    pub fn includes_y(self) -> bool {
        matches!(self, AxisSelection::Y | AxisSelection::Both)
    }

    /// Parse an optional selector for the named option.
    ///
    /// `None` and `"none"` both mean "no axis"; anything outside
    /// `x | y | both | none` is an [`FitError::InvalidOption`].
    pub fn parse_option(
        option: &'static str,
        value: Option<&str>,
    ) -> Result<Option<AxisSelection>, FitError> {
        match value {
            None | Some("none") => Ok(None),
            Some(v) => v
                .parse::<AxisSelection>()
                .map(Some)
                .map_err(|_| FitError::InvalidOption {
                    option,
                    value: v.to_string(),
                }),
        }
    }
}

impl FromStr for AxisSelection {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(AxisSelection::X),
            "y" => Ok(AxisSelection::Y),
            "both" => Ok(AxisSelection::Both),
            other => Err(FitError::InvalidOption {
                option: "axis",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AxisSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AxisSelection::X => "x",
            AxisSelection::Y => "y",
            AxisSelection::Both => "both",
        };
        f.write_str(s)
    }
}

/// Which view of the fitted parameters a caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Each parameter paired with its standard error.
    #[default]
    WithUncertainty,
    /// Bare parameter values.
    Bare,
}

/// A value with its one-sigma standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Uncertain {
    pub value: f64,
    pub std_err: f64,
}

impl Uncertain {
    pub fn new(value: f64, std_err: f64) -> Self {
        Self { value, std_err }
    }

    /// `false` when the solver could not bound this parameter.
    pub fn is_identified(&self) -> bool {
        self.std_err.is_finite()
    }
}

impl fmt::Display for Uncertain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.value, p, self.std_err),
            None => write!(f, "{} ± {}", self.value, self.std_err),
        }
    }
}

/// Solver diagnostics for a finished fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    /// Number of residual evaluations performed by the solver.
    pub evaluations: usize,
    /// Solver termination reason, as reported by the solver.
    pub termination: String,
    /// Weighted sum of squared residuals at the optimum.
    pub chi_square: f64,
    /// Degrees of freedom, `L - n`.
    pub dof: usize,
    /// Whether the covariance was left unscaled by the reduced chi-square.
    pub absolute_sigma: bool,
}

impl FitReport {
    /// `chi_square / dof`, or `NaN` with zero degrees of freedom.
    pub fn reduced_chi_square(&self) -> f64 {
        if self.dof == 0 {
            f64::NAN
        } else {
            self.chi_square / self.dof as f64
        }
    }
}

/// Fitted parameters with their covariance and standard errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    #[serde(serialize_with = "serialize_rows")]
    pub covariance: DMatrix<f64>,
    pub report: FitReport,
}

impl FitResult {
    /// The bare fitted parameter vector.
    pub fn values(&self) -> &[f64] {
        &self.params
    }

    /// Each fitted parameter tagged with its standard error.
    pub fn with_uncertainty(&self) -> Vec<Uncertain> {
        self.params
            .iter()
            .zip(self.std_errors.iter())
            .map(|(&v, &e)| Uncertain::new(v, e))
            .collect()
    }

    /// `true` when every parameter has a finite standard error.
    pub fn is_identified(&self) -> bool {
        self.std_errors.iter().all(|e| e.is_finite())
    }
}

fn serialize_rows<S: Serializer>(m: &DMatrix<f64>, s: S) -> Result<S::Ok, S::Error> {
    let rows: Vec<Vec<f64>> = m
        .row_iter()
        .map(|r| r.iter().copied().collect())
        .collect();
    rows.serialize(s)
}
