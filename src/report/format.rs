//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation concerns
//! - output changes are localized (the summary is snapshot-tested)

use crate::domain::{FitResult, OutputMode, Samples};
use crate::report::Residual;

/// What the summary header says about the model.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo<'a> {
    pub name: &'a str,
    pub formula: &'a str,
    /// Parameter names in fit order; missing names print as `p1`, `p2`, ...
    pub param_names: &'a [&'a str],
}

/// Format the fit summary: data set, solver diagnostics and parameters.
pub fn format_fit_summary(
    model: &ModelInfo<'_>,
    samples: &Samples,
    fit: &FitResult,
    mode: OutputMode,
) -> String {
    let mut out = String::new();
    let report = &fit.report;

    out.push_str(&format!("=== fitplot - {} ===\n", model.name));
    out.push_str(&format!("Model: y = {}\n", model.formula));
    out.push_str(&format!(
        "Points: n={} | {}\n",
        samples.len(),
        if samples.is_weighted() { "weighted (y errors)" } else { "unweighted" }
    ));
    out.push_str(&format!(
        "Solver: {} after {} evaluations\n",
        report.termination, report.evaluations
    ));
    out.push_str(&format!(
        "chi2={:.6} | dof={} | chi2/dof={}\n",
        report.chi_square,
        report.dof,
        fmt_num(report.reduced_chi_square())
    ));
    if report.absolute_sigma {
        out.push_str("Errors: absolute (y errors taken as exact)\n");
    }

    out.push_str("\nParameters:\n");
    let width = (0..fit.params.len())
        .map(|i| param_name(model.param_names, i).len())
        .max()
        .unwrap_or(0);
    for (i, p) in fit.with_uncertainty().iter().enumerate() {
        let name = param_name(model.param_names, i);
        match mode {
            OutputMode::WithUncertainty => {
                let note = if p.is_identified() { "" } else { "  (unconstrained)" };
                out.push_str(&format!(
                    "  {name:<width$} = {} ± {}{note}\n",
                    fmt_num(p.value),
                    fmt_num(p.std_err)
                ));
            }
            OutputMode::Bare => {
                out.push_str(&format!("  {name:<width$} = {}\n", fmt_num(p.value)));
            }
        }
    }

    out
}

/// Format the per-sample residual table.
pub fn format_residuals(residuals: &[Residual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>12} {:>12} {:>12} {:>12} {:>10}",
            "x", "y_obs", "y_fit", "residual", "norm"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<12} {:-<12} {:-<10}\n",
        "", "", "", "", ""
    ));

    for r in residuals {
        out.push_str(&format!(
            "{:>12} {:>12} {:>12} {:>12} {:>10.3}\n",
            fmt_num(r.x),
            fmt_num(r.y_obs),
            fmt_num(r.y_fit),
            fmt_num(r.residual),
            r.normalized
        ));
    }

    out
}

fn param_name(names: &[&str], i: usize) -> String {
    names
        .get(i)
        .map_or_else(|| format!("p{}", i + 1), |n| n.to_string())
}

/// Six significant digits; scientific outside `[1e-3, 1e6)`.
fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e6).contains(&a) {
        format!("{v:.5e}")
    } else {
        format!("{v:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitReport;
    use nalgebra::DMatrix;

    fn result(std_errors: Vec<f64>, dof: usize) -> FitResult {
        FitResult {
            params: vec![2.0, 1.0],
            std_errors,
            covariance: DMatrix::identity(2, 2),
            report: FitReport {
                evaluations: 12,
                termination: "Converged { ftol: true, xtol: false }".into(),
                chi_square: 0.5,
                dof,
                absolute_sigma: false,
            },
        }
    }

    fn info() -> ModelInfo<'static> {
        ModelInfo {
            name: "Linear",
            formula: "a*x + b",
            param_names: &["a", "b"],
        }
    }

    #[test]
    fn summary_golden_snapshot() {
        let samples = Samples::new(vec![1.0, 2.0, 3.0, 4.0], vec![3.0, 5.0, 7.0, 9.0]);
        let txt = format_fit_summary(&info(), &samples, &result(vec![0.125, 0.25], 2), OutputMode::default());
        let expected = concat!(
            "=== fitplot - Linear ===\n",
            "Model: y = a*x + b\n",
            "Points: n=4 | unweighted\n",
            "Solver: Converged { ftol: true, xtol: false } after 12 evaluations\n",
            "chi2=0.500000 | dof=2 | chi2/dof=0.250000\n",
            "\n",
            "Parameters:\n",
            "  a = 2.000000 ± 0.125000\n",
            "  b = 1.000000 ± 0.250000\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bare_mode_and_unconstrained_parameters() {
        let samples = Samples::new(vec![1.0, 2.0], vec![3.0, 5.0]);
        let fit = result(vec![f64::INFINITY, f64::INFINITY], 0);

        let full = format_fit_summary(&info(), &samples, &fit, OutputMode::WithUncertainty);
        assert!(full.contains("a = 2.000000 ± inf  (unconstrained)"));
        assert!(full.contains("chi2/dof=NaN"));

        let bare = format_fit_summary(&info(), &samples, &fit, OutputMode::Bare);
        assert!(bare.contains("  a = 2.000000\n"));
        assert!(!bare.contains('±'));
    }

    #[test]
    fn unnamed_parameters_are_numbered() {
        let samples = Samples::new(vec![1.0, 2.0, 3.0], vec![3.0, 5.0, 7.0]);
        let anon = ModelInfo {
            name: "custom",
            formula: "f(x)",
            param_names: &[],
        };
        let txt = format_fit_summary(&anon, &samples, &result(vec![0.1, 0.1], 1), OutputMode::Bare);
        assert!(txt.contains("  p1 = 2.000000\n"));
        assert!(txt.contains("  p2 = 1.000000\n"));
    }

    #[test]
    fn numbers_switch_to_scientific_outside_range() {
        assert_eq!(fmt_num(0.0), "0.000000");
        assert_eq!(fmt_num(1.5e7), "1.50000e7");
        assert_eq!(fmt_num(-2.5e-5), "-2.50000e-5");
    }

    #[test]
    fn residual_table_has_header_and_rows() {
        let rows = vec![Residual {
            x: 1.0,
            y_obs: 3.5,
            y_fit: 3.0,
            residual: 0.5,
            normalized: 0.5,
        }];
        let txt = format_residuals(&rows);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("norm"));
        assert!(lines[2].contains("0.500000"));
    }
}
