//! Error taxonomy shared by the fitting, plotting and CLI layers.
//!
//! Every failure propagates to the caller unchanged; nothing is retried and no
//! partial results are returned. The binary maps each variant to a process
//! exit code via [`FitError::exit_code`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    /// Mismatched or insufficient sequence lengths.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Non-finite samples or non-positive y errors.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unrecognised plot option value (e.g. an axis selector).
    #[error("Invalid option for {option}: '{value}' (expected one of: x, y, both, none)")]
    InvalidOption { option: &'static str, value: String },

    /// The solver stopped without converging.
    #[error("Fit did not converge after {evaluations} evaluations: {reason}")]
    Convergence { reason: String, evaluations: usize },

    /// The parameter covariance could not be estimated.
    #[error("Singular covariance: {0}")]
    SingularCovariance(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plotting backend failed while drawing.
    #[error("Render error: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl FitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code used by the `fitplot` binary.
    ///
    /// - 2: bad input (shape, data, options, CSV)
    /// - 3: numerical failure (convergence, covariance)
    /// - 4: output failure (I/O, rendering, JSON encoding)
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::Shape(_)
            | FitError::InvalidData(_)
            | FitError::InvalidOption { .. }
            | FitError::Csv(_) => 2,
            FitError::Convergence { .. } | FitError::SingularCovariance(_) => 3,
            FitError::Io { .. } | FitError::Render(_) | FitError::Serialize(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_failure_class() {
        assert_eq!(FitError::Shape("x".into()).exit_code(), 2);
        assert_eq!(
            FitError::InvalidOption {
                option: "log_scale",
                value: "z".into()
            }
            .exit_code(),
            2
        );
        assert_eq!(FitError::SingularCovariance("x".into()).exit_code(), 3);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(FitError::io("a.png", io).exit_code(), 4);
    }

    #[test]
    fn invalid_option_message_names_the_option() {
        let err = FitError::InvalidOption {
            option: "scientific_notation",
            value: "z".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("scientific_notation"));
        assert!(msg.contains("'z'"));
    }
}
