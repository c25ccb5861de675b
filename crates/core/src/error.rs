//! Error types for geokrige

use thiserror::Error;

/// Main error type for geokrige operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Empty sample sets, shape mismatches and non-finite inputs.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The observation covariance matrix cannot be reliably factorized.
    #[error("Singular system: {message}{}", condition_suffix(.condition))]
    SingularSystem {
        message: String,
        /// Estimated condition number, when the factorization got that far
        condition: Option<f64>,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{0}")]
    Other(String),
}

fn condition_suffix(condition: &Option<f64>) -> String {
    match condition {
        Some(c) => format!(" (condition estimate {:.3e})", c),
        None => String::new(),
    }
}

impl Error {
    /// Shorthand for a [`Error::SingularSystem`] without a condition estimate
    pub fn singular(message: impl Into<String>) -> Self {
        Error::SingularSystem {
            message: message.into(),
            condition: None,
        }
    }

    /// Whether this error reports an ill-posed linear system
    pub fn is_singular(&self) -> bool {
        matches!(self, Error::SingularSystem { .. })
    }

    /// Whether this error reports rejected input data
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Result type alias for geokrige operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_message_includes_condition() {
        let err = Error::SingularSystem {
            message: "ill-conditioned covariance matrix".into(),
            condition: Some(2.5e13),
        };
        let msg = err.to_string();
        assert!(msg.contains("ill-conditioned"), "{msg}");
        assert!(msg.contains("2.500e13"), "{msg}");
        assert!(err.is_singular());
    }

    #[test]
    fn test_singular_message_without_condition() {
        let err = Error::singular("duplicate locations");
        assert_eq!(err.to_string(), "Singular system: duplicate locations");
        assert!(!err.is_invalid_input());
    }
}
