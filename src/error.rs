//! Error types for LSUV initialization.
//!
//! Only structural problems surface as errors. Numeric trouble during
//! variance normalization (near-zero variance, no convergence within the
//! iteration cap) is reported through [`crate::lsuv::LayerOutcome`] instead.

use std::fmt;

/// Main error type for initialization operations.
///
/// # Examples
///
/// ```
/// use lsuv::error::LsuvError;
///
/// let err = LsuvError::ShapeError { shape: vec![5] };
/// assert!(err.to_string().contains("rank 2"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LsuvError {
    /// Orthonormal seeding was asked for a shape with fewer than two
    /// dimensions, or with a zero-sized dimension.
    ShapeError {
        /// The rejected shape
        shape: Vec<usize>,
    },

    /// Tensor dimensions don't match what the layer expects.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Singular value decomposition did not converge.
    Decomposition {
        /// Error description
        message: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },
}

impl fmt::Display for LsuvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsuvError::ShapeError { shape } => {
                write!(
                    f,
                    "Orthonormal initialization requires a shape of rank 2 or more \
                     with non-zero dimensions, got {shape:?}"
                )
            }
            LsuvError::DimensionMismatch { expected, actual } => {
                write!(f, "Tensor dimension mismatch: expected {expected}, got {actual}")
            }
            LsuvError::Decomposition { message } => {
                write!(f, "Singular value decomposition failed: {message}")
            }
            LsuvError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
        }
    }
}

impl std::error::Error for LsuvError {}

impl LsuvError {
    /// Create a dimension mismatch error from two shapes.
    #[must_use]
    pub fn shape_mismatch(context: &str, expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, LsuvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_display() {
        let err = LsuvError::ShapeError { shape: vec![5] };
        let msg = err.to_string();
        assert!(msg.contains("rank 2"));
        assert!(msg.contains("[5]"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = LsuvError::shape_mismatch("kernel", &[64, 32], &[32, 64]);
        let msg = err.to_string();
        assert!(msg.contains("dimension mismatch"));
        assert!(msg.contains("kernel=[64, 32]"));
        assert!(msg.contains("[32, 64]"));
    }

    #[test]
    fn test_decomposition_display() {
        let err = LsuvError::Decomposition {
            message: "no convergence".to_string(),
        };
        assert!(err.to_string().contains("Singular value decomposition"));
        assert!(err.to_string().contains("no convergence"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = LsuvError::invalid_hyperparameter("margin", -0.1, ">= 0");
        let msg = err.to_string();
        assert!(msg.contains("Invalid hyperparameter"));
        assert!(msg.contains("margin"));
        assert!(msg.contains("-0.1"));
        assert!(msg.contains(">= 0"));
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(LsuvError::ShapeError { shape: vec![] });
        assert!(err.source().is_none());
    }
}
