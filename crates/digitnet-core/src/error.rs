//! Error types for digitnet
//!
//! Every failure in the inference stack is a contract violation on shapes or
//! weights. Nothing here is transient, so callers should never retry.
//!
//! # Examples
//!
//! ```
//! use digitnet_core::error::{DigitNetError, DigitNetResult};
//!
//! fn check_rank(shape: &[usize]) -> DigitNetResult<()> {
//!     if shape.len() != 4 {
//!         return Err(DigitNetError::shape_mismatch(
//!             "conv2d_valid",
//!             "rank 4 (batch, height, width, channels)",
//!             shape.to_vec(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_rank(&[2, 28, 28, 1]).is_ok());
//! assert!(check_rank(&[28, 28]).is_err());
//! ```

use thiserror::Error;

/// Error type for tensor construction, kernels and the forward pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigitNetError {
    /// A stage input violates that stage's shape precondition
    #[error("{operation}: shape mismatch - expected {expected}, got {actual:?}")]
    ShapeMismatch {
        operation: String,
        expected: String,
        actual: Vec<usize>,
    },

    /// A weight tensor has the wrong rank or a zero-sized dimension
    #[error("invalid weights for layer '{layer}': {reason}")]
    InvalidWeights { layer: String, reason: String },

    /// A scalar argument is out of range (e.g. a pool window of zero)
    #[error("{operation}: invalid argument: {message}")]
    InvalidArgument { operation: String, message: String },

    /// Prediction and reference label sequences differ in length
    #[error("label count mismatch: {predicted} predictions vs {reference} reference labels")]
    LabelCountMismatch { predicted: usize, reference: usize },
}

/// Result type used across digitnet
pub type DigitNetResult<T> = Result<T, DigitNetError>;

impl DigitNetError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: Vec<usize>,
    ) -> Self {
        DigitNetError::ShapeMismatch {
            operation: operation.into(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create an invalid weights error
    pub fn invalid_weights(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        DigitNetError::InvalidWeights {
            layer: layer.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        DigitNetError::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a shape precondition
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, DigitNetError::ShapeMismatch { .. })
    }

    /// Whether this error came from weight validation
    pub fn is_invalid_weights(&self) -> bool {
        matches!(self, DigitNetError::InvalidWeights { .. })
    }
}
