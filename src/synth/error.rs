//! Error types for the synthesis core.

use thiserror::Error;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Configuration errors reported by algorithms and the synthesizer.
///
/// Hot-path preconditions (a zero base frequency, an all-zero modulation index
/// sum) are not represented here; they are the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// The algorithm needs more operators than the voice has.
    #[error("{algorithm} requires at least {required} operators, found {found}")]
    InsufficientOperators {
        /// Algorithm name.
        algorithm: &'static str,
        /// Minimum operator count.
        required: usize,
        /// Operators actually supplied.
        found: usize,
    },

    /// A feedback algorithm names a channel that does not exist.
    #[error("feedback channel {channel} out of range for {operators} operators")]
    FeedbackChannelOutOfRange {
        /// Requested channel.
        channel: usize,
        /// Operators actually supplied.
        operators: usize,
    },

    /// Operator index out of bounds.
    #[error("operator index {index} out of bounds ({len} operators)")]
    OperatorIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of operators.
        len: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Checks an operator count against an algorithm's minimum.
    pub(crate) fn require_operators(
        algorithm: &'static str,
        required: usize,
        found: usize,
    ) -> SynthResult<()> {
        if found < required {
            Err(Self::InsufficientOperators {
                algorithm,
                required,
                found,
            })
        } else {
            Ok(())
        }
    }
}

/// Rejects negative or non-finite values.
pub(crate) fn check_non_negative(name: &str, value: f64) -> SynthResult<()> {
    if !value.is_finite() {
        return Err(SynthError::invalid_param(name, "must be finite"));
    }
    if value < 0.0 {
        return Err(SynthError::invalid_param(
            name,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}
