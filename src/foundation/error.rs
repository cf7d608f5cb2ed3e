use crate::func::named::Shape;

/// Convenience result type used across the crate.
pub type ExprResult<T> = Result<T, ExprError>;

/// Error taxonomy for building and evaluating expressions.
#[derive(thiserror::Error, Debug)]
pub enum ExprError {
    /// Malformed expression text.
    #[error("parse error at byte {offset}: {message}")]
    Parse {
        /// Byte offset into the source text.
        offset: usize,
        /// Human-readable description.
        message: String,
    },

    /// An evaluator of the wrong shape was requested.
    #[error("invalid shape: '{name}' has no {expected} evaluator")]
    InvalidShape {
        /// Canonical name of the offending expression.
        name: String,
        /// Shape that was asked for.
        expected: Shape,
    },

    /// Indexing a scalar, or indexing with a vector.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Index outside the bounds of the per-record vector.
    #[error("index {index} out of range for '{name}' (len {len})")]
    IndexOutOfRange {
        /// Canonical name of the indexing expression.
        name: String,
        /// Computed index value.
        index: f64,
        /// Length of the vector at evaluation time.
        len: usize,
    },

    /// A named value is unknown to the compiler or absent from a record.
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// Invalid schema or evaluation options.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExprError {
    /// Build an [`ExprError::Parse`] value.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Build an [`ExprError::InvalidShape`] value.
    pub fn invalid_shape(name: impl Into<String>, expected: Shape) -> Self {
        Self::InvalidShape {
            name: name.into(),
            expected,
        }
    }

    /// Build an [`ExprError::ShapeMismatch`] value.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Build an [`ExprError::MissingVariable`] value.
    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self::MissingVariable(name.into())
    }

    /// Build an [`ExprError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
