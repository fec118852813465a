//! Error types for the Academic Ledger Core.

use thiserror::Error;

/// Shape errors detected before any store access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{field} out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("invalid {field}: '{value}'")]
    Malformed { field: &'static str, value: String },

    #[error("invalid {field} '{value}': must be one of {expected}")]
    InvalidVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid account address: '{0}'")]
    InvalidAddress(String),

    #[error("no valid updates provided")]
    NoUpdates,
}

impl ValidationError {
    /// Shorthand for an out-of-range error.
    pub fn out_of_range(field: &'static str, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a malformed value error.
    pub fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            value: value.into(),
        }
    }
}
