//! Error types for the degree workflow.

use academic_ledger_core::{DegreeRequestStatus, ValidationError};
use academic_ledger_perms::PermsError;
use academic_ledger_registry::RegistryError;
use academic_ledger_store::StoreError;
use thiserror::Error;

use crate::executor::ExecutionError;

/// Errors that can occur in the degree workflow.
#[derive(Debug, Error)]
pub enum DegreeError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(#[from] PermsError),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The contract rejected the call. The message is the contract's own.
    #[error("contract execution failed: {0}")]
    Contract(#[from] ExecutionError),

    /// The contract answered with something that is not the expected JSON.
    #[error("failed to decode {message} response: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {message} payload: {source}")]
    Encode {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Strict workflow refused a transition out of the current status.
    #[error("degree request {id} cannot {action} from status {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: DegreeRequestStatus,
    },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DegreeError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for failures of the external contract boundary.
    pub fn is_delegation(&self) -> bool {
        matches!(self, Self::Contract(_) | Self::Decode { .. } | Self::Encode { .. })
    }
}

/// Result type for degree workflow operations.
pub type Result<T> = std::result::Result<T, DegreeError>;
