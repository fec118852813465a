//! Error types for the registries.

use academic_ledger_core::ValidationError;
use academic_ledger_perms::PermsError;
use academic_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Message shape is invalid.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The authorization chain rejected the actor.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] PermsError),

    /// A uniqueness constraint would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying storage failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
