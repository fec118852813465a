//! Error types for the Ledger.

use std::fmt;

use academic_ledger_core::ValidationError;
use academic_ledger_degree::DegreeError;
use academic_ledger_perms::PermsError;
use academic_ledger_registry::RegistryError;
use academic_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Degree(#[from] DegreeError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a failed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    /// The degree contract failed or answered with something unusable.
    Delegation,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Delegation => "delegation",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Config(_) => ErrorKind::Validation,
            Self::Permission(_) => ErrorKind::Unauthorized,
            Self::Store(_) => ErrorKind::Storage,
            Self::Registry(e) => registry_kind(e),
            Self::Degree(e) => match e {
                DegreeError::Validation(_) => ErrorKind::Validation,
                DegreeError::NotFound { .. } => ErrorKind::NotFound,
                DegreeError::Unauthorized(_) => ErrorKind::Unauthorized,
                DegreeError::Conflict(_) | DegreeError::InvalidTransition { .. } => ErrorKind::Conflict,
                DegreeError::Contract(_) | DegreeError::Decode { .. } | DegreeError::Encode { .. } => {
                    ErrorKind::Delegation
                }
                DegreeError::Registry(e) => registry_kind(e),
                DegreeError::Store(_) => ErrorKind::Storage,
            },
        }
    }
}

fn registry_kind(e: &RegistryError) -> ErrorKind {
    match e {
        RegistryError::Validation(_) => ErrorKind::Validation,
        RegistryError::NotFound { .. } => ErrorKind::NotFound,
        RegistryError::Unauthorized(_) => ErrorKind::Unauthorized,
        RegistryError::Conflict(_) => ErrorKind::Conflict,
        RegistryError::Store(_) => ErrorKind::Storage,
    }
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use academic_ledger_degree::ExecutionError;

    #[test]
    fn test_kind_sees_through_wrappers() {
        let not_found: LedgerError = RegistryError::not_found("course", "course-9").into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let contract: LedgerError = DegreeError::Contract(ExecutionError("out of gas".into())).into();
        assert_eq!(contract.kind(), ErrorKind::Delegation);

        let nested: LedgerError = DegreeError::Registry(RegistryError::Conflict("dup".into())).into();
        assert_eq!(nested.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_error_display() {
        let err: LedgerError = RegistryError::not_found("institution", "institution-4").into();
        assert_eq!(err.to_string(), "institution not found: institution-4");
        assert_eq!(err.kind().to_string(), "not_found");
    }
}
