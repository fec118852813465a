//! Error types for the permissions module.

use thiserror::Error;

use crate::action::Action;

/// Errors that can occur during permission checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// The actor failed the authorization chain for this action.
    #[error("permission denied: {actor} cannot {action} {target}")]
    PermissionDenied {
        actor: String,
        action: Action,
        target: String,
    },

    /// The target institution is not authorized by governance.
    #[error("institution {0} is not authorized")]
    InstitutionNotAuthorized(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
