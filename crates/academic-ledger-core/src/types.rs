//! Strong type definitions shared across the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Account identity of an actor (creator, updater, student, authority).
///
/// Stored as the textual account address. [`Address::new`] accepts any
/// string; [`Address::parse`] additionally checks the account format.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Minimum number of data characters after the `<prefix>1` separator.
    pub const MIN_DATA_LEN: usize = 3;

    /// Wrap a string without format checks.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse a well-formed account address with the given human-readable prefix.
    ///
    /// The expected shape is `<prefix>1<data>` where data is lowercase
    /// ASCII alphanumeric.
    pub fn parse(value: &str, prefix: &str) -> Result<Self, ValidationError> {
        let data = value
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('1'))
            .ok_or_else(|| ValidationError::InvalidAddress(value.to_string()))?;

        let well_formed = data.len() >= Self::MIN_DATA_LEN
            && data
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !well_formed {
            return Err(ValidationError::InvalidAddress(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Governance authorization status of an institution.
///
/// Serialized as the strings `"true"`, `"false"` and `"pending"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AuthorizationStatus {
    #[serde(rename = "true")]
    Authorized,
    #[default]
    #[serde(rename = "false")]
    Unauthorized,
    #[serde(rename = "pending")]
    Pending,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "true",
            Self::Unauthorized => "false",
            Self::Pending => "pending",
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::Authorized),
            "false" => Ok(Self::Unauthorized),
            "pending" => Ok(Self::Pending),
            other => Err(ValidationError::InvalidVariant {
                field: "is_authorized",
                value: other.to_string(),
                expected: "true, false, pending",
            }),
        }
    }
}
