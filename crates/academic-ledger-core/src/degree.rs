//! Degree workflow records.
//!
//! Only contract-confirmed summaries are stored here. Eligibility itself is
//! decided by the external degree contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::Address;

/// Status of a degree request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeRequestStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
    Cancelled,
    Validated,
    ValidationFailed,
}

impl DegreeRequestStatus {
    pub const ALL: [DegreeRequestStatus; 7] = [
        Self::Pending,
        Self::Processing,
        Self::Approved,
        Self::Rejected,
        Self::Cancelled,
        Self::Validated,
        Self::ValidationFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Validated => "validated",
            Self::ValidationFailed => "validation_failed",
        }
    }

    /// No further transition is allowed once a request is approved
    /// (issued), rejected or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for DegreeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DegreeRequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "degree_request_status",
                value: s.to_string(),
                expected: "pending, processing, approved, rejected, cancelled, validated, validation_failed",
            })
    }
}

/// Status of an issued degree record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeStatus {
    Requested,
    Validating,
    Validated,
    Issued,
    Rejected,
    Cancelled,
}

impl DegreeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Validating => "validating",
            Self::Validated => "validated",
            Self::Issued => "issued",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DegreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-ledger summary of a degree request. The id is assigned by the
/// degree contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeRequest {
    pub id: String,
    pub student_id: String,
    pub institution_id: String,
    pub curriculum_id: String,
    pub expected_graduation_date: String,
    pub request_date: String,
    pub status: DegreeRequestStatus,
    pub validation_score: Option<String>,
    pub validation_details: String,
    pub missing_requirements: Vec<String>,
    pub creator: Address,
}

/// An issued degree. `index == degree_id`, both assigned by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    pub index: String,
    pub degree_id: String,
    pub request_id: String,
    pub student: String,
    pub institution: String,
    pub course_id: String,
    pub issue_date: String,
    pub status: DegreeStatus,
    pub nft_token_id: String,
    pub ipfs_link: String,
    pub final_grade: String,
    pub total_credits: u64,
    pub signatures: Vec<String>,
}
