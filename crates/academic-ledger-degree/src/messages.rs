//! Contract protocol and workflow messages.
//!
//! Contract payloads are JSON envelopes keyed by message name, e.g.
//! `{"request_degree": {"student_id": "...", ...}}`. Responses are decoded
//! into a message-specific struct.

use academic_ledger_core::{Address, DegreeRequestStatus};
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Contract envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the degree contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractMsg {
    RequestDegree {
        student_id: String,
        institution_id: String,
        curriculum_id: String,
        expected_graduation_date: String,
        creator: String,
    },
    ValidateDegreeRequirements {
        degree_request_id: String,
        validation_parameters: serde_json::Value,
        creator: String,
    },
    IssueDegree {
        degree_request_id: String,
        final_gpa: String,
        total_credits: u64,
        signatures: Vec<String>,
        creator: String,
    },
    CancelDegreeRequest {
        degree_request_id: String,
        cancellation_reason: String,
        creator: String,
    },
}

impl ContractMsg {
    /// Envelope key of this message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestDegree { .. } => "request_degree",
            Self::ValidateDegreeRequirements { .. } => "validate_degree_requirements",
            Self::IssueDegree { .. } => "issue_degree",
            Self::CancelDegreeRequest { .. } => "cancel_degree_request",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDegreeResponse {
    pub degree_request_id: String,
    pub status: DegreeRequestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateDegreeResponse {
    pub validation_passed: bool,
    /// Reported as text (`"100"`); numeric scores are kept in their JSON form.
    #[serde(deserialize_with = "score_text")]
    pub validation_score: String,
    #[serde(default)]
    pub validation_details: String,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
}

fn score_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Score::deserialize(deserializer)? {
        Score::Text(text) => text,
        Score::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDegreeResponse {
    pub degree_id: String,
    pub nft_token_id: String,
    pub ipfs_hash: String,
    #[serde(default)]
    pub issue_date: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow messages
// ─────────────────────────────────────────────────────────────────────────────

/// `contract_address` overrides the stored contract for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDegree {
    pub creator: Address,
    pub student_id: String,
    pub institution_id: String,
    pub curriculum_id: String,
    pub expected_graduation_date: String,
    #[serde(default)]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateDegreeRequirements {
    pub creator: Address,
    pub degree_request_id: String,
    #[serde(default)]
    pub validation_parameters: serde_json::Value,
    #[serde(default)]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDegree {
    pub creator: Address,
    pub degree_request_id: String,
    pub final_gpa: String,
    pub total_credits: u64,
    #[serde(default)]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelDegreeRequest {
    pub creator: Address,
    pub degree_request_id: String,
    pub cancellation_reason: String,
    #[serde(default)]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDegreeContract {
    pub authority: Address,
    pub new_contract_address: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow results
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeRequested {
    pub degree_request_id: String,
    pub status: DegreeRequestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatus {
    pub degree_request_id: String,
    pub status: DegreeRequestStatus,
    pub validation_score: Option<String>,
    pub validation_details: String,
    pub missing_requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeIssued {
    pub degree_id: String,
    pub nft_token_id: String,
    pub ipfs_hash: String,
    pub issue_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractUpdated {
    pub old_contract_address: String,
    pub new_contract_address: String,
    pub updated_at: String,
}

/// Static information about the configured degree contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub address: String,
    pub version: String,
    pub gas_limit: u64,
}
