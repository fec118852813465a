//! Credential tokens: definitions (templates) and minted instances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::hash::ContentHash;
use crate::types::Address;

/// Kind of credential a definition mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Nft,
    Fungible,
    Achievement,
}

impl TokenType {
    pub const EXPECTED: &'static str = "NFT, FUNGIBLE, ACHIEVEMENT";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nft => "NFT",
            Self::Fungible => "FUNGIBLE",
            Self::Achievement => "ACHIEVEMENT",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NFT" => Ok(Self::Nft),
            "FUNGIBLE" => Ok(Self::Fungible),
            "ACHIEVEMENT" => Ok(Self::Achievement),
            other => Err(ValidationError::InvalidVariant {
                field: "token_type",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Display attribute attached to token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenAttribute {
    pub trait_type: String,
    pub display_type: String,
    pub is_dynamic: bool,
}

/// Descriptive metadata of a token definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenMetadata {
    pub description: String,
    pub image_uri: String,
    pub attributes: Vec<TokenAttribute>,
}

impl TokenMetadata {
    /// Hash of `description:image_uri` followed by
    /// `:trait_type:display_type:is_dynamic` for each attribute.
    pub fn content_hash(&self) -> ContentHash {
        let mut parts: Vec<&str> = vec![self.description.as_str(), self.image_uri.as_str()];
        for attr in &self.attributes {
            parts.push(&attr.trait_type);
            parts.push(&attr.display_type);
            parts.push(if attr.is_dynamic { "true" } else { "false" });
        }
        ContentHash::hash_joined(parts)
    }
}

/// Template from which subject completion tokens are minted.
///
/// `institution_id` and `course_id` are copied from the subject at
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDefinition {
    pub index: String,
    pub subject_id: String,
    pub institution_id: String,
    pub course_id: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_type: TokenType,
    pub is_transferable: bool,
    pub is_burnable: bool,
    pub max_supply: u64,
    pub metadata: TokenMetadata,
    pub content_hash: String,
    pub creator: Address,
    pub created_at: String,
}

/// A minted proof that a student completed a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTokenInstance {
    pub index: String,
    pub token_def_id: String,
    pub student: Address,
    pub completion_date: String,
    pub grade: String,
    pub issuer_institution: String,
    pub semester: String,
    pub professor_signature: String,
    pub minted_date: String,
    pub creator: Address,
}
