//! Guarded actions and ownership chains.

use academic_ledger_core::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutation guarded by the authorization chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    UpdateInstitution,
    AuthorizeInstitution,
    CreateCourse,
    UpdateCourse,
    ManageCurriculum,
    UpdateTokenDefinition,
    UpdateDegreeContract,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::UpdateInstitution => "update institution",
            Action::AuthorizeInstitution => "change authorization of institution",
            Action::CreateCourse => "create course in",
            Action::UpdateCourse => "update course",
            Action::ManageCurriculum => "manage curriculum of",
            Action::UpdateTokenDefinition => "update token definition",
            Action::UpdateDegreeContract => "update degree contract",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creators that own an entity, nearest first.
///
/// For a course the chain is `[course creator, institution creator]`;
/// ownership is transitive through the institution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipChain<'a> {
    creators: Vec<&'a Address>,
}

impl<'a> OwnershipChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a chain with a single creator.
    pub fn of(creator: &'a Address) -> Self {
        Self {
            creators: vec![creator],
        }
    }

    /// Append an owning creator further up the chain.
    pub fn then(mut self, creator: &'a Address) -> Self {
        self.creators.push(creator);
        self
    }

    pub fn contains(&self, actor: &Address) -> bool {
        self.creators.iter().any(|c| *c == actor)
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}
