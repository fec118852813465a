//! Structured events emitted on every successful mutation.
//!
//! Indexers rely on the event kinds and attribute keys being stable, so
//! they are spelled out as constants in [`kinds`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key/value attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// A structured audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute (builder style).
    pub fn attr(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// Look up the first attribute with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Event kind names.
pub mod kinds {
    pub const INSTITUTION_REGISTERED: &str = "institution_registered";
    pub const INSTITUTION_UPDATED: &str = "institution_updated";
    pub const COURSE_CREATED: &str = "course_created";
    pub const COURSE_UPDATED: &str = "course_updated";
    pub const SUBJECT_CREATED: &str = "subject_created";
    pub const STUDENT_REGISTERED: &str = "student_registered";
    pub const CURRICULUM_TREE_CREATED: &str = "curriculum_tree_created";
    pub const SEMESTER_ADDED: &str = "semester_added_to_curriculum";
    pub const ELECTIVE_GROUP_ADDED: &str = "elective_group_added";
    pub const GRADUATION_REQUIREMENTS_SET: &str = "graduation_requirements_set";
    pub const TOKEN_DEFINITION_CREATED: &str = "token_definition_created";
    pub const TOKEN_DEFINITION_UPDATED: &str = "token_definition_updated";
    pub const SUBJECT_TOKEN_MINTED: &str = "subject_token_minted";
    pub const TOKEN_INSTANCE_VERIFIED: &str = "token_instance_verified";
    pub const DEGREE_REQUESTED: &str = "degree_requested";
    pub const DEGREE_VALIDATED: &str = "degree_validated";
    pub const DEGREE_ISSUED: &str = "degree_issued";
    pub const DEGREE_REJECTED: &str = "degree_rejected";
    pub const DEGREE_CONTRACT_UPDATED: &str = "degree_contract_updated";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = Event::new(kinds::COURSE_CREATED)
            .attr("course_index", "course-1")
            .attr("total_credits", 4u64);

        assert_eq!(event.kind, "course_created");
        assert_eq!(event.get("course_index"), Some("course-1"));
        assert_eq!(event.get("total_credits"), Some("4"));
        assert_eq!(event.get("missing"), None);
    }
}
