//! Registry entities: institutions, courses, subjects, students and
//! curriculum trees.
//!
//! Cross-entity references are plain string indexes (`"institution-3"`);
//! no entity holds a pointer into another module's keyspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{Address, AuthorizationStatus};

/// A registered educational institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub index: String,
    pub name: String,
    pub address: String,
    pub creator: Address,
    pub is_authorized: AuthorizationStatus,
}

impl Institution {
    pub fn is_authorized(&self) -> bool {
        self.is_authorized.is_authorized()
    }
}

/// Academic level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    Undergraduate,
    Graduate,
    Postgraduate,
    Doctorate,
    Technical,
}

impl DegreeLevel {
    pub const EXPECTED: &'static str = "undergraduate, graduate, postgraduate, doctorate, technical";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undergraduate => "undergraduate",
            Self::Graduate => "graduate",
            Self::Postgraduate => "postgraduate",
            Self::Doctorate => "doctorate",
            Self::Technical => "technical",
        }
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DegreeLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undergraduate" => Ok(Self::Undergraduate),
            "graduate" => Ok(Self::Graduate),
            "postgraduate" => Ok(Self::Postgraduate),
            "doctorate" => Ok(Self::Doctorate),
            "technical" => Ok(Self::Technical),
            other => Err(ValidationError::InvalidVariant {
                field: "degree_level",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// A course offered by an institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub index: String,
    pub institution: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub total_credits: u64,
    pub degree_level: DegreeLevel,
    pub creator: Address,
    pub subject_count: u64,
}

/// Role a subject plays within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Required,
    Elective,
    Optional,
    Extracurricular,
}

impl SubjectType {
    pub const EXPECTED: &'static str = "required, elective, optional, extracurricular";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Elective => "elective",
            Self::Optional => "optional",
            Self::Extracurricular => "extracurricular",
        }
    }
}

impl FromStr for SubjectType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "elective" => Ok(Self::Elective),
            "optional" => Ok(Self::Optional),
            "extracurricular" => Ok(Self::Extracurricular),
            other => Err(ValidationError::InvalidVariant {
                field: "subject_type",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// A subject (discipline) taught within a course.
///
/// Extended content lives in the blob store; the subject keeps only the
/// content hash and the `ipfs://` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub index: String,
    pub creator: Address,
    pub institution: String,
    pub course_id: String,
    pub title: String,
    pub code: String,
    pub workload_hours: u64,
    pub credits: u64,
    pub description: String,
    pub subject_type: SubjectType,
    pub knowledge_area: String,
    pub content_hash: Option<String>,
    pub ipfs_link: Option<String>,
}

/// A student account known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub index: String,
    pub address: Address,
    pub name: String,
    pub institution: String,
    pub creator: Address,
}

/// One semester of a curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub semester_number: u32,
    pub subject_ids: Vec<String>,
}

/// A pool of electives with its own completion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveGroup {
    pub group_id: String,
    pub name: String,
    pub description: String,
    pub subject_ids: Vec<String>,
    pub min_subjects_required: u32,
    pub credits_required: u64,
    pub knowledge_area: String,
}

/// Requirements a student must meet to graduate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraduationRequirements {
    pub total_credits_required: u64,
    pub min_gpa: f64,
    pub required_elective_credits: u64,
    pub required_activities: Vec<String>,
    pub minimum_time_years: u32,
    pub maximum_time_years: u32,
}

/// A versioned curriculum for a course, built incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumTree {
    pub index: String,
    pub course_id: String,
    pub version: String,
    pub elective_min: u32,
    pub total_workload_hours: u64,
    pub required_subjects: Vec<String>,
    pub elective_subjects: Vec<String>,
    pub semester_structure: Vec<Semester>,
    pub elective_groups: Vec<ElectiveGroup>,
    pub graduation_requirements: Option<GraduationRequirements>,
    pub creator: Address,
}

impl CurriculumTree {
    pub fn has_semester(&self, number: u32) -> bool {
        self.semester_structure
            .iter()
            .any(|s| s.semester_number == number)
    }

    pub fn has_elective_group(&self, name: &str) -> bool {
        self.elective_groups.iter().any(|g| g.name == name)
    }
}
