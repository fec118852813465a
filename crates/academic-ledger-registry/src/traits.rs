//! Expected-keeper traits.
//!
//! Each registry depends on the others only through these narrow
//! capabilities, injected as `Arc<dyn ...>` at construction.

use academic_ledger_core::{
    Address, Course, CurriculumTree, Institution, Student, Subject, TokenDefinition,
};
use academic_ledger_store::KvStore;
use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait InstitutionKeeper: Send + Sync {
    async fn institution(&self, store: &dyn KvStore, index: &str) -> Result<Option<Institution>>;
}

#[async_trait]
pub trait CourseKeeper: Send + Sync {
    async fn course(&self, store: &dyn KvStore, index: &str) -> Result<Option<Course>>;

    /// Bump the display counter of subjects attached to a course.
    async fn note_subject_added(&self, store: &dyn KvStore, index: &str) -> Result<()>;
}

#[async_trait]
pub trait SubjectKeeper: Send + Sync {
    async fn subject(&self, store: &dyn KvStore, index: &str) -> Result<Option<Subject>>;
}

#[async_trait]
pub trait StudentKeeper: Send + Sync {
    async fn student_by_address(
        &self,
        store: &dyn KvStore,
        address: &Address,
    ) -> Result<Option<Student>>;

    /// Registered, and the institution exists.
    async fn is_eligible(
        &self,
        store: &dyn KvStore,
        address: &Address,
        institution: &str,
    ) -> Result<bool>;
}

#[async_trait]
pub trait TokenDefinitionKeeper: Send + Sync {
    async fn token_definition(
        &self,
        store: &dyn KvStore,
        index: &str,
    ) -> Result<Option<TokenDefinition>>;
}

#[async_trait]
pub trait CurriculumKeeper: Send + Sync {
    async fn curriculum(&self, store: &dyn KvStore, index: &str) -> Result<Option<CurriculumTree>>;
}
