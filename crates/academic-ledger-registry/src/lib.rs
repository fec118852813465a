//! # Academic Ledger Registry
//!
//! Entity registries and the token issuance engine.
//!
//! ## Overview
//!
//! Each registry owns one primary keyspace plus its secondary indexes and
//! exposes message handlers (taking a [`Context`](academic_ledger_store::Context))
//! and read-only queries (taking any [`KvStore`](academic_ledger_store::KvStore)).
//! Registries reach each other only through the expected-keeper traits in
//! [`traits`].
//!
//! ## Key Types
//!
//! - [`InstitutionRegistry`], [`CourseRegistry`], [`SubjectRegistry`],
//!   [`StudentRegistry`], [`CurriculumRegistry`]
//! - [`TokenDefinitionRegistry`] - One credential template per subject
//! - [`TokenInstanceRegistry`] - Minting, verification and lookups
//! - [`PageRequest`] / [`Page`] - Offset pagination for list queries
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use academic_ledger_core::Address;
//! use academic_ledger_perms::AuthorizationPolicy;
//! use academic_ledger_registry::{InstitutionRegistry, RegisterInstitution};
//! use academic_ledger_store::{Context, MemoryStore};
//!
//! async fn example() {
//!     let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
//!     let institutions = InstitutionRegistry::new(policy);
//!
//!     let store = MemoryStore::new();
//!     let mut ctx = Context::new(&store, chrono::Utc::now());
//!     let index = institutions
//!         .register(
//!             &mut ctx,
//!             RegisterInstitution {
//!                 creator: Address::new("cosmos1alice"),
//!                 name: "State University".into(),
//!                 address: "addr-state".into(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//!     assert_eq!(index, "institution-1");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Sequential ids**: every registry numbers records through its own
//!   counter key, written in the same transaction as the record
//! - **Uniqueness by index**: unique tuples are point lookups, never scans
//! - **No cached validity**: token validity is recomputed on every query

pub mod course;
pub mod curriculum;
pub mod error;
pub mod institution;
pub mod instance;
pub mod keys;
pub mod pagination;
pub mod student;
pub mod subject;
pub mod tokendef;
pub mod traits;

#[cfg(test)]
mod testing;

pub use course::{CourseRegistry, CreateCourse, UpdateCourse};
pub use curriculum::{
    AddElectiveGroup, AddSemester, CreateCurriculum, CurriculumRegistry,
    SetGraduationRequirements,
};
pub use error::{RegistryError, Result};
pub use institution::{InstitutionRegistry, RegisterInstitution, UpdateInstitution};
pub use instance::{MintSubjectToken, TokenInstanceRegistry, TokenVerification};
pub use pagination::{Page, PageRequest, PageResponse};
pub use student::{RegisterStudent, StudentRegistry};
pub use subject::{CreateSubject, SubjectRegistry};
pub use tokendef::{CreateTokenDefinition, TokenDefinitionRegistry, UpdateTokenDefinition};
pub use traits::{
    CourseKeeper, CurriculumKeeper, InstitutionKeeper, StudentKeeper, SubjectKeeper,
    TokenDefinitionKeeper,
};
