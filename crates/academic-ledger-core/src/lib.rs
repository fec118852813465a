//! # Academic Ledger Core
//!
//! Pure primitives for the Academic Ledger: credential entities, field
//! validation, content hashes and structured events.
//!
//! This crate contains no I/O, no storage, no networking. Every other crate
//! in the workspace builds on the types defined here.
//!
//! ## Key Types
//!
//! - [`Institution`], [`Course`], [`Subject`], [`Student`], [`CurriculumTree`] - registry entities
//! - [`TokenDefinition`], [`SubjectTokenInstance`] - credential template and minted record
//! - [`DegreeRequest`], [`Degree`] - degree workflow summaries
//! - [`Address`] - account identity of an actor
//! - [`ContentHash`] - Blake3 content address
//! - [`Event`] - structured key/value audit event
//!
//! ## Validation
//!
//! Shape checks (required fields, numeric ranges, date formats) live in
//! [`validation`] and run before any store access.

pub mod academic;
pub mod degree;
pub mod error;
pub mod event;
pub mod hash;
pub mod time;
pub mod token;
pub mod types;
pub mod validation;

pub use academic::{
    Course, CurriculumTree, DegreeLevel, ElectiveGroup, GraduationRequirements, Institution,
    Semester, Student, Subject, SubjectType,
};
pub use degree::{Degree, DegreeRequest, DegreeRequestStatus, DegreeStatus};
pub use error::ValidationError;
pub use event::{Event, EventAttribute};
pub use hash::ContentHash;
pub use time::{format_timestamp, Clock, FixedClock, SystemClock};
pub use token::{
    SubjectTokenInstance, TokenAttribute, TokenDefinition, TokenMetadata, TokenType,
};
pub use types::{Address, AuthorizationStatus};
