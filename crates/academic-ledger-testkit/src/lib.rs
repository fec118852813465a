//! # Academic Ledger Testkit
//!
//! Testing utilities for the academic ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a seeded [`LedgerFixture`] over a memory store with a
//!   scriptable degree contract
//! - **Generators**: Proptest strategies for addresses, grades, GPAs and
//!   dates, plus [`MintParams`] for whole mint messages
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use academic_ledger_testkit::generators::{grade, out_of_range_grade};
//!
//! proptest! {
//!     #[test]
//!     fn grades_are_bounded(g in out_of_range_grade()) {
//!         prop_assert!(academic_ledger_core::validation::parse_grade(&g).is_err());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use academic_ledger_testkit::fixtures::{student_addresses, LedgerFixture};
//!
//! async fn example() {
//!     let fixture = LedgerFixture::new().await;
//!     let student = &student_addresses(1)[0];
//!     fixture.enroll(student).await;
//!     fixture.mint(student, "88").await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{script_happy_contract, student_addresses, LedgerFixture};
pub use generators::MintParams;
