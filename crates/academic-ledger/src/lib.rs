//! # Academic Ledger
//!
//! The unified API for the academic credentialing ledger: institutions,
//! courses, curricula, subject completion tokens and contract-delegated
//! degrees.
//!
//! ## Overview
//!
//! - **Registries**: institutions register courses and subjects, enroll
//!   students and publish versioned curricula
//! - **Subject tokens**: one token definition per subject, minted at most
//!   once per student
//! - **Degrees**: request, validation and issuance decided by an external
//!   degree contract and summarized on the ledger
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use academic_ledger::{Ledger, LedgerConfig, Msg};
//! use academic_ledger::core::Address;
//! use academic_ledger::degree::executor::mock::MockContractExecutor;
//! use academic_ledger::registry::RegisterInstitution;
//! use academic_ledger::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let executor = Arc::new(MockContractExecutor::new());
//!     let ledger = Ledger::new(store, executor, LedgerConfig::default()).unwrap();
//!
//!     let executed = ledger
//!         .execute(Msg::RegisterInstitution(RegisterInstitution {
//!             creator: Address::new("cosmos1alice"),
//!             name: "State University".into(),
//!             address: "addr-state".into(),
//!         }))
//!         .await
//!         .unwrap();
//!     println!("registered {:?}", executed.response.created_index());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `academic_ledger::core` - Entity types, validation, events
//! - `academic_ledger::store` - Key-value stores, transactions, blobs
//! - `academic_ledger::perms` - Authorization chain
//! - `academic_ledger::registry` - Registries and token issuance
//! - `academic_ledger::degree` - Degree workflow and contract port

pub mod config;
pub mod error;
pub mod ledger;
pub mod msg;
pub mod sink;

// Re-export component crates
pub use academic_ledger_core as core;
pub use academic_ledger_degree as degree;
pub use academic_ledger_perms as perms;
pub use academic_ledger_registry as registry;
pub use academic_ledger_store as store;

pub use config::{LedgerConfig, DEFAULT_AUTHORITY};
pub use error::{ErrorKind, LedgerError, Result};
pub use ledger::{Executed, Ledger, LedgerBuilder, RecordKind};
pub use msg::{Msg, MsgResponse, VerifyTokenInstance};
pub use sink::{EventSink, MemorySink, TracingSink};

// Re-export commonly used types
pub use academic_ledger_core::{Address, Event};
pub use academic_ledger_registry::{Page, PageRequest};
