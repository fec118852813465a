//! # Academic Ledger Degree
//!
//! Degree request, validation and issuance, delegated to an external
//! degree contract.
//!
//! ## Overview
//!
//! The ledger does not evaluate graduation rules. [`DegreeWorkflow`] sends
//! each step to the contract through a [`ContractExecutor`], decodes the
//! answer and stores a summary of it. The contract assigns request and
//! degree ids.
//!
//! ## Key Types
//!
//! - [`DegreeWorkflow`] - Message handlers and degree queries
//! - [`ContractExecutor`] - Port to the contract engine
//! - [`ContractMsg`] - JSON envelope sent to the contract
//! - [`WorkflowConfig`] - Strictness, address prefix and default contract
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use academic_ledger_core::{Address, Clock, SystemClock};
//! use academic_ledger_degree::executor::mock::MockContractExecutor;
//! use academic_ledger_degree::{DegreeWorkflow, RequestDegree, WorkflowConfig};
//! use academic_ledger_perms::AuthorizationPolicy;
//! use academic_ledger_registry::CurriculumRegistry;
//! use academic_ledger_store::{Context, MemoryStore};
//!
//! async fn example(curricula: Arc<CurriculumRegistry>) {
//!     let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
//!     let executor = Arc::new(MockContractExecutor::new());
//!     let workflow = DegreeWorkflow::new(WorkflowConfig::default(), policy, executor, curricula);
//!
//!     let store = MemoryStore::new();
//!     let mut ctx = Context::new(&store, SystemClock.now());
//!     let requested = workflow
//!         .request_degree(
//!             &mut ctx,
//!             RequestDegree {
//!                 creator: Address::new("cosmos1alice"),
//!                 student_id: "cosmos1ada".into(),
//!                 institution_id: "institution-1".into(),
//!                 curriculum_id: "curriculum-1".into(),
//!                 expected_graduation_date: "2024-12-15".into(),
//!                 contract_address: None,
//!             },
//!         )
//!         .await
//!         .unwrap();
//!     println!("request {} is {}", requested.degree_request_id, requested.status);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Call before write**: a failed or undecodable contract call leaves
//!   the store untouched
//! - **Contract resolution**: per-message override, then the governance
//!   stored address, then the configured default
//! - **Relaxed ordering by default**: with `strict_workflow` off the
//!   contract alone decides whether a step is allowed

pub mod error;
pub mod executor;
pub mod messages;
pub mod workflow;

pub use error::{DegreeError, Result};
pub use executor::{Coin, ContractExecutor, ExecutionError};
pub use messages::{
    CancelDegreeRequest, ContractInfo, ContractMsg, ContractUpdated, DegreeIssued,
    DegreeRequested, IssueDegree, RequestDegree, UpdateDegreeContract,
    ValidateDegreeRequirements, ValidationStatus,
};
pub use workflow::{DegreeWorkflow, WorkflowConfig, DEFAULT_CONTRACT_ADDRESS};
