//! # Academic Ledger Permissions
//!
//! The authorization chain shared by every registry.
//!
//! ## Overview
//!
//! Permissions are not stored as separate grants. They are derived from the
//! entities themselves: who created them, who created the institution they
//! belong to, and whether governance has authorized that institution.
//!
//! ## Key Types
//!
//! - [`AuthorizationPolicy`] - Predicates and `require_*` checks
//! - [`OwnershipChain`] - Creators that own an entity, nearest first
//! - [`Action`] - The guarded mutation, used in denial errors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use academic_ledger_core::Address;
//! use academic_ledger_perms::{AuthorizationPolicy, OwnershipChain};
//!
//! let policy = AuthorizationPolicy::new(Address::new("cosmos1gov"), false);
//! let creator = Address::new("cosmos1alice");
//! let chain = OwnershipChain::of(&creator);
//! assert!(policy.can_mutate(&creator, &chain));
//! ```

pub mod action;
pub mod error;
pub mod policy;

pub use action::{Action, OwnershipChain};
pub use error::{PermsError, Result};
pub use policy::AuthorizationPolicy;
