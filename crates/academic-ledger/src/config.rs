//! Ledger configuration.

use std::path::Path;

use academic_ledger_core::Address;
use academic_ledger_degree::{ContractInfo, WorkflowConfig, DEFAULT_CONTRACT_ADDRESS};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Governance module account on a default Cosmos chain.
pub const DEFAULT_AUTHORITY: &str = "cosmos10d07y265gmmuvt4z0w9aw880jnsr700j6zn9kn";

/// Configuration for the [`Ledger`](crate::Ledger).
///
/// Every field has a default, so a JSON file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Governance identity allowed to bypass ownership checks.
    pub authority: String,

    /// Human-readable prefix of account addresses.
    pub address_prefix: String,

    /// Refuse out-of-order degree transitions instead of leaving ordering
    /// to the contract.
    pub strict_workflow: bool,

    /// Require institutions to be authorized before they can be updated
    /// by their creator.
    pub require_governance_authorization: bool,

    /// Degree contract used until governance stores another one.
    pub contract_address: String,
    pub contract_version: String,
    pub contract_gas_limit: u64,

    /// Page size used when a query does not ask for one.
    pub default_page_limit: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.into(),
            address_prefix: "cosmos".into(),
            strict_workflow: false,
            require_governance_authorization: false,
            contract_address: DEFAULT_CONTRACT_ADDRESS.into(),
            contract_version: "1.0.0".into(),
            contract_gas_limit: 500_000,
            default_page_limit: academic_ledger_registry::pagination::DEFAULT_LIMIT,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Check addresses against the prefix and bounds on numeric settings.
    pub fn validate(&self) -> Result<()> {
        if self.address_prefix.is_empty() {
            return Err(LedgerError::Config("address_prefix is empty".into()));
        }
        Address::parse(&self.authority, &self.address_prefix)?;
        Address::parse(&self.contract_address, &self.address_prefix)?;
        if self.contract_gas_limit == 0 {
            return Err(LedgerError::Config("contract_gas_limit must be positive".into()));
        }
        if self.default_page_limit == 0
            || self.default_page_limit > academic_ledger_registry::pagination::MAX_LIMIT
        {
            return Err(LedgerError::Config(format!(
                "default_page_limit must be between 1 and {}",
                academic_ledger_registry::pagination::MAX_LIMIT
            )));
        }
        Ok(())
    }

    pub fn authority(&self) -> Address {
        Address::new(self.authority.clone())
    }

    pub(crate) fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            strict_workflow: self.strict_workflow,
            address_prefix: self.address_prefix.clone(),
            contract: ContractInfo {
                address: self.contract_address.clone(),
                version: self.contract_version.clone(),
                gas_limit: self.contract_gas_limit,
            },
        }
    }
}
