//! Institution registry.
//!
//! Name and address are each unique, enforced through point-lookup indexes
//! that map the value back to the owning institution index.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::require_non_empty;
use academic_ledger_core::{Address, AuthorizationStatus, Event, Institution, ValidationError};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_store::{Context, KvStore, StoreExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{self, INSTITUTIONS, INSTITUTION_ADDRESS, INSTITUTION_NAME, INSTITUTION_VALUE};
use crate::pagination::{Page, PageRequest};
use crate::traits::InstitutionKeeper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInstitution {
    pub creator: Address,
    pub name: String,
    pub address: String,
}

/// Fields left as `None` (or empty) are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInstitution {
    pub updater: Address,
    pub index: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_authorized: Option<String>,
}

pub struct InstitutionRegistry {
    policy: Arc<AuthorizationPolicy>,
}

impl InstitutionRegistry {
    pub fn new(policy: Arc<AuthorizationPolicy>) -> Self {
        Self { policy }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────

    /// Register a new institution. It starts unauthorized.
    pub async fn register(&self, ctx: &mut Context<'_>, msg: RegisterInstitution) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("name", &msg.name)?;
        require_non_empty("address", &msg.address)?;

        let store = ctx.store();
        ensure_unclaimed(store, INSTITUTION_NAME, "name", &msg.name, None).await?;
        ensure_unclaimed(store, INSTITUTION_ADDRESS, "address", &msg.address, None).await?;

        let index = INSTITUTIONS.next_index(store).await?;
        let institution = Institution {
            index: index.clone(),
            name: msg.name,
            address: msg.address,
            creator: msg.creator,
            is_authorized: AuthorizationStatus::Unauthorized,
        };
        self.write(store, &institution).await?;

        tracing::info!(index = %index, name = %institution.name, "institution registered");
        ctx.emit(
            Event::new(kinds::INSTITUTION_REGISTERED)
                .attr("index", &index)
                .attr("name", &institution.name)
                .attr("creator", &institution.creator),
        );
        Ok(index)
    }

    pub async fn update(&self, ctx: &mut Context<'_>, msg: UpdateInstitution) -> Result<()> {
        let store = ctx.store();
        let mut institution = self.require(store, &msg.index).await?;
        self.policy
            .require_update_institution(&msg.updater, &institution)?;

        let name = msg.name.filter(|n| !n.is_empty());
        let address = msg.address.filter(|a| !a.is_empty());
        let status = msg
            .is_authorized
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<AuthorizationStatus>())
            .transpose()?;

        if name.is_none() && address.is_none() && status.is_none() {
            return Err(ValidationError::NoUpdates.into());
        }

        if let Some(name) = &name {
            ensure_unclaimed(store, INSTITUTION_NAME, "name", name, Some(&institution.index)).await?;
        }
        if let Some(address) = &address {
            ensure_unclaimed(
                store,
                INSTITUTION_ADDRESS,
                "address",
                address,
                Some(&institution.index),
            )
            .await?;
        }
        if status.is_some() {
            self.policy
                .require_authorize_institution(&msg.updater, &institution)?;
        }

        // Move indexes only once every check has passed
        if let Some(name) = name {
            store.delete(&keys::key(INSTITUTION_NAME, &[&institution.name])).await?;
            institution.name = name;
        }
        if let Some(address) = address {
            store
                .delete(&keys::key(INSTITUTION_ADDRESS, &[&institution.address]))
                .await?;
            institution.address = address;
        }
        if let Some(status) = status {
            institution.is_authorized = status;
        }
        self.write(store, &institution).await?;

        tracing::info!(
            index = %institution.index,
            is_authorized = institution.is_authorized.as_str(),
            "institution updated"
        );
        ctx.emit(
            Event::new(kinds::INSTITUTION_UPDATED)
                .attr("index", &institution.index)
                .attr("updater", &msg.updater)
                .attr("name", &institution.name)
                .attr("is_authorized", institution.is_authorized.as_str()),
        );
        Ok(())
    }

    /// Delete an institution with its name and address indexes.
    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let institution = self.require(store, index).await?;
        store.delete(&keys::key(INSTITUTION_NAME, &[&institution.name])).await?;
        store
            .delete(&keys::key(INSTITUTION_ADDRESS, &[&institution.address]))
            .await?;
        store.delete(&keys::key(INSTITUTION_VALUE, &[index])).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<Institution>> {
        Ok(store
            .get_record(&keys::key(INSTITUTION_VALUE, &[index]))
            .await?)
    }

    pub async fn require(&self, store: &dyn KvStore, index: &str) -> Result<Institution> {
        self.get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("institution", index))
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store.has(&keys::key(INSTITUTION_VALUE, &[index])).await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<Institution>> {
        Ok(store
            .records_with_prefix(INSTITUTION_VALUE.as_bytes())
            .await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<Institution>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    /// Missing institutions are reported as not authorized.
    pub async fn is_authorized(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(self
            .get(store, index)
            .await?
            .is_some_and(|i| i.is_authorized()))
    }

    pub async fn is_creator(&self, store: &dyn KvStore, index: &str, actor: &Address) -> Result<bool> {
        Ok(self
            .get(store, index)
            .await?
            .is_some_and(|i| i.creator == *actor))
    }

    pub async fn authorized_institutions(&self, store: &dyn KvStore) -> Result<Vec<Institution>> {
        let mut all = self.get_all(store).await?;
        all.retain(Institution::is_authorized);
        Ok(all)
    }

    pub async fn get_by_name(&self, store: &dyn KvStore, name: &str) -> Result<Option<Institution>> {
        match store.get(&keys::key(INSTITUTION_NAME, &[name])).await? {
            Some(index) => self.get(store, &String::from_utf8_lossy(&index)).await,
            None => Ok(None),
        }
    }

    /// Number of institutions ever registered.
    pub async fn count(&self, store: &dyn KvStore) -> Result<u64> {
        Ok(INSTITUTIONS.current(store).await?)
    }

    async fn write(&self, store: &dyn KvStore, institution: &Institution) -> Result<()> {
        let index = institution.index.as_bytes();
        store
            .set_record(&keys::key(INSTITUTION_VALUE, &[&institution.index]), institution)
            .await?;
        store
            .set(&keys::key(INSTITUTION_NAME, &[&institution.name]), index)
            .await?;
        store
            .set(&keys::key(INSTITUTION_ADDRESS, &[&institution.address]), index)
            .await?;
        Ok(())
    }
}

/// Fail if `value` is already indexed by an institution other than `owner`.
async fn ensure_unclaimed(
    store: &dyn KvStore,
    prefix: &str,
    field: &str,
    value: &str,
    owner: Option<&str>,
) -> Result<()> {
    if let Some(existing) = store.get(&keys::key(prefix, &[value])).await? {
        if owner.map(str::as_bytes) != Some(existing.as_slice()) {
            return Err(RegistryError::Conflict(format!(
                "institution with {field} '{value}' already exists"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl InstitutionKeeper for InstitutionRegistry {
    async fn institution(&self, store: &dyn KvStore, index: &str) -> Result<Option<Institution>> {
        self.get(store, index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academic_ledger_store::{MemoryStore, Transaction};
    use chrono::Utc;

    fn registry(strict: bool) -> InstitutionRegistry {
        InstitutionRegistry::new(Arc::new(AuthorizationPolicy::new(
            Address::new("cosmos1gov"),
            strict,
        )))
    }

    fn register_msg(name: &str, address: &str) -> RegisterInstitution {
        RegisterInstitution {
            creator: Address::new("cosmos1alice"),
            name: name.into(),
            address: address.into(),
        }
    }

    #[tokio::test]
    async fn test_register_assigns_sequential_index() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());

        let first = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();
        let second = reg.register(&mut ctx, register_msg("USP", "addr-usp")).await.unwrap();

        assert_eq!(first, "institution-1");
        assert_eq!(second, "institution-2");
        assert_eq!(reg.count(&store).await.unwrap(), 2);

        let mit = reg.get(&store, "institution-1").await.unwrap().unwrap();
        assert_eq!(mit.is_authorized, AuthorizationStatus::Unauthorized);
        assert_eq!(ctx.events()[0].get("name"), Some("MIT"));
    }

    #[tokio::test]
    async fn test_duplicate_name_or_address_conflicts() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        let by_name = reg.register(&mut ctx, register_msg("MIT", "addr-other")).await;
        assert!(matches!(by_name, Err(RegistryError::Conflict(_))));

        let by_address = reg.register(&mut ctx, register_msg("Other", "addr-mit")).await;
        assert!(matches!(by_address, Err(RegistryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_failed_register_leaves_no_trace() {
        let store = MemoryStore::new();
        let reg = registry(false);

        {
            let tx = Transaction::new(&store);
            let mut ctx = Context::new(&tx, Utc::now());
            reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();
            tx.commit().await.unwrap();
        }

        {
            let tx = Transaction::new(&store);
            let mut ctx = Context::new(&tx, Utc::now());
            assert!(reg.register(&mut ctx, register_msg("MIT", "x")).await.is_err());
        }

        assert_eq!(reg.count(&store).await.unwrap(), 1);
        assert!(!store.has(b"Institution/address/x").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_moves_indexes() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        let index = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        reg.update(
            &mut ctx,
            UpdateInstitution {
                updater: Address::new("cosmos1alice"),
                index: index.clone(),
                name: Some("Massachusetts Institute".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(reg.get_by_name(&store, "MIT").await.unwrap().is_none());
        let renamed = reg
            .get_by_name(&store, "Massachusetts Institute")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.index, index);

        // The old name is free again
        reg.register(&mut ctx, register_msg("MIT", "addr-new")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_is_allowed() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        let index = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        let result = reg
            .update(
                &mut ctx,
                UpdateInstitution {
                    updater: Address::new("cosmos1alice"),
                    index,
                    name: Some("MIT".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        let index = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        let err = reg
            .update(
                &mut ctx,
                UpdateInstitution {
                    updater: Address::new("cosmos1alice"),
                    index,
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "validation error: no valid updates provided");
    }

    #[tokio::test]
    async fn test_authorization_rules() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(&store, Utc::now());
        let strict = registry(true);
        let index = strict.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        let authorize = |updater: &str| UpdateInstitution {
            updater: Address::new(updater),
            index: index.clone(),
            is_authorized: Some("true".into()),
            ..Default::default()
        };

        // Governance-only mode rejects the creator
        let err = strict.update(&mut ctx, authorize("cosmos1alice")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
        assert!(!strict.is_authorized(&store, &index).await.unwrap());

        strict.update(&mut ctx, authorize("cosmos1gov")).await.unwrap();
        assert!(strict.is_authorized(&store, &index).await.unwrap());
        assert_eq!(strict.authorized_institutions(&store).await.unwrap().len(), 1);

        // Development mode lets the creator self-authorize
        let relaxed = registry(false);
        relaxed.update(&mut ctx, authorize("cosmos1alice")).await.unwrap();

        let bogus = UpdateInstitution {
            is_authorized: Some("maybe".into()),
            ..authorize("cosmos1gov")
        };
        assert!(matches!(
            relaxed.update(&mut ctx, bogus).await,
            Err(RegistryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stranger_cannot_update() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        let index = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        let err = reg
            .update(
                &mut ctx,
                UpdateInstitution {
                    updater: Address::new("cosmos1mallory"),
                    index,
                    name: Some("Hijacked".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
        assert!(reg.is_creator(&store, "institution-1", &Address::new("cosmos1alice")).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_frees_indexes() {
        let store = MemoryStore::new();
        let reg = registry(false);
        let mut ctx = Context::new(&store, Utc::now());
        let index = reg.register(&mut ctx, register_msg("MIT", "addr-mit")).await.unwrap();

        reg.remove(&store, &index).await.unwrap();
        assert!(!reg.exists(&store, &index).await.unwrap());
        assert!(!store.has(b"Institution/name/MIT").await.unwrap());
        assert!(!store.has(b"Institution/address/addr-mit").await.unwrap());
    }
}
