//! Student registry.
//!
//! Students are keyed by sequential index and looked up by account address
//! through a unique address index.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::require_non_empty;
use academic_ledger_core::{Address, Event, Student};
use academic_ledger_store::{Context, KvStore, StoreExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{self, STUDENTS, STUDENT_ADDRESS, STUDENT_VALUE};
use crate::pagination::{Page, PageRequest};
use crate::traits::{InstitutionKeeper, StudentKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterStudent {
    pub creator: Address,
    pub address: String,
    pub name: String,
    pub institution: String,
}

pub struct StudentRegistry {
    address_prefix: String,
    institutions: Arc<dyn InstitutionKeeper>,
}

impl StudentRegistry {
    pub fn new(address_prefix: impl Into<String>, institutions: Arc<dyn InstitutionKeeper>) -> Self {
        Self {
            address_prefix: address_prefix.into(),
            institutions,
        }
    }

    pub async fn register(&self, ctx: &mut Context<'_>, msg: RegisterStudent) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("name", &msg.name)?;
        require_non_empty("institution", &msg.institution)?;
        let address = Address::parse(&msg.address, &self.address_prefix)?;

        let store = ctx.store();
        if self
            .institutions
            .institution(store, &msg.institution)
            .await?
            .is_none()
        {
            return Err(RegistryError::not_found("institution", &msg.institution));
        }

        let address_key = keys::key(STUDENT_ADDRESS, &[address.as_str()]);
        if store.has(&address_key).await? {
            return Err(RegistryError::Conflict(format!(
                "student with address '{address}' already registered"
            )));
        }

        let index = STUDENTS.next_index(store).await?;
        let student = Student {
            index: index.clone(),
            address,
            name: msg.name,
            institution: msg.institution,
            creator: msg.creator,
        };
        store
            .set_record(&keys::key(STUDENT_VALUE, &[&index]), &student)
            .await?;
        store.set(&address_key, index.as_bytes()).await?;

        tracing::info!(index = %index, address = %student.address, "student registered");
        ctx.emit(
            Event::new(kinds::STUDENT_REGISTERED)
                .attr("index", &index)
                .attr("address", &student.address)
                .attr("name", &student.name)
                .attr("creator", &student.creator),
        );
        Ok(index)
    }

    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let student = self
            .get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("student", index))?;
        store
            .delete(&keys::key(STUDENT_ADDRESS, &[student.address.as_str()]))
            .await?;
        store.delete(&keys::key(STUDENT_VALUE, &[index])).await?;
        Ok(())
    }

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<Student>> {
        Ok(store.get_record(&keys::key(STUDENT_VALUE, &[index])).await?)
    }

    pub async fn get_by_address(&self, store: &dyn KvStore, address: &Address) -> Result<Option<Student>> {
        match store
            .get(&keys::key(STUDENT_ADDRESS, &[address.as_str()]))
            .await?
        {
            Some(index) => self.get(store, &String::from_utf8_lossy(&index)).await,
            None => Ok(None),
        }
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<Student>> {
        Ok(store.records_with_prefix(STUDENT_VALUE.as_bytes()).await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<Student>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    /// A student may receive tokens from an institution once registered,
    /// provided the institution exists.
    pub async fn validate_eligibility(
        &self,
        store: &dyn KvStore,
        address: &Address,
        institution: &str,
    ) -> Result<bool> {
        if self.get_by_address(store, address).await?.is_none() {
            return Ok(false);
        }
        Ok(self
            .institutions
            .institution(store, institution)
            .await?
            .is_some())
    }
}

#[async_trait]
impl StudentKeeper for StudentRegistry {
    async fn student_by_address(
        &self,
        store: &dyn KvStore,
        address: &Address,
    ) -> Result<Option<Student>> {
        self.get_by_address(store, address).await
    }

    async fn is_eligible(
        &self,
        store: &dyn KvStore,
        address: &Address,
        institution: &str,
    ) -> Result<bool> {
        self.validate_eligibility(store, address, institution).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institution::{InstitutionRegistry, RegisterInstitution};
    use academic_ledger_perms::AuthorizationPolicy;
    use academic_ledger_store::MemoryStore;
    use chrono::Utc;

    async fn setup(store: &MemoryStore) -> StudentRegistry {
        let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
        let institutions = Arc::new(InstitutionRegistry::new(policy));
        let mut ctx = Context::new(store, Utc::now());
        institutions
            .register(
                &mut ctx,
                RegisterInstitution {
                    creator: Address::new("cosmos1alice"),
                    name: "MIT".into(),
                    address: "addr-mit".into(),
                },
            )
            .await
            .unwrap();
        StudentRegistry::new("cosmos", institutions)
    }

    fn register_msg(address: &str) -> RegisterStudent {
        RegisterStudent {
            creator: Address::new("cosmos1alice"),
            address: address.into(),
            name: "Ada".into(),
            institution: "institution-1".into(),
        }
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let store = MemoryStore::new();
        let students = setup(&store).await;
        let mut ctx = Context::new(&store, Utc::now());

        let index = students
            .register(&mut ctx, register_msg("cosmos1ada"))
            .await
            .unwrap();
        assert_eq!(index, "student-1");

        let ada = Address::new("cosmos1ada");
        let found = students.get_by_address(&store, &ada).await.unwrap().unwrap();
        assert_eq!(found.index, index);
        assert!(students
            .validate_eligibility(&store, &ada, "institution-1")
            .await
            .unwrap());
        assert!(!students
            .validate_eligibility(&store, &ada, "institution-2")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_address_must_be_well_formed_and_unique() {
        let store = MemoryStore::new();
        let students = setup(&store).await;
        let mut ctx = Context::new(&store, Utc::now());

        for bad in ["ada", "osmo1ada", "cosmos1", "cosmos1ADA"] {
            assert!(matches!(
                students.register(&mut ctx, register_msg(bad)).await,
                Err(RegistryError::Validation(_))
            ));
        }

        students.register(&mut ctx, register_msg("cosmos1ada")).await.unwrap();
        assert!(matches!(
            students.register(&mut ctx, register_msg("cosmos1ada")).await,
            Err(RegistryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_student_is_not_eligible() {
        let store = MemoryStore::new();
        let students = setup(&store).await;
        assert!(!students
            .validate_eligibility(&store, &Address::new("cosmos1nobody"), "institution-1")
            .await
            .unwrap());
    }
}
