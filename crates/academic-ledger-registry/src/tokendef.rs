//! Token definitions.
//!
//! Exactly one definition exists per subject. The owning institution and
//! course are always copied from the subject record, never taken from the
//! message.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::require_non_empty;
use academic_ledger_core::{Address, Event, TokenDefinition, TokenMetadata, TokenType, ValidationError};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_store::{Context, KvStore, StoreExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{
    self, TOKEN_DEFINITIONS, TOKEN_DEF_BY_COURSE, TOKEN_DEF_BY_INSTITUTION, TOKEN_DEF_BY_SUBJECT,
    TOKEN_DEF_VALUE,
};
use crate::pagination::{Page, PageRequest};
use crate::traits::{SubjectKeeper, TokenDefinitionKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTokenDefinition {
    pub creator: Address,
    pub subject_id: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_type: String,
    pub is_transferable: bool,
    pub is_burnable: bool,
    /// Zero means unlimited.
    pub max_supply: u64,
    #[serde(default)]
    pub metadata: TokenMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTokenDefinition {
    pub updater: Address,
    pub index: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub is_transferable: Option<bool>,
    pub is_burnable: Option<bool>,
    pub max_supply: Option<u64>,
    pub metadata: Option<TokenMetadata>,
}

pub struct TokenDefinitionRegistry {
    policy: Arc<AuthorizationPolicy>,
    subjects: Arc<dyn SubjectKeeper>,
}

impl TokenDefinitionRegistry {
    pub fn new(policy: Arc<AuthorizationPolicy>, subjects: Arc<dyn SubjectKeeper>) -> Self {
        Self { policy, subjects }
    }

    pub async fn create(&self, ctx: &mut Context<'_>, msg: CreateTokenDefinition) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("subject_id", &msg.subject_id)?;
        require_non_empty("token_name", &msg.token_name)?;
        require_non_empty("token_symbol", &msg.token_symbol)?;
        let token_type: TokenType = msg.token_type.parse()?;

        let store = ctx.store();
        let subject = self
            .subjects
            .subject(store, &msg.subject_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("subject", &msg.subject_id))?;

        let by_subject = store
            .iterate_prefix(&keys::scan(TOKEN_DEF_BY_SUBJECT, &[&subject.index]))
            .await?;
        if by_subject.remaining() > 0 {
            return Err(RegistryError::Conflict(format!(
                "token definition already exists for subject {}",
                subject.index
            )));
        }

        let index = TOKEN_DEFINITIONS.next_index(store).await?;
        let definition = TokenDefinition {
            index: index.clone(),
            subject_id: subject.index,
            institution_id: subject.institution,
            course_id: subject.course_id,
            token_name: msg.token_name,
            token_symbol: msg.token_symbol,
            token_type,
            is_transferable: msg.is_transferable,
            is_burnable: msg.is_burnable,
            max_supply: msg.max_supply,
            content_hash: msg.metadata.content_hash().to_hex(),
            metadata: msg.metadata,
            creator: msg.creator,
            created_at: ctx.timestamp(),
        };
        store
            .set_record(&keys::key(TOKEN_DEF_VALUE, &[&index]), &definition)
            .await?;
        for marker in index_keys(&definition) {
            store.set_marker(&marker).await?;
        }

        tracing::info!(index = %index, subject = %definition.subject_id, "token definition created");
        ctx.emit(
            Event::new(kinds::TOKEN_DEFINITION_CREATED)
                .attr("token_def_index", &index)
                .attr("subject_id", &definition.subject_id)
                .attr("token_name", &definition.token_name)
                .attr("token_symbol", &definition.token_symbol)
                .attr("token_type", definition.token_type)
                .attr("max_supply", definition.max_supply)
                .attr("is_transferable", definition.is_transferable)
                .attr("is_burnable", definition.is_burnable)
                .attr("creator", &definition.creator),
        );
        Ok(index)
    }

    pub async fn update(&self, ctx: &mut Context<'_>, msg: UpdateTokenDefinition) -> Result<()> {
        let store = ctx.store();
        let mut definition = self.require(store, &msg.index).await?;
        self.policy.require_update_token_definition(
            &msg.updater,
            &definition.index,
            &definition.creator,
        )?;

        let mut changed = false;
        if let Some(name) = msg.token_name.filter(|n| !n.is_empty()) {
            definition.token_name = name;
            changed = true;
        }
        if let Some(symbol) = msg.token_symbol.filter(|s| !s.is_empty()) {
            definition.token_symbol = symbol;
            changed = true;
        }
        if let Some(transferable) = msg.is_transferable {
            definition.is_transferable = transferable;
            changed = true;
        }
        if let Some(burnable) = msg.is_burnable {
            definition.is_burnable = burnable;
            changed = true;
        }
        if let Some(max_supply) = msg.max_supply {
            definition.max_supply = max_supply;
            changed = true;
        }
        if let Some(metadata) = msg.metadata {
            definition.content_hash = metadata.content_hash().to_hex();
            definition.metadata = metadata;
            changed = true;
        }
        if !changed {
            return Err(ValidationError::NoUpdates.into());
        }

        store
            .set_record(&keys::key(TOKEN_DEF_VALUE, &[&definition.index]), &definition)
            .await?;

        tracing::info!(index = %definition.index, "token definition updated");
        ctx.emit(
            Event::new(kinds::TOKEN_DEFINITION_UPDATED)
                .attr("token_def_index", &definition.index)
                .attr("updater", &msg.updater),
        );
        Ok(())
    }

    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let definition = self.require(store, index).await?;
        for marker in index_keys(&definition) {
            store.delete(&marker).await?;
        }
        store.delete(&keys::key(TOKEN_DEF_VALUE, &[index])).await?;
        Ok(())
    }

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<TokenDefinition>> {
        Ok(store.get_record(&keys::key(TOKEN_DEF_VALUE, &[index])).await?)
    }

    pub async fn require(&self, store: &dyn KvStore, index: &str) -> Result<TokenDefinition> {
        self.get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("token definition", index))
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store.has(&keys::key(TOKEN_DEF_VALUE, &[index])).await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<TokenDefinition>> {
        Ok(store.records_with_prefix(TOKEN_DEF_VALUE.as_bytes()).await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<TokenDefinition>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    pub async fn by_subject(
        &self,
        store: &dyn KvStore,
        subject_id: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        self.by_index(store, TOKEN_DEF_BY_SUBJECT, subject_id, request).await
    }

    pub async fn by_course(
        &self,
        store: &dyn KvStore,
        course_id: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        self.by_index(store, TOKEN_DEF_BY_COURSE, course_id, request).await
    }

    pub async fn by_institution(
        &self,
        store: &dyn KvStore,
        institution_id: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        self.by_index(store, TOKEN_DEF_BY_INSTITUTION, institution_id, request)
            .await
    }

    async fn by_index(
        &self,
        store: &dyn KvStore,
        prefix: &str,
        parent: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        let indexes = store
            .suffixes_with_prefix(&keys::scan(prefix, &[parent]))
            .await?;
        let mut definitions = Vec::with_capacity(indexes.len());
        for index in indexes {
            if let Some(definition) = self.get(store, &index).await? {
                definitions.push(definition);
            }
        }
        Ok(Page::from_all(definitions, request))
    }
}

/// Marker keys maintained for a definition.
fn index_keys(definition: &TokenDefinition) -> [Vec<u8>; 3] {
    let index = definition.index.as_str();
    [
        keys::key(TOKEN_DEF_BY_SUBJECT, &[&definition.subject_id, index]),
        keys::key(TOKEN_DEF_BY_COURSE, &[&definition.course_id, index]),
        keys::key(TOKEN_DEF_BY_INSTITUTION, &[&definition.institution_id, index]),
    ]
}

#[async_trait]
impl TokenDefinitionKeeper for TokenDefinitionRegistry {
    async fn token_definition(
        &self,
        store: &dyn KvStore,
        index: &str,
    ) -> Result<Option<TokenDefinition>> {
        self.get(store, index).await
    }
}
