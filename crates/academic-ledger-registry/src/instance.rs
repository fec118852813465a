//! Subject token instances: minting, verification and lookup.
//!
//! Each instance is indexed by student and by token definition through
//! marker keys. Validity is never cached: [`TokenInstanceRegistry::validate`]
//! re-checks the definition, the institution and the student every time.

use std::collections::BTreeSet;
use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::{check_date, parse_grade, require_non_empty};
use academic_ledger_core::{Address, Event, SubjectTokenInstance};
use academic_ledger_store::{Context, KvStore, StoreExt};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{
    self, TOKEN_INSTANCES, TOKEN_INSTANCE_BY_STUDENT, TOKEN_INSTANCE_BY_TOKEN_DEF,
    TOKEN_INSTANCE_VALUE,
};
use crate::pagination::{Page, PageRequest};
use crate::traits::{InstitutionKeeper, StudentKeeper, TokenDefinitionKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSubjectToken {
    pub creator: Address,
    pub token_def_id: String,
    pub student: String,
    pub completion_date: String,
    pub grade: String,
    pub issuer_institution: String,
    pub semester: String,
    pub professor_signature: String,
}

/// Outcome of verifying a token instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVerification {
    pub exists: bool,
    pub is_valid: bool,
    pub instance: Option<SubjectTokenInstance>,
}

pub struct TokenInstanceRegistry {
    address_prefix: String,
    institutions: Arc<dyn InstitutionKeeper>,
    students: Arc<dyn StudentKeeper>,
    token_defs: Arc<dyn TokenDefinitionKeeper>,
}

impl TokenInstanceRegistry {
    pub fn new(
        address_prefix: impl Into<String>,
        institutions: Arc<dyn InstitutionKeeper>,
        students: Arc<dyn StudentKeeper>,
        token_defs: Arc<dyn TokenDefinitionKeeper>,
    ) -> Self {
        Self {
            address_prefix: address_prefix.into(),
            institutions,
            students,
            token_defs,
        }
    }

    pub async fn mint(&self, ctx: &mut Context<'_>, msg: MintSubjectToken) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("token_def_id", &msg.token_def_id)?;
        require_non_empty("student", &msg.student)?;
        require_non_empty("completion_date", &msg.completion_date)?;
        require_non_empty("grade", &msg.grade)?;
        require_non_empty("issuer_institution", &msg.issuer_institution)?;
        require_non_empty("semester", &msg.semester)?;
        parse_grade(&msg.grade)?;
        check_date("completion_date", &msg.completion_date)?;
        let student = Address::parse(&msg.student, &self.address_prefix)?;

        let store = ctx.store();
        let definition = self
            .token_defs
            .token_definition(store, &msg.token_def_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("token definition", &msg.token_def_id))?;
        if self
            .students
            .student_by_address(store, &student)
            .await?
            .is_none()
        {
            return Err(RegistryError::not_found("student", student.as_str()));
        }
        if self
            .institutions
            .institution(store, &msg.issuer_institution)
            .await?
            .is_none()
        {
            return Err(RegistryError::not_found("institution", &msg.issuer_institution));
        }

        let minted = store
            .suffixes_with_prefix(&keys::scan(TOKEN_INSTANCE_BY_TOKEN_DEF, &[&definition.index]))
            .await?;
        let held = store
            .suffixes_with_prefix(&keys::scan(TOKEN_INSTANCE_BY_STUDENT, &[student.as_str()]))
            .await?;
        let minted_set: BTreeSet<&String> = minted.iter().collect();
        if held.iter().any(|index| minted_set.contains(index)) {
            return Err(RegistryError::Conflict(format!(
                "student {} already holds a token for {}",
                student, definition.index
            )));
        }
        if definition.max_supply > 0 && minted.len() as u64 >= definition.max_supply {
            return Err(RegistryError::Conflict(format!(
                "max supply of {} reached for {}",
                definition.max_supply, definition.index
            )));
        }

        let index = TOKEN_INSTANCES.next_index(store).await?;
        let instance = SubjectTokenInstance {
            index: index.clone(),
            token_def_id: definition.index,
            student,
            completion_date: msg.completion_date,
            grade: msg.grade,
            issuer_institution: msg.issuer_institution,
            semester: msg.semester,
            professor_signature: msg.professor_signature,
            minted_date: ctx.timestamp(),
            creator: msg.creator,
        };
        store
            .set_record(&keys::key(TOKEN_INSTANCE_VALUE, &[&index]), &instance)
            .await?;
        for marker in index_keys(&instance) {
            store.set_marker(&marker).await?;
        }

        tracing::info!(index = %index, student = %instance.student, token_def = %instance.token_def_id, "subject token minted");
        ctx.emit(
            Event::new(kinds::SUBJECT_TOKEN_MINTED)
                .attr("token_instance_id", &index)
                .attr("token_def_id", &instance.token_def_id)
                .attr("student", &instance.student)
                .attr("grade", &instance.grade)
                .attr("completion_date", &instance.completion_date)
                .attr("semester", &instance.semester)
                .attr("issuer_institution", &instance.issuer_institution)
                .attr("minted_date", &instance.minted_date)
                .attr("creator", &instance.creator),
        );
        Ok(index)
    }

    /// Delete an instance and both of its markers.
    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let instance = self.require(store, index).await?;
        for marker in index_keys(&instance) {
            store.delete(&marker).await?;
        }
        store.delete(&keys::key(TOKEN_INSTANCE_VALUE, &[index])).await?;
        tracing::info!(index, "token instance removed");
        Ok(())
    }

    /// Re-check that the definition still exists, the issuing institution
    /// is authorized and the student is still eligible.
    pub async fn validate(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        let instance = self.require(store, index).await?;
        self.still_valid(store, &instance).await
    }

    /// Like [`validate`](Self::validate), but a missing instance is reported
    /// as `exists: false` and the stored grade and date are re-parsed.
    pub async fn verify(&self, store: &dyn KvStore, index: &str) -> Result<TokenVerification> {
        let Some(instance) = self.get(store, index).await? else {
            return Ok(TokenVerification {
                exists: false,
                is_valid: false,
                instance: None,
            });
        };

        let well_formed = parse_grade(&instance.grade).is_ok()
            && check_date("completion_date", &instance.completion_date).is_ok();
        let is_valid = well_formed && self.still_valid(store, &instance).await?;

        Ok(TokenVerification {
            exists: true,
            is_valid,
            instance: Some(instance),
        })
    }

    /// [`verify`](Self::verify) as a message, recording the outcome as an event.
    pub async fn verify_message(&self, ctx: &mut Context<'_>, index: &str) -> Result<TokenVerification> {
        let verification = self.verify(ctx.store(), index).await?;
        ctx.emit(
            Event::new(kinds::TOKEN_INSTANCE_VERIFIED)
                .attr("token_instance_id", index)
                .attr("is_valid", verification.is_valid),
        );
        Ok(verification)
    }

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<SubjectTokenInstance>> {
        Ok(store
            .get_record(&keys::key(TOKEN_INSTANCE_VALUE, &[index]))
            .await?)
    }

    pub async fn require(&self, store: &dyn KvStore, index: &str) -> Result<SubjectTokenInstance> {
        self.get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("token instance", index))
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store
            .has(&keys::key(TOKEN_INSTANCE_VALUE, &[index]))
            .await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<SubjectTokenInstance>> {
        Ok(store
            .records_with_prefix(TOKEN_INSTANCE_VALUE.as_bytes())
            .await?)
    }

    pub async fn by_student(
        &self,
        store: &dyn KvStore,
        student: &Address,
        request: PageRequest,
    ) -> Result<Page<SubjectTokenInstance>> {
        self.by_index(store, TOKEN_INSTANCE_BY_STUDENT, student.as_str(), request)
            .await
    }

    pub async fn by_token_definition(
        &self,
        store: &dyn KvStore,
        token_def_id: &str,
        request: PageRequest,
    ) -> Result<Page<SubjectTokenInstance>> {
        self.by_index(store, TOKEN_INSTANCE_BY_TOKEN_DEF, token_def_id, request)
            .await
    }

    async fn by_index(
        &self,
        store: &dyn KvStore,
        prefix: &str,
        parent: &str,
        request: PageRequest,
    ) -> Result<Page<SubjectTokenInstance>> {
        let indexes = store
            .suffixes_with_prefix(&keys::scan(prefix, &[parent]))
            .await?;
        let mut instances = Vec::with_capacity(indexes.len());
        for index in indexes {
            match self.get(store, &index).await? {
                Some(instance) => instances.push(instance),
                None => tracing::warn!(index = %index, parent, "dangling token instance marker"),
            }
        }
        Ok(Page::from_all(instances, request))
    }

    async fn still_valid(&self, store: &dyn KvStore, instance: &SubjectTokenInstance) -> Result<bool> {
        if self
            .token_defs
            .token_definition(store, &instance.token_def_id)
            .await?
            .is_none()
        {
            tracing::debug!(index = %instance.index, "token definition no longer exists");
            return Ok(false);
        }

        let authorized = self
            .institutions
            .institution(store, &instance.issuer_institution)
            .await?
            .is_some_and(|i| i.is_authorized());
        if !authorized {
            tracing::debug!(index = %instance.index, "issuing institution not authorized");
            return Ok(false);
        }

        self.students
            .is_eligible(store, &instance.student, &instance.issuer_institution)
            .await
    }
}

fn index_keys(instance: &SubjectTokenInstance) -> [Vec<u8>; 2] {
    let index = instance.index.as_str();
    [
        keys::key(TOKEN_INSTANCE_BY_STUDENT, &[instance.student.as_str(), index]),
        keys::key(TOKEN_INSTANCE_BY_TOKEN_DEF, &[&instance.token_def_id, index]),
    ]
}
