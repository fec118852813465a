//! Authorization policy.
//!
//! Every mutation of an existing entity is checked against the same chain:
//! the governance authority may do anything; otherwise the actor must be a
//! creator somewhere in the entity's ownership chain. Creating content under
//! an institution additionally requires the institution to be authorized.

use academic_ledger_core::{Address, Institution};

use crate::action::{Action, OwnershipChain};
use crate::error::{PermsError, Result};

/// Evaluates the authorization chain for one ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    /// Governance authority address.
    authority: Address,

    /// When true, only the authority may authorize an institution. When
    /// false the institution's creator may authorize it too.
    require_governance_authorization: bool,
}

impl AuthorizationPolicy {
    pub fn new(authority: Address, require_governance_authorization: bool) -> Self {
        Self {
            authority,
            require_governance_authorization,
        }
    }

    pub fn authority(&self) -> &Address {
        &self.authority
    }

    pub fn requires_governance_authorization(&self) -> bool {
        self.require_governance_authorization
    }

    pub fn is_authority(&self, actor: &Address) -> bool {
        !actor.is_empty() && *actor == self.authority
    }

    // ─────────────────────────────────────────────────────────────────────
    // Predicates
    // ─────────────────────────────────────────────────────────────────────

    /// Authority, or any creator in the chain.
    pub fn can_mutate(&self, actor: &Address, chain: &OwnershipChain<'_>) -> bool {
        self.is_authority(actor) || chain.contains(actor)
    }

    pub fn can_update_institution(&self, actor: &Address, institution: &Institution) -> bool {
        self.can_mutate(actor, &OwnershipChain::of(&institution.creator))
    }

    pub fn can_authorize_institution(&self, actor: &Address, institution: &Institution) -> bool {
        if self.require_governance_authorization {
            self.is_authority(actor)
        } else {
            self.can_update_institution(actor, institution)
        }
    }

    /// Courses may only be created under an authorized institution, by its
    /// creator or the authority.
    pub fn can_create_course(&self, actor: &Address, institution: &Institution) -> bool {
        institution.is_authorized.is_authorized()
            && self.can_mutate(actor, &OwnershipChain::of(&institution.creator))
    }

    /// Updating a course needs the same rights as creating one under its
    /// institution.
    pub fn can_update_course(&self, actor: &Address, institution: &Institution) -> bool {
        self.is_authority(actor) || self.can_create_course(actor, institution)
    }

    pub fn can_manage_curriculum(&self, actor: &Address, institution: &Institution) -> bool {
        self.can_update_course(actor, institution)
    }

    pub fn can_update_token_definition(&self, actor: &Address, definition_creator: &Address) -> bool {
        self.can_mutate(actor, &OwnershipChain::of(definition_creator))
    }

    pub fn can_update_contract(&self, actor: &Address) -> bool {
        self.is_authority(actor)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Enforcement
    // ─────────────────────────────────────────────────────────────────────

    /// Turn a predicate result into a `PermissionDenied` error.
    pub fn ensure(&self, allowed: bool, actor: &Address, action: Action, target: &str) -> Result<()> {
        if allowed {
            return Ok(());
        }
        tracing::warn!(actor = %actor, %action, target, "authorization chain rejected actor");
        Err(PermsError::PermissionDenied {
            actor: actor.to_string(),
            action,
            target: target.to_string(),
        })
    }

    pub fn require_authorized(&self, institution: &Institution) -> Result<()> {
        if institution.is_authorized.is_authorized() {
            Ok(())
        } else {
            Err(PermsError::InstitutionNotAuthorized(institution.index.clone()))
        }
    }

    pub fn require_update_institution(&self, actor: &Address, institution: &Institution) -> Result<()> {
        self.ensure(
            self.can_update_institution(actor, institution),
            actor,
            Action::UpdateInstitution,
            &institution.index,
        )
    }

    pub fn require_authorize_institution(
        &self,
        actor: &Address,
        institution: &Institution,
    ) -> Result<()> {
        self.ensure(
            self.can_authorize_institution(actor, institution),
            actor,
            Action::AuthorizeInstitution,
            &institution.index,
        )
    }

    /// Checks authorization status first so the caller sees the more
    /// specific error.
    pub fn require_create_course(&self, actor: &Address, institution: &Institution) -> Result<()> {
        self.require_authorized(institution)?;
        self.ensure(
            self.can_create_course(actor, institution),
            actor,
            Action::CreateCourse,
            &institution.index,
        )
    }

    pub fn require_update_course(
        &self,
        actor: &Address,
        course_index: &str,
        institution: &Institution,
    ) -> Result<()> {
        self.ensure(
            self.can_update_course(actor, institution),
            actor,
            Action::UpdateCourse,
            course_index,
        )
    }

    pub fn require_manage_curriculum(
        &self,
        actor: &Address,
        course_index: &str,
        institution: &Institution,
    ) -> Result<()> {
        self.ensure(
            self.can_manage_curriculum(actor, institution),
            actor,
            Action::ManageCurriculum,
            course_index,
        )
    }

    pub fn require_update_token_definition(
        &self,
        actor: &Address,
        index: &str,
        definition_creator: &Address,
    ) -> Result<()> {
        self.ensure(
            self.can_update_token_definition(actor, definition_creator),
            actor,
            Action::UpdateTokenDefinition,
            index,
        )
    }

    pub fn require_update_contract(&self, actor: &Address) -> Result<()> {
        self.ensure(
            self.can_update_contract(actor),
            actor,
            Action::UpdateDegreeContract,
            "contract",
        )
    }
}
