//! Degree workflow: request, validate, issue, cancel.
//!
//! ```text
//! requested ──► validating ──► validated ─────────┐
//!                          └─► validation_failed  ├─► approved (issued)
//!                                                  ├─► rejected
//!                                                  └─► cancelled
//! ```
//!
//! Every handler performs its contract call before the first local write,
//! so a failed or unparseable response leaves no trace. Unless
//! `strict_workflow` is set, ordering is the contract's responsibility:
//! issuing without prior validation is accepted.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::{parse_gpa, require_non_empty, require_positive};
use academic_ledger_core::{
    Address, Degree, DegreeRequest, DegreeRequestStatus, DegreeStatus, Event,
};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_registry::{CurriculumKeeper, Page, PageRequest};
use academic_ledger_store::{Context, KvStore, StoreExt};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DegreeError, Result};
use crate::executor::ContractExecutor;
use crate::messages::{
    CancelDegreeRequest, ContractInfo, ContractMsg, ContractUpdated, DegreeIssued,
    DegreeRequested, IssueDegree, IssueDegreeResponse, RequestDegree, RequestDegreeResponse,
    UpdateDegreeContract, ValidateDegreeRequirements, ValidateDegreeResponse, ValidationStatus,
};

pub const DEGREE_REQUEST_VALUE: &str = "DegreeRequest/value/";
pub const DEGREE_REQUEST_BY_STATUS: &str = "DegreeRequest/status/";
pub const DEGREE_VALUE: &str = "Degree/value/";
pub const DEGREE_BY_STUDENT: &str = "Degree/student/";
pub const DEGREE_BY_INSTITUTION: &str = "Degree/institution/";
pub const DEGREE_CONTRACT: &str = "Degree/contract/";

pub const DEFAULT_CONTRACT_ADDRESS: &str = "cosmos1degreecontract123456789abcdef";

/// Workflow settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Require `validated` before issuing and refuse transitions out of
    /// terminal statuses.
    pub strict_workflow: bool,

    /// Human-readable prefix of account addresses (`cosmos`).
    pub address_prefix: String,

    /// Contract used until governance stores another address.
    pub contract: ContractInfo,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            strict_workflow: false,
            address_prefix: "cosmos".into(),
            contract: ContractInfo {
                address: DEFAULT_CONTRACT_ADDRESS.into(),
                version: "1.0.0".into(),
                gas_limit: 500_000,
            },
        }
    }
}

pub struct DegreeWorkflow {
    config: WorkflowConfig,
    policy: Arc<AuthorizationPolicy>,
    executor: Arc<dyn ContractExecutor>,
    curricula: Arc<dyn CurriculumKeeper>,
}

impl DegreeWorkflow {
    pub fn new(
        config: WorkflowConfig,
        policy: Arc<AuthorizationPolicy>,
        executor: Arc<dyn ContractExecutor>,
        curricula: Arc<dyn CurriculumKeeper>,
    ) -> Self {
        Self {
            config,
            policy,
            executor,
            curricula,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────

    pub async fn request_degree(&self, ctx: &mut Context<'_>, msg: RequestDegree) -> Result<DegreeRequested> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("student_id", &msg.student_id)?;
        require_non_empty("institution_id", &msg.institution_id)?;
        require_non_empty("curriculum_id", &msg.curriculum_id)?;
        require_non_empty("expected_graduation_date", &msg.expected_graduation_date)?;

        let store = ctx.store();
        let contract = self.resolve_contract(store, msg.contract_address.as_deref()).await?;
        let response: RequestDegreeResponse = self
            .call(
                &contract,
                &msg.creator,
                &ContractMsg::RequestDegree {
                    student_id: msg.student_id.clone(),
                    institution_id: msg.institution_id.clone(),
                    curriculum_id: msg.curriculum_id.clone(),
                    expected_graduation_date: msg.expected_graduation_date.clone(),
                    creator: msg.creator.to_string(),
                },
            )
            .await?;

        let id = response.degree_request_id;
        require_non_empty("degree_request_id", &id)?;
        if store.has(&request_key(&id)).await? {
            return Err(DegreeError::Conflict(format!("degree request {id} already exists")));
        }

        let request = DegreeRequest {
            id: id.clone(),
            student_id: msg.student_id,
            institution_id: msg.institution_id,
            curriculum_id: msg.curriculum_id,
            expected_graduation_date: msg.expected_graduation_date,
            request_date: ctx.timestamp(),
            status: response.status,
            validation_score: None,
            validation_details: String::new(),
            missing_requirements: Vec::new(),
            creator: msg.creator,
        };
        self.write_request(store, &request, None).await?;

        tracing::info!(id = %id, student = %request.student_id, status = %request.status, "degree requested");
        ctx.emit(
            Event::new(kinds::DEGREE_REQUESTED)
                .attr("degree_request_id", &id)
                .attr("student_id", &request.student_id)
                .attr("degree_status", request.status)
                .attr("contract_address", &contract),
        );
        Ok(DegreeRequested {
            degree_request_id: id,
            status: request.status,
        })
    }

    pub async fn validate_requirements(
        &self,
        ctx: &mut Context<'_>,
        msg: ValidateDegreeRequirements,
    ) -> Result<ValidationStatus> {
        require_non_empty("degree_request_id", &msg.degree_request_id)?;

        let store = ctx.store();
        let mut request = self.require_request(store, &msg.degree_request_id).await?;
        self.ensure_open(&request, "validate")?;

        let contract = self.resolve_contract(store, msg.contract_address.as_deref()).await?;
        let response: ValidateDegreeResponse = self
            .call(
                &contract,
                &msg.creator,
                &ContractMsg::ValidateDegreeRequirements {
                    degree_request_id: request.id.clone(),
                    validation_parameters: msg.validation_parameters,
                    creator: msg.creator.to_string(),
                },
            )
            .await?;

        let previous = request.status;
        request.status = if response.validation_passed {
            DegreeRequestStatus::Validated
        } else {
            DegreeRequestStatus::ValidationFailed
        };
        request.validation_score = Some(response.validation_score.clone());
        request.validation_details = response.validation_details;
        request.missing_requirements = response.missing_requirements;
        self.write_request(store, &request, Some(previous)).await?;

        tracing::info!(
            id = %request.id,
            passed = response.validation_passed,
            score = %response.validation_score,
            "degree requirements validated"
        );
        ctx.emit(
            Event::new(kinds::DEGREE_VALIDATED)
                .attr("degree_request_id", &request.id)
                .attr("validation_passed", response.validation_passed)
                .attr("validation_score", &response.validation_score)
                .attr("contract_address", &contract),
        );
        Ok(validation_status(request))
    }

    pub async fn issue_degree(&self, ctx: &mut Context<'_>, msg: IssueDegree) -> Result<DegreeIssued> {
        require_non_empty("degree_request_id", &msg.degree_request_id)?;
        parse_gpa("final_gpa", &msg.final_gpa)?;
        require_positive("total_credits", msg.total_credits)?;

        let store = ctx.store();
        let mut request = self.require_request(store, &msg.degree_request_id).await?;
        self.ensure_open(&request, "issue")?;
        if self.config.strict_workflow && request.status != DegreeRequestStatus::Validated {
            return Err(DegreeError::InvalidTransition {
                id: request.id,
                action: "issue",
                status: request.status,
            });
        }
        let course_id = match self.curricula.curriculum(store, &request.curriculum_id).await? {
            Some(tree) => tree.course_id,
            None => {
                tracing::warn!(curriculum = %request.curriculum_id, "degree curriculum not found on ledger");
                String::new()
            }
        };

        let contract = self.resolve_contract(store, msg.contract_address.as_deref()).await?;
        let response: IssueDegreeResponse = self
            .call(
                &contract,
                &msg.creator,
                &ContractMsg::IssueDegree {
                    degree_request_id: request.id.clone(),
                    final_gpa: msg.final_gpa.clone(),
                    total_credits: msg.total_credits,
                    signatures: msg.signatures.clone(),
                    creator: msg.creator.to_string(),
                },
            )
            .await?;

        require_non_empty("degree_id", &response.degree_id)?;
        if store.has(&degree_key(&response.degree_id)).await? {
            return Err(DegreeError::Conflict(format!(
                "degree {} already issued",
                response.degree_id
            )));
        }

        let issue_date = if response.issue_date.is_empty() {
            ctx.timestamp()
        } else {
            response.issue_date
        };
        let degree = Degree {
            index: response.degree_id.clone(),
            degree_id: response.degree_id.clone(),
            request_id: request.id.clone(),
            student: request.student_id.clone(),
            institution: request.institution_id.clone(),
            course_id,
            issue_date: issue_date.clone(),
            status: DegreeStatus::Issued,
            nft_token_id: response.nft_token_id.clone(),
            ipfs_link: response.ipfs_hash.clone(),
            final_grade: msg.final_gpa,
            total_credits: msg.total_credits,
            signatures: msg.signatures,
        };
        store.set_record(&degree_key(&degree.index), &degree).await?;
        store
            .set_marker(&marker(DEGREE_BY_STUDENT, &degree.student, &degree.index))
            .await?;
        store
            .set_marker(&marker(DEGREE_BY_INSTITUTION, &degree.institution, &degree.index))
            .await?;

        let previous = request.status;
        request.status = DegreeRequestStatus::Approved;
        self.write_request(store, &request, Some(previous)).await?;

        tracing::info!(degree = %degree.degree_id, request = %request.id, "degree issued");
        ctx.emit(
            Event::new(kinds::DEGREE_ISSUED)
                .attr("degree_id", &degree.degree_id)
                .attr("nft_token_id", &degree.nft_token_id)
                .attr("ipfs_hash", &degree.ipfs_link)
                .attr("contract_address", &contract),
        );
        Ok(DegreeIssued {
            degree_id: degree.degree_id,
            nft_token_id: degree.nft_token_id,
            ipfs_hash: degree.ipfs_link,
            issue_date,
        })
    }

    pub async fn cancel_request(&self, ctx: &mut Context<'_>, msg: CancelDegreeRequest) -> Result<()> {
        require_non_empty("degree_request_id", &msg.degree_request_id)?;

        let store = ctx.store();
        let mut request = self.require_request(store, &msg.degree_request_id).await?;
        self.ensure_open(&request, "cancel")?;

        let contract = self.resolve_contract(store, msg.contract_address.as_deref()).await?;
        self.execute(
            &contract,
            &msg.creator,
            &ContractMsg::CancelDegreeRequest {
                degree_request_id: request.id.clone(),
                cancellation_reason: msg.cancellation_reason.clone(),
                creator: msg.creator.to_string(),
            },
        )
        .await?;

        let previous = request.status;
        request.status = DegreeRequestStatus::Cancelled;
        self.write_request(store, &request, Some(previous)).await?;

        tracing::info!(id = %request.id, "degree request cancelled");
        ctx.emit(
            Event::new(kinds::DEGREE_REJECTED)
                .attr("degree_request_id", &request.id)
                .attr("degree_status", request.status)
                .attr("rejection_reason", &msg.cancellation_reason),
        );
        Ok(())
    }

    /// Governance-only change of the stored contract address.
    pub async fn update_contract(
        &self,
        ctx: &mut Context<'_>,
        msg: UpdateDegreeContract,
    ) -> Result<ContractUpdated> {
        self.policy.require_update_contract(&msg.authority)?;
        let new = Address::parse(&msg.new_contract_address, &self.config.address_prefix)?;

        let store = ctx.store();
        let old = self.contract_address(store).await?;
        store.set(DEGREE_CONTRACT.as_bytes(), new.as_str().as_bytes()).await?;

        tracing::info!(old = %old, new = %new, "degree contract updated");
        ctx.emit(
            Event::new(kinds::DEGREE_CONTRACT_UPDATED)
                .attr("contract_address", &new)
                .attr("old_contract_address", &old),
        );
        Ok(ContractUpdated {
            old_contract_address: old,
            new_contract_address: new.to_string(),
            updated_at: ctx.timestamp(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub async fn get_request(&self, store: &dyn KvStore, id: &str) -> Result<Option<DegreeRequest>> {
        Ok(store.get_record(&request_key(id)).await?)
    }

    pub async fn get_degree(&self, store: &dyn KvStore, index: &str) -> Result<Option<Degree>> {
        Ok(store.get_record(&degree_key(index)).await?)
    }

    pub async fn degrees_by_student(
        &self,
        store: &dyn KvStore,
        student: &str,
        request: PageRequest,
    ) -> Result<Page<Degree>> {
        self.degrees_by(store, DEGREE_BY_STUDENT, student, request).await
    }

    pub async fn degrees_by_institution(
        &self,
        store: &dyn KvStore,
        institution: &str,
        request: PageRequest,
    ) -> Result<Page<Degree>> {
        self.degrees_by(store, DEGREE_BY_INSTITUTION, institution, request)
            .await
    }

    pub async fn requests_by_status(
        &self,
        store: &dyn KvStore,
        status: DegreeRequestStatus,
        request: PageRequest,
    ) -> Result<Page<DegreeRequest>> {
        let prefix = format!("{DEGREE_REQUEST_BY_STATUS}{status}/");
        let ids = store.suffixes_with_prefix(prefix.as_bytes()).await?;
        let mut requests = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(found) = self.get_request(store, &id).await? {
                requests.push(found);
            }
        }
        Ok(Page::from_all(requests, request))
    }

    pub async fn validation_status(&self, store: &dyn KvStore, id: &str) -> Result<ValidationStatus> {
        Ok(validation_status(self.require_request(store, id).await?))
    }

    /// Stored contract address, or the configured default.
    pub async fn contract_address(&self, store: &dyn KvStore) -> Result<String> {
        Ok(match store.get(DEGREE_CONTRACT.as_bytes()).await? {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => self.config.contract.address.clone(),
        })
    }

    pub async fn contract_info(&self, store: &dyn KvStore) -> Result<ContractInfo> {
        Ok(ContractInfo {
            address: self.contract_address(store).await?,
            ..self.config.contract.clone()
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    async fn require_request(&self, store: &dyn KvStore, id: &str) -> Result<DegreeRequest> {
        self.get_request(store, id)
            .await?
            .ok_or_else(|| DegreeError::not_found("degree request", id))
    }

    fn ensure_open(&self, request: &DegreeRequest, action: &'static str) -> Result<()> {
        if self.config.strict_workflow && request.status.is_terminal() {
            return Err(DegreeError::InvalidTransition {
                id: request.id.clone(),
                action,
                status: request.status,
            });
        }
        Ok(())
    }

    async fn resolve_contract(&self, store: &dyn KvStore, override_address: Option<&str>) -> Result<String> {
        match override_address.filter(|a| !a.is_empty()) {
            Some(address) => Ok(address.to_string()),
            None => self.contract_address(store).await,
        }
    }

    async fn execute(&self, contract: &str, caller: &Address, msg: &ContractMsg) -> Result<Bytes> {
        let payload = serde_json::to_vec(msg).map_err(|source| DegreeError::Encode {
            message: msg.name(),
            source,
        })?;
        tracing::debug!(contract, message = msg.name(), "executing degree contract");

        self.executor
            .execute(contract, caller, Bytes::from(payload), Vec::new())
            .await
            .map_err(|e| {
                tracing::warn!(contract, message = msg.name(), error = %e, "degree contract call failed");
                DegreeError::Contract(e)
            })
    }

    async fn call<R: DeserializeOwned>(&self, contract: &str, caller: &Address, msg: &ContractMsg) -> Result<R> {
        let response = self.execute(contract, caller, msg).await?;
        serde_json::from_slice(&response).map_err(|source| DegreeError::Decode {
            message: msg.name(),
            source,
        })
    }

    /// Write the request and move its status marker.
    async fn write_request(
        &self,
        store: &dyn KvStore,
        request: &DegreeRequest,
        previous: Option<DegreeRequestStatus>,
    ) -> Result<()> {
        if let Some(previous) = previous.filter(|p| *p != request.status) {
            store
                .delete(&marker(DEGREE_REQUEST_BY_STATUS, previous.as_str(), &request.id))
                .await?;
        }
        store.set_record(&request_key(&request.id), request).await?;
        store
            .set_marker(&marker(DEGREE_REQUEST_BY_STATUS, request.status.as_str(), &request.id))
            .await?;
        Ok(())
    }

    async fn degrees_by(
        &self,
        store: &dyn KvStore,
        prefix: &str,
        parent: &str,
        request: PageRequest,
    ) -> Result<Page<Degree>> {
        let scan = format!("{prefix}{parent}/");
        let indexes = store.suffixes_with_prefix(scan.as_bytes()).await?;
        let mut degrees = Vec::with_capacity(indexes.len());
        for index in indexes {
            if let Some(degree) = self.get_degree(store, &index).await? {
                degrees.push(degree);
            }
        }
        Ok(Page::from_all(degrees, request))
    }
}

fn request_key(id: &str) -> Vec<u8> {
    format!("{DEGREE_REQUEST_VALUE}{id}").into_bytes()
}

fn degree_key(index: &str) -> Vec<u8> {
    format!("{DEGREE_VALUE}{index}").into_bytes()
}

fn marker(prefix: &str, parent: &str, id: &str) -> Vec<u8> {
    format!("{prefix}{parent}/{id}").into_bytes()
}

fn validation_status(request: DegreeRequest) -> ValidationStatus {
    ValidationStatus {
        degree_request_id: request.id,
        status: request.status,
        validation_score: request.validation_score,
        validation_details: request.validation_details,
        missing_requirements: request.missing_requirements,
    }
}
