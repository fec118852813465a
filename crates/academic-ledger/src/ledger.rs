//! The Ledger: message dispatch and queries over one store.
//!
//! Every message runs alone, against a [`Transaction`] over the store.
//! A handler that fails leaves nothing behind: its buffered writes and
//! events are dropped together.

use std::sync::Arc;

use academic_ledger_core::{
    Address, Clock, Course, CurriculumTree, Degree, DegreeRequest, DegreeRequestStatus, Event,
    Institution, Student, Subject, SubjectTokenInstance, SystemClock, TokenDefinition,
};
use academic_ledger_degree::{ContractExecutor, ContractInfo, DegreeWorkflow, ValidationStatus};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_registry::{
    CourseRegistry, CurriculumRegistry, InstitutionRegistry, Page, PageRequest, StudentRegistry,
    SubjectRegistry, TokenDefinitionRegistry, TokenInstanceRegistry, TokenVerification,
};
use academic_ledger_store::{BlobStore, Context, KvStore, MemoryBlobStore, Transaction};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::LedgerConfig;
use crate::error::Result;
use crate::msg::{Msg, MsgResponse};
use crate::sink::{EventSink, TracingSink};

/// Outcome of a committed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub response: MsgResponse,
    /// Events emitted by the handler, already handed to the sink.
    pub events: Vec<Event>,
    /// Number of keys written by the commit.
    pub keys_written: usize,
}

/// Record families that can be removed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Institution,
    Course,
    Subject,
    Student,
    Curriculum,
    TokenDefinition,
    TokenInstance,
}

/// Wiring options for [`Ledger`]. Defaults: system clock, in-memory blob
/// store, tracing event sink.
pub struct LedgerBuilder<S: KvStore> {
    store: S,
    executor: Arc<dyn ContractExecutor>,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    blobs: Arc<dyn BlobStore>,
    sink: Arc<dyn EventSink>,
}

impl<S: KvStore> LedgerBuilder<S> {
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<Ledger<S>> {
        self.config.validate()?;
        let config = self.config;

        let policy = Arc::new(AuthorizationPolicy::new(
            config.authority(),
            config.require_governance_authorization,
        ));
        let institutions = Arc::new(InstitutionRegistry::new(policy.clone()));
        let courses = Arc::new(CourseRegistry::new(policy.clone(), institutions.clone()));
        let subjects = Arc::new(SubjectRegistry::new(
            institutions.clone(),
            courses.clone(),
            self.blobs,
        ));
        let students = Arc::new(StudentRegistry::new(
            config.address_prefix.clone(),
            institutions.clone(),
        ));
        let curricula = Arc::new(CurriculumRegistry::new(
            policy.clone(),
            institutions.clone(),
            courses.clone(),
            subjects.clone(),
        ));
        let token_defs = Arc::new(TokenDefinitionRegistry::new(policy.clone(), subjects.clone()));
        let instances = TokenInstanceRegistry::new(
            config.address_prefix.clone(),
            institutions.clone(),
            students.clone(),
            token_defs.clone(),
        );
        let degrees = DegreeWorkflow::new(config.workflow(), policy, self.executor, curricula.clone());

        tracing::info!(
            authority = %config.authority,
            strict_workflow = config.strict_workflow,
            require_governance_authorization = config.require_governance_authorization,
            "ledger ready"
        );

        Ok(Ledger {
            store: Arc::new(self.store),
            config,
            clock: self.clock,
            sink: self.sink,
            lock: Mutex::new(()),
            institutions,
            courses,
            subjects,
            students,
            curricula,
            token_defs,
            instances,
            degrees,
        })
    }
}

/// The academic ledger.
///
/// Owns the registries and the degree workflow and runs messages against
/// a single store, one at a time.
pub struct Ledger<S: KvStore> {
    store: Arc<S>,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    /// Admits one message at a time.
    lock: Mutex<()>,
    institutions: Arc<InstitutionRegistry>,
    courses: Arc<CourseRegistry>,
    subjects: Arc<SubjectRegistry>,
    students: Arc<StudentRegistry>,
    curricula: Arc<CurriculumRegistry>,
    token_defs: Arc<TokenDefinitionRegistry>,
    instances: TokenInstanceRegistry,
    degrees: DegreeWorkflow,
}

impl<S: KvStore> Ledger<S> {
    /// Start wiring a ledger over `store`, delegating degrees to `executor`.
    pub fn builder(store: S, executor: Arc<dyn ContractExecutor>) -> LedgerBuilder<S> {
        LedgerBuilder {
            store,
            executor,
            config: LedgerConfig::default(),
            clock: Arc::new(SystemClock),
            blobs: Arc::new(MemoryBlobStore::new()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Ledger with default wiring.
    pub fn new(store: S, executor: Arc<dyn ContractExecutor>, config: LedgerConfig) -> Result<Self> {
        Self::builder(store, executor).config(config).build()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn kv(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// A zero limit falls back to the configured page size.
    fn page(&self, request: PageRequest) -> PageRequest {
        match request.limit {
            0 => PageRequest::new(request.offset, self.config.default_page_limit),
            _ => request,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one message to completion.
    ///
    /// On success the writes are committed atomically and the events are
    /// published. On failure nothing is written or published.
    pub async fn execute(&self, msg: Msg) -> Result<Executed> {
        let _guard = self.lock.lock().await;
        let name = msg.name();
        tracing::debug!(msg = name, signer = %msg.signer(), "executing message");

        let tx = Transaction::new(self.kv());
        let mut ctx = Context::new(&tx, self.clock.now());
        let outcome = self.dispatch(&mut ctx, msg).await;
        let events = ctx.into_events();

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(msg = name, kind = %e.kind(), error = %e, "message rejected");
                return Err(e);
            }
        };

        let keys_written = tx.commit().await?;
        tracing::info!(msg = name, keys = keys_written, events = events.len(), "message committed");
        self.sink.publish(&events).await;

        Ok(Executed {
            response,
            events,
            keys_written,
        })
    }

    async fn dispatch(&self, ctx: &mut Context<'_>, msg: Msg) -> Result<MsgResponse> {
        Ok(match msg {
            Msg::RegisterInstitution(m) => MsgResponse::Created(self.institutions.register(ctx, m).await?),
            Msg::UpdateInstitution(m) => {
                self.institutions.update(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::CreateCourse(m) => MsgResponse::Created(self.courses.create(ctx, m).await?),
            Msg::UpdateCourse(m) => {
                self.courses.update(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::CreateSubject(m) => MsgResponse::Created(self.subjects.create(ctx, m).await?),
            Msg::RegisterStudent(m) => MsgResponse::Created(self.students.register(ctx, m).await?),
            Msg::CreateCurriculum(m) => MsgResponse::Created(self.curricula.create(ctx, m).await?),
            Msg::AddSemester(m) => {
                self.curricula.add_semester(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::AddElectiveGroup(m) => {
                MsgResponse::Created(self.curricula.add_elective_group(ctx, m).await?)
            }
            Msg::SetGraduationRequirements(m) => {
                self.curricula.set_graduation_requirements(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::CreateTokenDefinition(m) => MsgResponse::Created(self.token_defs.create(ctx, m).await?),
            Msg::UpdateTokenDefinition(m) => {
                self.token_defs.update(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::MintSubjectToken(m) => MsgResponse::Created(self.instances.mint(ctx, m).await?),
            Msg::VerifyTokenInstance(m) => {
                MsgResponse::Verification(self.instances.verify_message(ctx, &m.token_instance_id).await?)
            }
            Msg::RequestDegree(m) => MsgResponse::DegreeRequested(self.degrees.request_degree(ctx, m).await?),
            Msg::ValidateDegreeRequirements(m) => {
                MsgResponse::Validation(self.degrees.validate_requirements(ctx, m).await?)
            }
            Msg::IssueDegree(m) => MsgResponse::DegreeIssued(self.degrees.issue_degree(ctx, m).await?),
            Msg::CancelDegreeRequest(m) => {
                self.degrees.cancel_request(ctx, m).await?;
                MsgResponse::Updated
            }
            Msg::UpdateDegreeContract(m) => {
                MsgResponse::ContractUpdated(self.degrees.update_contract(ctx, m).await?)
            }
        })
    }

    /// Delete a record together with its secondary indexes.
    pub async fn remove(&self, kind: RecordKind, index: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let tx = Transaction::new(self.kv());
        match kind {
            RecordKind::Institution => self.institutions.remove(&tx, index).await?,
            RecordKind::Course => self.courses.remove(&tx, index).await?,
            RecordKind::Subject => self.subjects.remove(&tx, index).await?,
            RecordKind::Student => self.students.remove(&tx, index).await?,
            RecordKind::Curriculum => self.curricula.remove(&tx, index).await?,
            RecordKind::TokenDefinition => self.token_defs.remove(&tx, index).await?,
            RecordKind::TokenInstance => self.instances.remove(&tx, index).await?,
        }
        let keys = tx.commit().await?;
        tracing::info!(?kind, index, keys, "record removed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Institutions, courses, subjects, students
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn institution(&self, index: &str) -> Result<Option<Institution>> {
        Ok(self.institutions.get(self.kv(), index).await?)
    }

    pub async fn institutions(&self, request: PageRequest) -> Result<Page<Institution>> {
        Ok(self.institutions.list(self.kv(), self.page(request)).await?)
    }

    pub async fn authorized_institutions(&self) -> Result<Vec<Institution>> {
        Ok(self.institutions.authorized_institutions(self.kv()).await?)
    }

    pub async fn course(&self, index: &str) -> Result<Option<Course>> {
        Ok(self.courses.get(self.kv(), index).await?)
    }

    pub async fn courses(&self, request: PageRequest) -> Result<Page<Course>> {
        Ok(self.courses.list(self.kv(), self.page(request)).await?)
    }

    pub async fn courses_by_institution(&self, institution: &str, request: PageRequest) -> Result<Page<Course>> {
        Ok(self
            .courses
            .courses_by_institution(self.kv(), institution, self.page(request))
            .await?)
    }

    pub async fn subject(&self, index: &str) -> Result<Option<Subject>> {
        Ok(self.subjects.get(self.kv(), index).await?)
    }

    pub async fn subjects(&self, request: PageRequest) -> Result<Page<Subject>> {
        Ok(self.subjects.list(self.kv(), self.page(request)).await?)
    }

    pub async fn subjects_by_course(&self, course: &str, request: PageRequest) -> Result<Page<Subject>> {
        Ok(self
            .subjects
            .subjects_by_course(self.kv(), course, self.page(request))
            .await?)
    }

    pub async fn subject_content(&self, index: &str) -> Result<Option<Bytes>> {
        Ok(self.subjects.subject_content(self.kv(), index).await?)
    }

    pub async fn student(&self, index: &str) -> Result<Option<Student>> {
        Ok(self.students.get(self.kv(), index).await?)
    }

    pub async fn student_by_address(&self, address: &Address) -> Result<Option<Student>> {
        Ok(self.students.get_by_address(self.kv(), address).await?)
    }

    pub async fn students(&self, request: PageRequest) -> Result<Page<Student>> {
        Ok(self.students.list(self.kv(), self.page(request)).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Curricula
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn curriculum(&self, index: &str) -> Result<Option<CurriculumTree>> {
        Ok(self.curricula.get(self.kv(), index).await?)
    }

    pub async fn curricula(&self, request: PageRequest) -> Result<Page<CurriculumTree>> {
        Ok(self.curricula.list(self.kv(), self.page(request)).await?)
    }

    pub async fn curricula_by_course(&self, course: &str, request: PageRequest) -> Result<Page<CurriculumTree>> {
        Ok(self
            .curricula
            .curricula_by_course(self.kv(), course, self.page(request))
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn token_definition(&self, index: &str) -> Result<Option<TokenDefinition>> {
        Ok(self.token_defs.get(self.kv(), index).await?)
    }

    pub async fn token_definitions(&self, request: PageRequest) -> Result<Page<TokenDefinition>> {
        Ok(self.token_defs.list(self.kv(), self.page(request)).await?)
    }

    pub async fn token_definitions_by_subject(
        &self,
        subject: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        Ok(self
            .token_defs
            .by_subject(self.kv(), subject, self.page(request))
            .await?)
    }

    pub async fn token_definitions_by_course(
        &self,
        course: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        Ok(self
            .token_defs
            .by_course(self.kv(), course, self.page(request))
            .await?)
    }

    pub async fn token_definitions_by_institution(
        &self,
        institution: &str,
        request: PageRequest,
    ) -> Result<Page<TokenDefinition>> {
        Ok(self
            .token_defs
            .by_institution(self.kv(), institution, self.page(request))
            .await?)
    }

    pub async fn token_instance(&self, index: &str) -> Result<Option<SubjectTokenInstance>> {
        Ok(self.instances.get(self.kv(), index).await?)
    }

    pub async fn tokens_by_student(
        &self,
        student: &Address,
        request: PageRequest,
    ) -> Result<Page<SubjectTokenInstance>> {
        Ok(self
            .instances
            .by_student(self.kv(), student, self.page(request))
            .await?)
    }

    pub async fn tokens_by_definition(
        &self,
        token_def_id: &str,
        request: PageRequest,
    ) -> Result<Page<SubjectTokenInstance>> {
        Ok(self
            .instances
            .by_token_definition(self.kv(), token_def_id, self.page(request))
            .await?)
    }

    /// Read-only verification; use [`Msg::VerifyTokenInstance`] to leave an
    /// event on the record.
    pub async fn verify_token(&self, index: &str) -> Result<TokenVerification> {
        Ok(self.instances.verify(self.kv(), index).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Degrees
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn degree_request(&self, id: &str) -> Result<Option<DegreeRequest>> {
        Ok(self.degrees.get_request(self.kv(), id).await?)
    }

    pub async fn degree_requests_by_status(
        &self,
        status: DegreeRequestStatus,
        request: PageRequest,
    ) -> Result<Page<DegreeRequest>> {
        Ok(self
            .degrees
            .requests_by_status(self.kv(), status, self.page(request))
            .await?)
    }

    pub async fn validation_status(&self, id: &str) -> Result<ValidationStatus> {
        Ok(self.degrees.validation_status(self.kv(), id).await?)
    }

    pub async fn degree(&self, index: &str) -> Result<Option<Degree>> {
        Ok(self.degrees.get_degree(self.kv(), index).await?)
    }

    pub async fn degrees_by_student(&self, student: &str, request: PageRequest) -> Result<Page<Degree>> {
        Ok(self
            .degrees
            .degrees_by_student(self.kv(), student, self.page(request))
            .await?)
    }

    pub async fn degrees_by_institution(&self, institution: &str, request: PageRequest) -> Result<Page<Degree>> {
        Ok(self
            .degrees
            .degrees_by_institution(self.kv(), institution, self.page(request))
            .await?)
    }

    pub async fn contract_info(&self) -> Result<ContractInfo> {
        Ok(self.degrees.contract_info(self.kv()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sink::MemorySink;
    use academic_ledger_core::FixedClock;
    use academic_ledger_degree::executor::mock::MockContractExecutor;
    use academic_ledger_registry::RegisterInstitution;
    use academic_ledger_store::MemoryStore;

    fn ledger() -> (Ledger<MemoryStore>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let ledger = Ledger::builder(MemoryStore::new(), Arc::new(MockContractExecutor::new()))
            .clock(Arc::new(FixedClock::from_unix(1_709_285_400)))
            .event_sink(sink.clone())
            .build()
            .unwrap();
        (ledger, sink)
    }

    fn register(name: &str, address: &str) -> Msg {
        Msg::RegisterInstitution(RegisterInstitution {
            creator: Address::new("cosmos1alice"),
            name: name.into(),
            address: address.into(),
        })
    }

    #[tokio::test]
    async fn test_commit_publishes_events() {
        let (ledger, sink) = ledger();
        let executed = ledger.execute(register("State University", "addr-state")).await.unwrap();

        assert_eq!(executed.response.created_index(), Some("institution-1"));
        assert!(executed.keys_written > 0);
        assert_eq!(sink.kinds().await, ["institution_registered"]);
        assert!(ledger.institution("institution-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_message_leaves_no_trace() {
        let (ledger, sink) = ledger();
        ledger.execute(register("State University", "addr-state")).await.unwrap();
        let before = ledger.store().len().await;

        let err = ledger
            .execute(register("State University", "addr-other"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(ledger.store().len().await, before);
        assert_eq!(sink.events().await.len(), 1);

        // The failed message did not consume an id.
        let next = ledger.execute(register("Tech Institute", "addr-tech")).await.unwrap();
        assert_eq!(next.response.created_index(), Some("institution-2"));
    }

    #[tokio::test]
    async fn test_zero_limit_uses_configured_page_size() {
        let sink = Arc::new(MemorySink::new());
        let ledger = Ledger::builder(MemoryStore::new(), Arc::new(MockContractExecutor::new()))
            .config(LedgerConfig {
                default_page_limit: 2,
                ..LedgerConfig::default()
            })
            .event_sink(sink)
            .build()
            .unwrap();
        for i in 0..3 {
            ledger
                .execute(register(&format!("University {i}"), &format!("addr-{i}")))
                .await
                .unwrap();
        }

        let page = ledger.institutions(PageRequest::new(0, 0)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page.total, 3);
        assert_eq!(page.page.next_offset, Some(2));
    }

    #[tokio::test]
    async fn test_remove_runs_in_transaction() {
        let (ledger, _) = ledger();
        ledger.execute(register("State University", "addr-state")).await.unwrap();

        ledger.remove(RecordKind::Institution, "institution-1").await.unwrap();
        assert!(ledger.institution("institution-1").await.unwrap().is_none());
        // Name is free again once the index went with the record.
        ledger.execute(register("State University", "addr-state")).await.unwrap();
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let result = Ledger::builder(MemoryStore::new(), Arc::new(MockContractExecutor::new()))
            .config(LedgerConfig {
                address_prefix: String::new(),
                ..LedgerConfig::default()
            })
            .build();
        assert!(result.is_err());
    }
}
