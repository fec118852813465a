//! Test fixtures and helpers.
//!
//! Common setup code for integration tests and benchmarks.

use std::sync::Arc;

use academic_ledger::{Executed, Ledger, LedgerConfig, MemorySink, Msg, Result};
use academic_ledger_core::{Address, FixedClock, TokenMetadata};
use academic_ledger_degree::executor::mock::MockContractExecutor;
use academic_ledger_degree::{IssueDegree, RequestDegree, ValidateDegreeRequirements};
use academic_ledger_registry::{
    CreateCourse, CreateCurriculum, CreateSubject, CreateTokenDefinition, MintSubjectToken,
    RegisterInstitution, RegisterStudent, UpdateInstitution,
};
use academic_ledger_store::MemoryStore;
use serde_json::json;

/// 2024-03-01T09:30:00Z
pub const FIXTURE_TIME: i64 = 1_709_285_400;

/// Request id the scripted contract hands out.
pub const FIXTURE_REQUEST_ID: &str = "dr-1";

/// Degree id the scripted contract hands out.
pub const FIXTURE_DEGREE_ID: &str = "degree-1";

/// A ledger over a memory store with one authorized institution, a course,
/// a subject with a token definition and a curriculum.
pub struct LedgerFixture {
    pub ledger: Ledger<MemoryStore>,
    pub contract: Arc<MockContractExecutor>,
    pub sink: Arc<MemorySink>,
    pub creator: Address,
    pub institution: String,
    pub course: String,
    pub subject: String,
    pub token_def: String,
    pub curriculum: String,
}

impl LedgerFixture {
    pub async fn new() -> Self {
        Self::with_config(LedgerConfig::default()).await
    }

    /// Seed a ledger built with `config`. Panics if seeding is rejected.
    pub async fn with_config(config: LedgerConfig) -> Self {
        let contract = Arc::new(MockContractExecutor::new());
        let sink = Arc::new(MemorySink::new());
        let ledger = Ledger::builder(MemoryStore::new(), contract.clone())
            .config(config)
            .clock(Arc::new(FixedClock::from_unix(FIXTURE_TIME)))
            .event_sink(sink.clone())
            .build()
            .expect("fixture config is valid");

        let mut fixture = Self {
            ledger,
            contract,
            sink,
            creator: Address::new("cosmos1registrar"),
            institution: String::new(),
            course: String::new(),
            subject: String::new(),
            token_def: String::new(),
            curriculum: String::new(),
        };
        fixture.seed().await;
        fixture.sink.clear().await;
        fixture
    }

    async fn seed(&mut self) {
        self.institution = self
            .created(Msg::RegisterInstitution(RegisterInstitution {
                creator: self.creator.clone(),
                name: "Fixture University".into(),
                address: "addr-fixture".into(),
            }))
            .await;
        self.created(Msg::UpdateInstitution(UpdateInstitution {
            updater: self.ledger.config().authority(),
            index: self.institution.clone(),
            is_authorized: Some("true".into()),
            ..Default::default()
        }))
        .await;
        self.course = self
            .created(Msg::CreateCourse(CreateCourse {
                creator: self.creator.clone(),
                institution: self.institution.clone(),
                name: "Mathematics".into(),
                code: "MATH".into(),
                description: "Bachelor of Mathematics".into(),
                total_credits: "240".into(),
                degree_level: "undergraduate".into(),
            }))
            .await;
        self.subject = self.add_subject("MAT101").await;
        self.token_def = self.define_token(&self.subject).await;
        self.curriculum = self
            .created(Msg::CreateCurriculum(CreateCurriculum {
                creator: self.creator.clone(),
                course_id: self.course.clone(),
                version: "2024.1".into(),
                elective_min: 1,
                total_workload_hours: 3000,
                required_subjects: vec![self.subject.clone()],
                elective_subjects: Vec::new(),
            }))
            .await;
    }

    async fn created(&self, msg: Msg) -> String {
        let name = msg.name();
        let executed = self
            .ledger
            .execute(msg)
            .await
            .unwrap_or_else(|e| panic!("fixture {name} rejected: {e}"));
        executed
            .response
            .created_index()
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Add another subject to the fixture course.
    pub async fn add_subject(&self, code: &str) -> String {
        self.created(Msg::CreateSubject(CreateSubject {
            creator: self.creator.clone(),
            institution: self.institution.clone(),
            course_id: self.course.clone(),
            title: format!("Subject {code}"),
            code: code.into(),
            workload_hours: 60,
            credits: 4,
            description: String::new(),
            subject_type: "required".into(),
            knowledge_area: "Mathematics".into(),
            content: None,
        }))
        .await
    }

    /// Create an unlimited, non-transferable token definition for `subject`.
    pub async fn define_token(&self, subject: &str) -> String {
        self.created(Msg::CreateTokenDefinition(CreateTokenDefinition {
            creator: self.creator.clone(),
            subject_id: subject.into(),
            token_name: format!("{subject} completion"),
            token_symbol: "DONE".into(),
            token_type: "NFT".into(),
            is_transferable: false,
            is_burnable: false,
            max_supply: 0,
            metadata: TokenMetadata {
                description: String::new(),
                image_uri: String::new(),
                attributes: Vec::new(),
            },
        }))
        .await
    }

    /// Register `address` as a student of the fixture institution.
    pub async fn enroll(&self, address: &str) -> String {
        self.created(Msg::RegisterStudent(RegisterStudent {
            creator: self.creator.clone(),
            address: address.into(),
            name: address.trim_start_matches("cosmos1").into(),
            institution: self.institution.clone(),
        }))
        .await
    }

    pub fn mint_msg(&self, token_def: &str, student: &str, grade: &str) -> Msg {
        Msg::MintSubjectToken(MintSubjectToken {
            creator: self.creator.clone(),
            token_def_id: token_def.into(),
            student: student.into(),
            completion_date: "2024-02-20".into(),
            grade: grade.into(),
            issuer_institution: self.institution.clone(),
            semester: "2023-2".into(),
            professor_signature: "sig-prof".into(),
        })
    }

    /// Mint the fixture token for `student`.
    pub async fn mint(&self, student: &str, grade: &str) -> Result<Executed> {
        self.ledger
            .execute(self.mint_msg(&self.token_def, student, grade))
            .await
    }

    /// Script the contract to accept every degree step.
    pub async fn script_happy_contract(&self) {
        script_happy_contract(&self.contract).await;
    }

    pub async fn request_degree(&self, student: &str) -> Result<Executed> {
        self.ledger
            .execute(Msg::RequestDegree(RequestDegree {
                creator: self.creator.clone(),
                student_id: student.into(),
                institution_id: self.institution.clone(),
                curriculum_id: self.curriculum.clone(),
                expected_graduation_date: "2024-12-15".into(),
                contract_address: None,
            }))
            .await
    }

    pub async fn validate_degree(&self, request_id: &str) -> Result<Executed> {
        self.ledger
            .execute(Msg::ValidateDegreeRequirements(ValidateDegreeRequirements {
                creator: self.creator.clone(),
                degree_request_id: request_id.into(),
                validation_parameters: json!({}),
                contract_address: None,
            }))
            .await
    }

    pub async fn issue_degree(&self, request_id: &str) -> Result<Executed> {
        self.ledger
            .execute(Msg::IssueDegree(IssueDegree {
                creator: self.creator.clone(),
                degree_request_id: request_id.into(),
                final_gpa: "3.4".into(),
                total_credits: 240,
                signatures: vec!["sig-dean".into()],
                contract_address: None,
            }))
            .await
    }
}

/// Answer every degree message with a successful response.
pub async fn script_happy_contract(contract: &MockContractExecutor) {
    contract
        .respond(
            "request_degree",
            json!({"degree_request_id": FIXTURE_REQUEST_ID, "status": "pending"}),
        )
        .await;
    contract
        .respond(
            "validate_degree_requirements",
            json!({"validation_passed": true, "validation_score": "100"}),
        )
        .await;
    contract
        .respond(
            "issue_degree",
            json!({"degree_id": FIXTURE_DEGREE_ID, "nft_token_id": "nft-1", "ipfs_hash": "QmFixture"}),
        )
        .await;
    contract.respond("cancel_degree_request", json!({})).await;
}

/// Distinct, well-formed student addresses.
pub fn student_addresses(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("cosmos1student{i:05}")).collect()
}
