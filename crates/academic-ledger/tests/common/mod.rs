//! Shared setup for the ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use academic_ledger::core::{FixedClock, GraduationRequirements, TokenMetadata};
use academic_ledger::degree::executor::mock::MockContractExecutor;
use academic_ledger::registry::{
    CreateCourse, CreateCurriculum, CreateSubject, CreateTokenDefinition, MintSubjectToken,
    RegisterInstitution, RegisterStudent, SetGraduationRequirements, UpdateInstitution,
};
use academic_ledger::store::{KvStore, MemoryStore};
use academic_ledger::{Address, Ledger, LedgerConfig, MemorySink, Msg};

/// 2024-03-01T09:30:00Z
pub const BLOCK_TIME: i64 = 1_709_285_400;

pub const ALICE: &str = "cosmos1alice";
pub const ADA: &str = "cosmos1ada";

pub struct Harness<S: KvStore> {
    pub ledger: Ledger<S>,
    pub contract: Arc<MockContractExecutor>,
    pub sink: Arc<MemorySink>,
}

pub fn harness(config: LedgerConfig) -> Harness<MemoryStore> {
    harness_on(MemoryStore::new(), config)
}

pub fn harness_on<S: KvStore>(store: S, config: LedgerConfig) -> Harness<S> {
    init_tracing();
    let contract = Arc::new(MockContractExecutor::new());
    let sink = Arc::new(MemorySink::new());
    let ledger = Ledger::builder(store, contract.clone())
        .config(config)
        .clock(Arc::new(FixedClock::from_unix(BLOCK_TIME)))
        .event_sink(sink.clone())
        .build()
        .expect("valid config");
    Harness {
        ledger,
        contract,
        sink,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Indexes created by [`Harness::seed`].
#[derive(Debug, Clone)]
pub struct Seeded {
    pub institution: String,
    pub course: String,
    pub subject: String,
    pub token_def: String,
    pub curriculum: String,
}

impl<S: KvStore> Harness<S> {
    pub async fn run(&self, msg: Msg) -> String {
        let executed = self.ledger.execute(msg).await.expect("message accepted");
        executed
            .response
            .created_index()
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Authorized institution, one course, one subject with a token
    /// definition, a curriculum with graduation requirements, and `ADA`
    /// enrolled.
    pub async fn seed(&self) -> Seeded {
        let institution = self
            .run(register_institution("State University", "addr1"))
            .await;
        self.run(authorize(self.ledger.config().authority(), &institution))
            .await;
        let course = self.run(create_course(&institution, "CS101")).await;
        let subject = self
            .run(create_subject(&institution, &course, "MAT101"))
            .await;
        self.run(register_student(ADA, &institution)).await;
        let token_def = self.run(create_token_definition(&subject)).await;
        let curriculum = self
            .run(Msg::CreateCurriculum(CreateCurriculum {
                creator: Address::new(ALICE),
                course_id: course.clone(),
                version: "2024.1".into(),
                elective_min: 1,
                total_workload_hours: 3200,
                required_subjects: vec![subject.clone()],
                elective_subjects: Vec::new(),
            }))
            .await;
        self.run(Msg::SetGraduationRequirements(SetGraduationRequirements {
            creator: Address::new(ALICE),
            curriculum_index: curriculum.clone(),
            requirements: GraduationRequirements {
                total_credits_required: 240,
                min_gpa: 2.0,
                required_elective_credits: 12,
                required_activities: vec!["thesis".into()],
                minimum_time_years: 4,
                maximum_time_years: 8,
            },
        }))
        .await;
        self.sink.clear().await;

        Seeded {
            institution,
            course,
            subject,
            token_def,
            curriculum,
        }
    }
}

pub fn register_institution(name: &str, address: &str) -> Msg {
    Msg::RegisterInstitution(RegisterInstitution {
        creator: Address::new(ALICE),
        name: name.into(),
        address: address.into(),
    })
}

pub fn authorize(authority: Address, institution: &str) -> Msg {
    Msg::UpdateInstitution(UpdateInstitution {
        updater: authority,
        index: institution.into(),
        is_authorized: Some("true".into()),
        ..Default::default()
    })
}

pub fn create_course(institution: &str, code: &str) -> Msg {
    Msg::CreateCourse(CreateCourse {
        creator: Address::new(ALICE),
        institution: institution.into(),
        name: "Computer Science".into(),
        code: code.into(),
        description: "Bachelor of Computer Science".into(),
        total_credits: "4".into(),
        degree_level: "undergraduate".into(),
    })
}

pub fn create_subject(institution: &str, course: &str, code: &str) -> Msg {
    Msg::CreateSubject(CreateSubject {
        creator: Address::new(ALICE),
        institution: institution.into(),
        course_id: course.into(),
        title: "Calculus I".into(),
        code: code.into(),
        workload_hours: 60,
        credits: 4,
        description: "Limits, derivatives and integrals".into(),
        subject_type: "required".into(),
        knowledge_area: "Mathematics".into(),
        content: Some("# Calculus I\n\nSyllabus".into()),
    })
}

pub fn register_student(address: &str, institution: &str) -> Msg {
    Msg::RegisterStudent(RegisterStudent {
        creator: Address::new(ALICE),
        address: address.into(),
        name: "Ada".into(),
        institution: institution.into(),
    })
}

pub fn create_token_definition(subject: &str) -> Msg {
    Msg::CreateTokenDefinition(CreateTokenDefinition {
        creator: Address::new(ALICE),
        subject_id: subject.into(),
        token_name: "Calculus I Completion".into(),
        token_symbol: "CALC1".into(),
        token_type: "NFT".into(),
        is_transferable: false,
        is_burnable: false,
        max_supply: 0,
        metadata: TokenMetadata {
            description: "Awarded on completing Calculus I".into(),
            image_uri: "ipfs://calc1".into(),
            attributes: Vec::new(),
        },
    })
}

pub fn mint(token_def: &str, student: &str, institution: &str, grade: &str) -> Msg {
    Msg::MintSubjectToken(MintSubjectToken {
        creator: Address::new(ALICE),
        token_def_id: token_def.into(),
        student: student.into(),
        completion_date: "2024-02-20".into(),
        grade: grade.into(),
        issuer_institution: institution.into(),
        semester: "2023-2".into(),
        professor_signature: "sig-prof".into(),
    })
}
