//! Shared wiring for registry unit tests.

use std::sync::Arc;

use academic_ledger_core::{Address, Clock, FixedClock, TokenMetadata};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_store::{Context, MemoryBlobStore, MemoryStore};

use crate::course::{CourseRegistry, CreateCourse};
use crate::curriculum::CurriculumRegistry;
use crate::instance::{MintSubjectToken, TokenInstanceRegistry};
use crate::institution::{InstitutionRegistry, RegisterInstitution, UpdateInstitution};
use crate::student::{RegisterStudent, StudentRegistry};
use crate::subject::{CreateSubject, SubjectRegistry};
use crate::tokendef::{CreateTokenDefinition, TokenDefinitionRegistry};

/// 2024-03-01T09:30:00Z
const BLOCK_TIME: i64 = 1_709_285_400;

pub struct World {
    pub store: MemoryStore,
    pub institutions: Arc<InstitutionRegistry>,
    pub courses: Arc<CourseRegistry>,
    pub subjects: Arc<SubjectRegistry>,
    pub students: Arc<StudentRegistry>,
    pub curricula: CurriculumRegistry,
    pub token_defs: Arc<TokenDefinitionRegistry>,
    pub instances: TokenInstanceRegistry,
    pub creator: Address,
    pub institution: String,
    pub course: String,
    pub subject: String,
}

impl World {
    pub fn new() -> Self {
        let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
        let institutions = Arc::new(InstitutionRegistry::new(policy.clone()));
        let courses = Arc::new(CourseRegistry::new(policy.clone(), institutions.clone()));
        let subjects = Arc::new(SubjectRegistry::new(
            institutions.clone(),
            courses.clone(),
            Arc::new(MemoryBlobStore::new()),
        ));
        let students = Arc::new(StudentRegistry::new("cosmos", institutions.clone()));
        let curricula = CurriculumRegistry::new(
            policy.clone(),
            institutions.clone(),
            courses.clone(),
            subjects.clone(),
        );
        let token_defs = Arc::new(TokenDefinitionRegistry::new(policy, subjects.clone()));
        let instances = TokenInstanceRegistry::new(
            "cosmos",
            institutions.clone(),
            students.clone(),
            token_defs.clone(),
        );

        Self {
            store: MemoryStore::new(),
            institutions,
            courses,
            subjects,
            students,
            curricula,
            token_defs,
            instances,
            creator: Address::new("cosmos1alice"),
            institution: String::new(),
            course: String::new(),
            subject: String::new(),
        }
    }

    /// An authorized institution with one course, one subject and two
    /// registered students (`cosmos1ada`, `cosmos1bob`).
    pub async fn seeded() -> Self {
        let mut world = Self::new();
        let (institution, course, subject) = world.seed().await;
        world.institution = institution;
        world.course = course;
        world.subject = subject;
        world
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.store, FixedClock::from_unix(BLOCK_TIME).now())
    }

    async fn seed(&self) -> (String, String, String) {
        let mut ctx = self.ctx();
        let institution = self
            .institutions
            .register(
                &mut ctx,
                RegisterInstitution {
                    creator: self.creator.clone(),
                    name: "State University".into(),
                    address: "addr-state".into(),
                },
            )
            .await
            .unwrap();
        self.institutions
            .update(
                &mut ctx,
                UpdateInstitution {
                    updater: Address::new("cosmos1gov"),
                    index: institution.clone(),
                    is_authorized: Some("true".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let course = self
            .courses
            .create(
                &mut ctx,
                CreateCourse {
                    creator: self.creator.clone(),
                    institution: institution.clone(),
                    name: "Computer Science".into(),
                    code: "CS".into(),
                    description: "Bachelor of Computer Science".into(),
                    total_credits: "240".into(),
                    degree_level: "undergraduate".into(),
                },
            )
            .await
            .unwrap();
        let subject = self.add_subject(&mut ctx, &institution, &course, "MAT101").await;
        for student in ["cosmos1ada", "cosmos1bob"] {
            self.students
                .register(
                    &mut ctx,
                    RegisterStudent {
                        creator: self.creator.clone(),
                        address: student.into(),
                        name: student.trim_start_matches("cosmos1").into(),
                        institution: institution.clone(),
                    },
                )
                .await
                .unwrap();
        }
        (institution, course, subject)
    }

    pub async fn add_subject(
        &self,
        ctx: &mut Context<'_>,
        institution: &str,
        course: &str,
        code: &str,
    ) -> String {
        self.subjects
            .create(
                ctx,
                CreateSubject {
                    creator: self.creator.clone(),
                    institution: institution.into(),
                    course_id: course.into(),
                    title: format!("Subject {code}"),
                    code: code.into(),
                    workload_hours: 60,
                    credits: 4,
                    description: String::new(),
                    subject_type: "required".into(),
                    knowledge_area: "Mathematics".into(),
                    content: None,
                },
            )
            .await
            .unwrap()
    }

    pub fn token_def_msg(&self, subject: &str) -> CreateTokenDefinition {
        CreateTokenDefinition {
            creator: self.creator.clone(),
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
        }
    }

    pub fn mint_msg(&self, token_def: &str, student: &str, grade: &str) -> MintSubjectToken {
        MintSubjectToken {
            creator: self.creator.clone(),
            token_def_id: token_def.into(),
            student: student.into(),
            completion_date: "2024-02-20".into(),
            grade: grade.into(),
            issuer_institution: self.institution.clone(),
            semester: "2023-2".into(),
            professor_signature: "sig-prof".into(),
        }
    }
}
