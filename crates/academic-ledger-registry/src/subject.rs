//! Subject registry.
//!
//! Extended subject content (syllabus, bibliography and so on) is kept out
//! of the ledger: it is pushed to the blob store and the subject records
//! only the content hash and the returned `ipfs://` address.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::{require_non_empty, require_positive};
use academic_ledger_core::{Address, ContentHash, Event, Subject, SubjectType, ValidationError};
use academic_ledger_store::{BlobStore, Context, KvStore, StoreExt};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{self, SUBJECTS, SUBJECT_VALUE};
use crate::pagination::{Page, PageRequest};
use crate::traits::{CourseKeeper, InstitutionKeeper, SubjectKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubject {
    pub creator: Address,
    pub institution: String,
    pub course_id: String,
    pub title: String,
    pub code: String,
    pub workload_hours: u64,
    pub credits: u64,
    pub description: String,
    pub subject_type: String,
    pub knowledge_area: String,
    /// Optional extended content pushed to the blob store.
    #[serde(default)]
    pub content: Option<String>,
}

pub struct SubjectRegistry {
    institutions: Arc<dyn InstitutionKeeper>,
    courses: Arc<dyn CourseKeeper>,
    blobs: Arc<dyn BlobStore>,
}

impl SubjectRegistry {
    pub fn new(
        institutions: Arc<dyn InstitutionKeeper>,
        courses: Arc<dyn CourseKeeper>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            institutions,
            courses,
            blobs,
        }
    }

    pub async fn create(&self, ctx: &mut Context<'_>, msg: CreateSubject) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("institution", &msg.institution)?;
        require_non_empty("course_id", &msg.course_id)?;
        require_non_empty("title", &msg.title)?;
        require_non_empty("code", &msg.code)?;
        require_positive("workload_hours", msg.workload_hours)?;
        require_positive("credits", msg.credits)?;
        let subject_type: SubjectType = msg.subject_type.parse()?;

        let store = ctx.store();
        if self
            .institutions
            .institution(store, &msg.institution)
            .await?
            .is_none()
        {
            return Err(RegistryError::not_found("institution", &msg.institution));
        }
        let course = self
            .courses
            .course(store, &msg.course_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("course", &msg.course_id))?;
        if course.institution != msg.institution {
            return Err(ValidationError::malformed("course_id", &msg.course_id).into());
        }

        let (content_hash, ipfs_link) = match msg.content.filter(|c| !c.is_empty()) {
            Some(content) => {
                let hash = ContentHash::hash(content.as_bytes()).to_hex();
                let address = self.blobs.put(Bytes::from(content)).await?;
                (Some(hash), Some(address))
            }
            None => (None, None),
        };

        let index = SUBJECTS.next_index(store).await?;
        let subject = Subject {
            index: index.clone(),
            creator: msg.creator,
            institution: msg.institution,
            course_id: msg.course_id,
            title: msg.title,
            code: msg.code,
            workload_hours: msg.workload_hours,
            credits: msg.credits,
            description: msg.description,
            subject_type,
            knowledge_area: msg.knowledge_area,
            content_hash,
            ipfs_link,
        };
        store
            .set_record(&keys::key(SUBJECT_VALUE, &[&index]), &subject)
            .await?;
        self.courses
            .note_subject_added(store, &subject.course_id)
            .await?;

        tracing::info!(index = %index, course = %subject.course_id, "subject created");
        ctx.emit(
            Event::new(kinds::SUBJECT_CREATED)
                .attr("subject_index", &index)
                .attr("institution", &subject.institution)
                .attr("course_id", &subject.course_id)
                .attr("title", &subject.title)
                .attr("code", &subject.code)
                .attr("creator", &subject.creator),
        );
        Ok(index)
    }

    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        if !self.exists(store, index).await? {
            return Err(RegistryError::not_found("subject", index));
        }
        store.delete(&keys::key(SUBJECT_VALUE, &[index])).await?;
        Ok(())
    }

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<Subject>> {
        Ok(store.get_record(&keys::key(SUBJECT_VALUE, &[index])).await?)
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store.has(&keys::key(SUBJECT_VALUE, &[index])).await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<Subject>> {
        Ok(store.records_with_prefix(SUBJECT_VALUE.as_bytes()).await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<Subject>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    pub async fn subjects_by_course(
        &self,
        store: &dyn KvStore,
        course_id: &str,
        request: PageRequest,
    ) -> Result<Page<Subject>> {
        let mut subjects = self.get_all(store).await?;
        subjects.retain(|s| s.course_id == course_id);
        Ok(Page::from_all(subjects, request))
    }

    /// Fetch the extended content of a subject from the blob store.
    pub async fn subject_content(&self, store: &dyn KvStore, index: &str) -> Result<Option<Bytes>> {
        let subject = self
            .get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("subject", index))?;
        match subject.ipfs_link {
            Some(address) => Ok(Some(self.blobs.get(&address).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SubjectKeeper for SubjectRegistry {
    async fn subject(&self, store: &dyn KvStore, index: &str) -> Result<Option<Subject>> {
        self.get(store, index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{CourseRegistry, CreateCourse};
    use crate::institution::{InstitutionRegistry, RegisterInstitution, UpdateInstitution};
    use academic_ledger_perms::AuthorizationPolicy;
    use academic_ledger_store::{MemoryBlobStore, MemoryStore};
    use chrono::Utc;

    struct Setup {
        store: MemoryStore,
        courses: Arc<CourseRegistry>,
        subjects: SubjectRegistry,
        institution: String,
        course: String,
    }

    async fn setup() -> Setup {
        let store = MemoryStore::new();
        let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
        let institutions = Arc::new(InstitutionRegistry::new(policy.clone()));
        let courses = Arc::new(CourseRegistry::new(policy, institutions.clone()));
        let subjects = SubjectRegistry::new(
            institutions.clone(),
            courses.clone(),
            Arc::new(MemoryBlobStore::new()),
        );

        let mut ctx = Context::new(&store, Utc::now());
        let creator = Address::new("cosmos1alice");
        let institution = institutions
            .register(
                &mut ctx,
                RegisterInstitution {
                    creator: creator.clone(),
                    name: "MIT".into(),
                    address: "addr-mit".into(),
                },
            )
            .await
            .unwrap();
        institutions
            .update(
                &mut ctx,
                UpdateInstitution {
                    updater: creator.clone(),
                    index: institution.clone(),
                    is_authorized: Some("true".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let course = courses
            .create(
                &mut ctx,
                CreateCourse {
                    creator,
                    institution: institution.clone(),
                    name: "Computer Science".into(),
                    code: "CS".into(),
                    description: String::new(),
                    total_credits: "240".into(),
                    degree_level: "undergraduate".into(),
                },
            )
            .await
            .unwrap();
        drop(ctx);

        Setup {
            store,
            courses,
            subjects,
            institution,
            course,
        }
    }

    fn create_msg(s: &Setup) -> CreateSubject {
        CreateSubject {
            creator: Address::new("cosmos1alice"),
            institution: s.institution.clone(),
            course_id: s.course.clone(),
            title: "Calculus I".into(),
            code: "MAT101".into(),
            workload_hours: 60,
            credits: 4,
            description: "Limits and derivatives".into(),
            subject_type: "required".into(),
            knowledge_area: "Mathematics".into(),
            content: None,
        }
    }

    #[tokio::test]
    async fn test_create_subject() {
        let s = setup().await;
        let mut ctx = Context::new(&s.store, Utc::now());

        let index = s.subjects.create(&mut ctx, create_msg(&s)).await.unwrap();
        assert_eq!(index, "subject-1");

        let subject = s.subjects.get(&s.store, &index).await.unwrap().unwrap();
        assert_eq!(subject.subject_type, SubjectType::Required);
        assert!(subject.ipfs_link.is_none());

        let course = s.courses.get(&s.store, &s.course).await.unwrap().unwrap();
        assert_eq!(course.subject_count, 1);

        let page = s
            .subjects
            .subjects_by_course(&s.store, &s.course, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_extended_content_goes_to_blob_store() {
        let s = setup().await;
        let mut ctx = Context::new(&s.store, Utc::now());
        let msg = CreateSubject {
            content: Some("Syllabus: limits, continuity, derivatives".into()),
            ..create_msg(&s)
        };

        let index = s.subjects.create(&mut ctx, msg).await.unwrap();
        let subject = s.subjects.get(&s.store, &index).await.unwrap().unwrap();
        assert!(subject.ipfs_link.as_deref().unwrap().starts_with("ipfs://"));
        assert_eq!(
            subject.content_hash.unwrap(),
            ContentHash::hash(b"Syllabus: limits, continuity, derivatives").to_hex()
        );

        let content = s.subjects.subject_content(&s.store, &index).await.unwrap().unwrap();
        assert_eq!(&content[..], b"Syllabus: limits, continuity, derivatives");
    }

    #[tokio::test]
    async fn test_shape_validation() {
        let s = setup().await;
        let mut ctx = Context::new(&s.store, Utc::now());

        let cases = [
            CreateSubject { title: String::new(), ..create_msg(&s) },
            CreateSubject { workload_hours: 0, ..create_msg(&s) },
            CreateSubject { credits: 0, ..create_msg(&s) },
            CreateSubject { subject_type: "mandatory".into(), ..create_msg(&s) },
        ];
        for msg in cases {
            assert!(matches!(
                s.subjects.create(&mut ctx, msg).await,
                Err(RegistryError::Validation(_))
            ));
        }
        assert!(s.subjects.get_all(&s.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_references_must_exist() {
        let s = setup().await;
        let mut ctx = Context::new(&s.store, Utc::now());

        let err = s
            .subjects
            .create(&mut ctx, CreateSubject { course_id: "course-9".into(), ..create_msg(&s) })
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = s
            .subjects
            .create(
                &mut ctx,
                CreateSubject { institution: "institution-9".into(), ..create_msg(&s) },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
