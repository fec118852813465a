//! Course registry.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::{parse_credits, require_non_empty};
use academic_ledger_core::{Address, Course, DegreeLevel, Event, ValidationError};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_store::{Context, KvStore, StoreExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{self, COURSES, COURSE_BY_INSTITUTION, COURSE_CODE, COURSE_VALUE};
use crate::pagination::{Page, PageRequest};
use crate::traits::{CourseKeeper, InstitutionKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCourse {
    pub creator: Address,
    pub institution: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub total_credits: String,
    pub degree_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCourse {
    pub updater: Address,
    pub index: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_credits: Option<String>,
}

pub struct CourseRegistry {
    policy: Arc<AuthorizationPolicy>,
    institutions: Arc<dyn InstitutionKeeper>,
}

impl CourseRegistry {
    pub fn new(policy: Arc<AuthorizationPolicy>, institutions: Arc<dyn InstitutionKeeper>) -> Self {
        Self {
            policy,
            institutions,
        }
    }

    pub async fn create(&self, ctx: &mut Context<'_>, msg: CreateCourse) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("institution", &msg.institution)?;
        require_non_empty("name", &msg.name)?;
        require_non_empty("code", &msg.code)?;
        let total_credits = parse_credits("total_credits", &msg.total_credits)?;
        let degree_level: DegreeLevel = msg.degree_level.parse()?;

        let store = ctx.store();
        let institution = self
            .institutions
            .institution(store, &msg.institution)
            .await?
            .ok_or_else(|| RegistryError::not_found("institution", &msg.institution))?;
        self.policy.require_create_course(&msg.creator, &institution)?;

        let code_key = keys::key(COURSE_CODE, &[&msg.institution, &msg.code]);
        if store.has(&code_key).await? {
            return Err(RegistryError::Conflict(format!(
                "course code '{}' already exists in {}",
                msg.code, msg.institution
            )));
        }

        let index = COURSES.next_index(store).await?;
        let course = Course {
            index: index.clone(),
            institution: msg.institution,
            name: msg.name,
            code: msg.code,
            description: msg.description,
            total_credits,
            degree_level,
            creator: msg.creator,
            subject_count: 0,
        };
        store
            .set_record(&keys::key(COURSE_VALUE, &[&index]), &course)
            .await?;
        store.set(&code_key, index.as_bytes()).await?;
        store
            .set_marker(&keys::key(COURSE_BY_INSTITUTION, &[&course.institution, &index]))
            .await?;

        tracing::info!(index = %index, institution = %course.institution, "course created");
        ctx.emit(
            Event::new(kinds::COURSE_CREATED)
                .attr("course_index", &index)
                .attr("institution", &course.institution)
                .attr("name", &course.name)
                .attr("code", &course.code)
                .attr("degree_level", course.degree_level)
                .attr("total_credits", course.total_credits)
                .attr("creator", &course.creator),
        );
        Ok(index)
    }

    pub async fn update(&self, ctx: &mut Context<'_>, msg: UpdateCourse) -> Result<()> {
        let store = ctx.store();
        let mut course = self.require(store, &msg.index).await?;
        let institution = self
            .institutions
            .institution(store, &course.institution)
            .await?
            .ok_or_else(|| RegistryError::not_found("institution", &course.institution))?;
        self.policy
            .require_update_course(&msg.updater, &course.index, &institution)?;

        let mut changed = false;
        if let Some(name) = msg.name.filter(|n| !n.is_empty()) {
            course.name = name;
            changed = true;
        }
        if let Some(description) = msg.description.filter(|d| !d.is_empty()) {
            course.description = description;
            changed = true;
        }
        if let Some(credits) = msg.total_credits.filter(|c| !c.is_empty()) {
            course.total_credits = parse_credits("total_credits", &credits)?;
            changed = true;
        }
        if !changed {
            return Err(ValidationError::NoUpdates.into());
        }

        store
            .set_record(&keys::key(COURSE_VALUE, &[&course.index]), &course)
            .await?;

        tracing::info!(index = %course.index, "course updated");
        ctx.emit(
            Event::new(kinds::COURSE_UPDATED)
                .attr("course_index", &course.index)
                .attr("updater", &msg.updater),
        );
        Ok(())
    }

    /// Delete a course together with its code and institution indexes.
    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let course = self.require(store, index).await?;
        store
            .delete(&keys::key(COURSE_CODE, &[&course.institution, &course.code]))
            .await?;
        store
            .delete(&keys::key(COURSE_BY_INSTITUTION, &[&course.institution, index]))
            .await?;
        store.delete(&keys::key(COURSE_VALUE, &[index])).await?;
        Ok(())
    }

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<Course>> {
        Ok(store.get_record(&keys::key(COURSE_VALUE, &[index])).await?)
    }

    pub async fn require(&self, store: &dyn KvStore, index: &str) -> Result<Course> {
        self.get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("course", index))
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store.has(&keys::key(COURSE_VALUE, &[index])).await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<Course>> {
        Ok(store.records_with_prefix(COURSE_VALUE.as_bytes()).await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<Course>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    pub async fn has_course(&self, store: &dyn KvStore, institution: &str, code: &str) -> Result<bool> {
        Ok(store.has(&keys::key(COURSE_CODE, &[institution, code])).await?)
    }

    /// Courses of one institution, read through the institution index.
    pub async fn courses_by_institution(
        &self,
        store: &dyn KvStore,
        institution: &str,
        request: PageRequest,
    ) -> Result<Page<Course>> {
        let indexes = store
            .suffixes_with_prefix(&keys::scan(COURSE_BY_INSTITUTION, &[institution]))
            .await?;

        let mut courses = Vec::with_capacity(indexes.len());
        for index in indexes {
            match self.get(store, &index).await? {
                Some(course) => courses.push(course),
                None => tracing::warn!(index = %index, institution, "dangling course index entry"),
            }
        }
        Ok(Page::from_all(courses, request))
    }
}

#[async_trait]
impl CourseKeeper for CourseRegistry {
    async fn course(&self, store: &dyn KvStore, index: &str) -> Result<Option<Course>> {
        self.get(store, index).await
    }

    async fn note_subject_added(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let mut course = self.require(store, index).await?;
        course.subject_count = course.subject_count.saturating_add(1);
        store
            .set_record(&keys::key(COURSE_VALUE, &[index]), &course)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institution::{InstitutionRegistry, RegisterInstitution, UpdateInstitution};
    use academic_ledger_store::MemoryStore;
    use chrono::Utc;

    struct Setup {
        store: MemoryStore,
        institutions: Arc<InstitutionRegistry>,
        courses: CourseRegistry,
    }

    fn setup() -> Setup {
        let policy = Arc::new(AuthorizationPolicy::new(Address::new("cosmos1gov"), false));
        let institutions = Arc::new(InstitutionRegistry::new(policy.clone()));
        let courses = CourseRegistry::new(policy, institutions.clone());
        Setup {
            store: MemoryStore::new(),
            institutions,
            courses,
        }
    }

    async fn institution(s: &Setup, name: &str, authorize: bool) -> String {
        let mut ctx = Context::new(&s.store, Utc::now());
        let index = s
            .institutions
            .register(
                &mut ctx,
                RegisterInstitution {
                    creator: Address::new("cosmos1alice"),
                    name: name.into(),
                    address: format!("addr-{name}"),
                },
            )
            .await
            .unwrap();
        if authorize {
            s.institutions
                .update(
                    &mut ctx,
                    UpdateInstitution {
                        updater: Address::new("cosmos1gov"),
                        index: index.clone(),
                        is_authorized: Some("true".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        index
    }

    fn create_msg(institution: &str, code: &str) -> CreateCourse {
        CreateCourse {
            creator: Address::new("cosmos1alice"),
            institution: institution.into(),
            name: "Computer Science".into(),
            code: code.into(),
            description: "BSc".into(),
            total_credits: "240".into(),
            degree_level: "undergraduate".into(),
        }
    }

    #[tokio::test]
    async fn test_create_course() {
        let s = setup();
        let inst = institution(&s, "MIT", true).await;
        let mut ctx = Context::new(&s.store, Utc::now());

        let index = s.courses.create(&mut ctx, create_msg(&inst, "CS")).await.unwrap();
        assert_eq!(index, "course-1");

        let course = s.courses.get(&s.store, &index).await.unwrap().unwrap();
        assert_eq!(course.total_credits, 240);
        assert_eq!(course.degree_level, DegreeLevel::Undergraduate);
        assert!(s.courses.has_course(&s.store, &inst, "CS").await.unwrap());

        let event = &ctx.events()[0];
        assert_eq!(event.kind, kinds::COURSE_CREATED);
        assert_eq!(event.get("degree_level"), Some("undergraduate"));
        assert_eq!(event.get("total_credits"), Some("240"));
    }

    #[tokio::test]
    async fn test_course_before_authorization_fails() {
        let s = setup();
        let inst = institution(&s, "MIT", false).await;
        let mut ctx = Context::new(&s.store, Utc::now());

        let err = s.courses.create(&mut ctx, create_msg(&inst, "CS")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
        assert!(s.courses.get_all(&s.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_code_unique_per_institution() {
        let s = setup();
        let mit = institution(&s, "MIT", true).await;
        let usp = institution(&s, "USP", true).await;
        let mut ctx = Context::new(&s.store, Utc::now());

        s.courses.create(&mut ctx, create_msg(&mit, "CS")).await.unwrap();
        let dup = s.courses.create(&mut ctx, create_msg(&mit, "CS")).await;
        assert!(matches!(dup, Err(RegistryError::Conflict(_))));

        // Same code under another institution is fine
        s.courses.create(&mut ctx, create_msg(&usp, "CS")).await.unwrap();

        let page = s
            .courses
            .courses_by_institution(&s.store, &mit, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.page.total, 1);
        assert_eq!(page.items[0].institution, mit);
    }

    #[tokio::test]
    async fn test_invalid_credits_and_level() {
        let s = setup();
        let inst = institution(&s, "MIT", true).await;
        let mut ctx = Context::new(&s.store, Utc::now());

        for credits in ["0", "-5", "abc"] {
            let msg = CreateCourse {
                total_credits: credits.into(),
                ..create_msg(&inst, "CS")
            };
            assert!(matches!(
                s.courses.create(&mut ctx, msg).await,
                Err(RegistryError::Validation(_))
            ));
        }

        let msg = CreateCourse {
            degree_level: "bachelor".into(),
            ..create_msg(&inst, "CS")
        };
        assert!(matches!(
            s.courses.create(&mut ctx, msg).await,
            Err(RegistryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_institution() {
        let s = setup();
        let mut ctx = Context::new(&s.store, Utc::now());
        let err = s
            .courses
            .create(&mut ctx, create_msg("institution-9", "CS"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_course() {
        let s = setup();
        let inst = institution(&s, "MIT", true).await;
        let mut ctx = Context::new(&s.store, Utc::now());
        let index = s.courses.create(&mut ctx, create_msg(&inst, "CS")).await.unwrap();

        s.courses
            .update(
                &mut ctx,
                UpdateCourse {
                    updater: Address::new("cosmos1alice"),
                    index: index.clone(),
                    total_credits: Some("180".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            s.courses.get(&s.store, &index).await.unwrap().unwrap().total_credits,
            180
        );

        let denied = s
            .courses
            .update(
                &mut ctx,
                UpdateCourse {
                    updater: Address::new("cosmos1mallory"),
                    index: index.clone(),
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(denied, Err(RegistryError::Unauthorized(_))));

        let noop = s
            .courses
            .update(
                &mut ctx,
                UpdateCourse {
                    updater: Address::new("cosmos1alice"),
                    index,
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(noop, Err(RegistryError::Validation(ValidationError::NoUpdates))));
    }

    #[tokio::test]
    async fn test_remove_course_clears_indexes() {
        let s = setup();
        let inst = institution(&s, "MIT", true).await;
        let mut ctx = Context::new(&s.store, Utc::now());
        let index = s.courses.create(&mut ctx, create_msg(&inst, "CS")).await.unwrap();

        s.courses.remove(&s.store, &index).await.unwrap();
        assert!(!s.courses.exists(&s.store, &index).await.unwrap());
        assert!(!s.courses.has_course(&s.store, &inst, "CS").await.unwrap());
        let page = s
            .courses
            .courses_by_institution(&s.store, &inst, PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }
}
