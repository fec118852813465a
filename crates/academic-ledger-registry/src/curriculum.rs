//! Curriculum trees.
//!
//! A curriculum is built incrementally: created with its subject lists,
//! then semesters and elective groups are appended, then graduation
//! requirements are set. Every subject id it references must exist.

use std::sync::Arc;

use academic_ledger_core::event::kinds;
use academic_ledger_core::validation::{check_gpa, require_non_empty, require_positive};
use academic_ledger_core::{
    Address, Course, CurriculumTree, ElectiveGroup, Event, GraduationRequirements, Semester,
    ValidationError,
};
use academic_ledger_perms::AuthorizationPolicy;
use academic_ledger_store::{Context, KvStore, StoreExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::keys::{self, CURRICULA, CURRICULUM_VALUE, CURRICULUM_VERSION};
use crate::pagination::{Page, PageRequest};
use crate::traits::{CourseKeeper, CurriculumKeeper, InstitutionKeeper, SubjectKeeper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCurriculum {
    pub creator: Address,
    pub course_id: String,
    pub version: String,
    pub elective_min: u32,
    pub total_workload_hours: u64,
    pub required_subjects: Vec<String>,
    pub elective_subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSemester {
    pub creator: Address,
    pub curriculum_index: String,
    pub semester_number: u32,
    pub subject_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddElectiveGroup {
    pub creator: Address,
    pub curriculum_index: String,
    pub name: String,
    pub description: String,
    pub subject_ids: Vec<String>,
    pub min_subjects_required: u32,
    pub credits_required: u64,
    pub knowledge_area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetGraduationRequirements {
    pub creator: Address,
    pub curriculum_index: String,
    pub requirements: GraduationRequirements,
}

pub struct CurriculumRegistry {
    policy: Arc<AuthorizationPolicy>,
    institutions: Arc<dyn InstitutionKeeper>,
    courses: Arc<dyn CourseKeeper>,
    subjects: Arc<dyn SubjectKeeper>,
}

impl CurriculumRegistry {
    pub fn new(
        policy: Arc<AuthorizationPolicy>,
        institutions: Arc<dyn InstitutionKeeper>,
        courses: Arc<dyn CourseKeeper>,
        subjects: Arc<dyn SubjectKeeper>,
    ) -> Self {
        Self {
            policy,
            institutions,
            courses,
            subjects,
        }
    }

    pub async fn create(&self, ctx: &mut Context<'_>, msg: CreateCurriculum) -> Result<String> {
        require_non_empty("creator", msg.creator.as_str())?;
        require_non_empty("course_id", &msg.course_id)?;
        require_non_empty("version", &msg.version)?;
        require_positive("elective_min", u64::from(msg.elective_min))?;
        require_positive("total_workload_hours", msg.total_workload_hours)?;

        let store = ctx.store();
        let course = self.authorize(store, &msg.creator, &msg.course_id).await?;

        let version_key = keys::key(CURRICULUM_VERSION, &[&course.index, &msg.version]);
        if store.has(&version_key).await? {
            return Err(RegistryError::Conflict(format!(
                "curriculum version '{}' already exists for {}",
                msg.version, course.index
            )));
        }
        self.ensure_subjects(store, &msg.required_subjects).await?;
        self.ensure_subjects(store, &msg.elective_subjects).await?;

        let index = CURRICULA.next_index(store).await?;
        let tree = CurriculumTree {
            index: index.clone(),
            course_id: msg.course_id,
            version: msg.version,
            elective_min: msg.elective_min,
            total_workload_hours: msg.total_workload_hours,
            required_subjects: msg.required_subjects,
            elective_subjects: msg.elective_subjects,
            semester_structure: Vec::new(),
            elective_groups: Vec::new(),
            graduation_requirements: None,
            creator: msg.creator,
        };
        self.write(store, &tree).await?;
        store.set(&version_key, index.as_bytes()).await?;

        tracing::info!(index = %index, course = %tree.course_id, version = %tree.version, "curriculum created");
        ctx.emit(
            Event::new(kinds::CURRICULUM_TREE_CREATED)
                .attr("curriculum_index", &index)
                .attr("course_id", &tree.course_id)
                .attr("version", &tree.version)
                .attr("creator", &tree.creator),
        );
        Ok(index)
    }

    pub async fn add_semester(&self, ctx: &mut Context<'_>, msg: AddSemester) -> Result<()> {
        if msg.semester_number == 0 {
            return Err(ValidationError::out_of_range("semester_number", "must be greater than 0").into());
        }

        let store = ctx.store();
        let mut tree = self.require(store, &msg.curriculum_index).await?;
        self.authorize(store, &msg.creator, &tree.course_id).await?;

        if tree.has_semester(msg.semester_number) {
            return Err(RegistryError::Conflict(format!(
                "semester {} already exists in {}",
                msg.semester_number, tree.index
            )));
        }
        self.ensure_subjects(store, &msg.subject_ids).await?;

        let subject_count = msg.subject_ids.len();
        tree.semester_structure.push(Semester {
            semester_number: msg.semester_number,
            subject_ids: msg.subject_ids,
        });
        self.write(store, &tree).await?;

        ctx.emit(
            Event::new(kinds::SEMESTER_ADDED)
                .attr("curriculum_index", &tree.index)
                .attr("semester_number", msg.semester_number)
                .attr("subject_count", subject_count),
        );
        Ok(())
    }

    pub async fn add_elective_group(&self, ctx: &mut Context<'_>, msg: AddElectiveGroup) -> Result<String> {
        require_non_empty("name", &msg.name)?;
        require_positive("min_subjects_required", u64::from(msg.min_subjects_required))?;
        require_positive("credits_required", msg.credits_required)?;

        let store = ctx.store();
        let mut tree = self.require(store, &msg.curriculum_index).await?;
        self.authorize(store, &msg.creator, &tree.course_id).await?;

        if tree.has_elective_group(&msg.name) {
            return Err(RegistryError::Conflict(format!(
                "elective group '{}' already exists in {}",
                msg.name, tree.index
            )));
        }
        self.ensure_subjects(store, &msg.subject_ids).await?;

        let group_id = format!("{}-{}", tree.index, msg.name);
        let event = Event::new(kinds::ELECTIVE_GROUP_ADDED)
            .attr("curriculum_index", &tree.index)
            .attr("group_id", &group_id)
            .attr("group_name", &msg.name);
        tree.elective_groups.push(ElectiveGroup {
            group_id: group_id.clone(),
            name: msg.name,
            description: msg.description,
            subject_ids: msg.subject_ids,
            min_subjects_required: msg.min_subjects_required,
            credits_required: msg.credits_required,
            knowledge_area: msg.knowledge_area,
        });
        self.write(store, &tree).await?;

        ctx.emit(event);
        Ok(group_id)
    }

    /// Replaces any previously set requirements.
    pub async fn set_graduation_requirements(
        &self,
        ctx: &mut Context<'_>,
        msg: SetGraduationRequirements,
    ) -> Result<()> {
        let reqs = msg.requirements;
        require_positive("total_credits_required", reqs.total_credits_required)?;
        check_gpa("min_gpa", reqs.min_gpa)?;
        require_positive("minimum_time_years", u64::from(reqs.minimum_time_years))?;
        if reqs.maximum_time_years <= reqs.minimum_time_years {
            return Err(ValidationError::out_of_range(
                "maximum_time_years",
                "must be greater than minimum_time_years",
            )
            .into());
        }

        let store = ctx.store();
        let mut tree = self.require(store, &msg.curriculum_index).await?;
        self.authorize(store, &msg.creator, &tree.course_id).await?;

        let event = Event::new(kinds::GRADUATION_REQUIREMENTS_SET)
            .attr("curriculum_index", &tree.index)
            .attr("total_credits_required", reqs.total_credits_required)
            .attr("min_gpa", reqs.min_gpa);
        tree.graduation_requirements = Some(reqs);
        self.write(store, &tree).await?;

        ctx.emit(event);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub async fn get(&self, store: &dyn KvStore, index: &str) -> Result<Option<CurriculumTree>> {
        Ok(store.get_record(&keys::key(CURRICULUM_VALUE, &[index])).await?)
    }

    pub async fn require(&self, store: &dyn KvStore, index: &str) -> Result<CurriculumTree> {
        self.get(store, index)
            .await?
            .ok_or_else(|| RegistryError::not_found("curriculum", index))
    }

    pub async fn exists(&self, store: &dyn KvStore, index: &str) -> Result<bool> {
        Ok(store.has(&keys::key(CURRICULUM_VALUE, &[index])).await?)
    }

    pub async fn get_all(&self, store: &dyn KvStore) -> Result<Vec<CurriculumTree>> {
        Ok(store.records_with_prefix(CURRICULUM_VALUE.as_bytes()).await?)
    }

    pub async fn list(&self, store: &dyn KvStore, request: PageRequest) -> Result<Page<CurriculumTree>> {
        Ok(Page::from_all(self.get_all(store).await?, request))
    }

    pub async fn curricula_by_course(
        &self,
        store: &dyn KvStore,
        course_id: &str,
        request: PageRequest,
    ) -> Result<Page<CurriculumTree>> {
        let mut all = self.get_all(store).await?;
        all.retain(|t| t.course_id == course_id);
        Ok(Page::from_all(all, request))
    }

    pub async fn remove(&self, store: &dyn KvStore, index: &str) -> Result<()> {
        let tree = self.require(store, index).await?;
        store
            .delete(&keys::key(CURRICULUM_VERSION, &[&tree.course_id, &tree.version]))
            .await?;
        store.delete(&keys::key(CURRICULUM_VALUE, &[index])).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve the course and check the actor may manage its curricula.
    async fn authorize(&self, store: &dyn KvStore, actor: &Address, course_id: &str) -> Result<Course> {
        let course = self
            .courses
            .course(store, course_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("course", course_id))?;
        let institution = self
            .institutions
            .institution(store, &course.institution)
            .await?
            .ok_or_else(|| RegistryError::not_found("institution", &course.institution))?;
        self.policy
            .require_manage_curriculum(actor, &course.index, &institution)?;
        Ok(course)
    }

    async fn ensure_subjects(&self, store: &dyn KvStore, ids: &[String]) -> Result<()> {
        for id in ids {
            if self.subjects.subject(store, id).await?.is_none() {
                return Err(RegistryError::not_found("subject", id));
            }
        }
        Ok(())
    }

    async fn write(&self, store: &dyn KvStore, tree: &CurriculumTree) -> Result<()> {
        store
            .set_record(&keys::key(CURRICULUM_VALUE, &[&tree.index]), tree)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CurriculumKeeper for CurriculumRegistry {
    async fn curriculum(&self, store: &dyn KvStore, index: &str) -> Result<Option<CurriculumTree>> {
        self.get(store, index).await
    }
}
