//! The message set accepted by [`Ledger::execute`](crate::Ledger::execute).

use academic_ledger_core::Address;
use academic_ledger_degree::{
    CancelDegreeRequest, ContractUpdated, DegreeIssued, DegreeRequested, IssueDegree,
    RequestDegree, UpdateDegreeContract, ValidateDegreeRequirements, ValidationStatus,
};
use academic_ledger_registry::{
    AddElectiveGroup, AddSemester, CreateCourse, CreateCurriculum, CreateSubject,
    CreateTokenDefinition, MintSubjectToken, RegisterInstitution, RegisterStudent,
    SetGraduationRequirements, TokenVerification, UpdateCourse, UpdateInstitution,
    UpdateTokenDefinition,
};
use serde::{Deserialize, Serialize};

/// Ask for a token instance to be verified on the record, leaving a
/// `token_instance_verified` event behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyTokenInstance {
    pub creator: Address,
    pub token_instance_id: String,
}

/// Every state-changing message.
///
/// Serialized as `{"type": "<name>", "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Msg {
    RegisterInstitution(RegisterInstitution),
    UpdateInstitution(UpdateInstitution),
    CreateCourse(CreateCourse),
    UpdateCourse(UpdateCourse),
    CreateSubject(CreateSubject),
    RegisterStudent(RegisterStudent),
    CreateCurriculum(CreateCurriculum),
    AddSemester(AddSemester),
    AddElectiveGroup(AddElectiveGroup),
    SetGraduationRequirements(SetGraduationRequirements),
    CreateTokenDefinition(CreateTokenDefinition),
    UpdateTokenDefinition(UpdateTokenDefinition),
    MintSubjectToken(MintSubjectToken),
    VerifyTokenInstance(VerifyTokenInstance),
    RequestDegree(RequestDegree),
    ValidateDegreeRequirements(ValidateDegreeRequirements),
    IssueDegree(IssueDegree),
    CancelDegreeRequest(CancelDegreeRequest),
    UpdateDegreeContract(UpdateDegreeContract),
}

impl Msg {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterInstitution(_) => "register_institution",
            Self::UpdateInstitution(_) => "update_institution",
            Self::CreateCourse(_) => "create_course",
            Self::UpdateCourse(_) => "update_course",
            Self::CreateSubject(_) => "create_subject",
            Self::RegisterStudent(_) => "register_student",
            Self::CreateCurriculum(_) => "create_curriculum",
            Self::AddSemester(_) => "add_semester",
            Self::AddElectiveGroup(_) => "add_elective_group",
            Self::SetGraduationRequirements(_) => "set_graduation_requirements",
            Self::CreateTokenDefinition(_) => "create_token_definition",
            Self::UpdateTokenDefinition(_) => "update_token_definition",
            Self::MintSubjectToken(_) => "mint_subject_token",
            Self::VerifyTokenInstance(_) => "verify_token_instance",
            Self::RequestDegree(_) => "request_degree",
            Self::ValidateDegreeRequirements(_) => "validate_degree_requirements",
            Self::IssueDegree(_) => "issue_degree",
            Self::CancelDegreeRequest(_) => "cancel_degree_request",
            Self::UpdateDegreeContract(_) => "update_degree_contract",
        }
    }

    /// The account that signed the message.
    pub fn signer(&self) -> &Address {
        match self {
            Self::RegisterInstitution(m) => &m.creator,
            Self::UpdateInstitution(m) => &m.updater,
            Self::CreateCourse(m) => &m.creator,
            Self::UpdateCourse(m) => &m.updater,
            Self::CreateSubject(m) => &m.creator,
            Self::RegisterStudent(m) => &m.creator,
            Self::CreateCurriculum(m) => &m.creator,
            Self::AddSemester(m) => &m.creator,
            Self::AddElectiveGroup(m) => &m.creator,
            Self::SetGraduationRequirements(m) => &m.creator,
            Self::CreateTokenDefinition(m) => &m.creator,
            Self::UpdateTokenDefinition(m) => &m.updater,
            Self::MintSubjectToken(m) => &m.creator,
            Self::VerifyTokenInstance(m) => &m.creator,
            Self::RequestDegree(m) => &m.creator,
            Self::ValidateDegreeRequirements(m) => &m.creator,
            Self::IssueDegree(m) => &m.creator,
            Self::CancelDegreeRequest(m) => &m.creator,
            Self::UpdateDegreeContract(m) => &m.authority,
        }
    }
}

/// What a successful message returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MsgResponse {
    /// Index of a newly created record (`course-3`, `tokendef-1`, ...).
    Created(String),
    Updated,
    Verification(TokenVerification),
    DegreeRequested(DegreeRequested),
    Validation(ValidationStatus),
    DegreeIssued(DegreeIssued),
    ContractUpdated(ContractUpdated),
}

impl MsgResponse {
    pub fn created_index(&self) -> Option<&str> {
        match self {
            Self::Created(index) => Some(index),
            _ => None,
        }
    }
}
