//! Key layout.
//!
//! Every keyspace is `<Entity>/<kind>/` followed by `/`-separated parts.
//! Primary records hold CBOR, unique indexes hold the owning index and
//! marker indexes hold [`INDEX_MARKER`](academic_ledger_store::INDEX_MARKER).

use academic_ledger_store::Counter;

pub const INSTITUTION_VALUE: &str = "Institution/value/";
pub const INSTITUTION_NAME: &str = "Institution/name/";
pub const INSTITUTION_ADDRESS: &str = "Institution/address/";

pub const COURSE_VALUE: &str = "Course/value/";
pub const COURSE_CODE: &str = "Course/code/";
pub const COURSE_BY_INSTITUTION: &str = "Course/institution/";

pub const SUBJECT_VALUE: &str = "Subject/value/";

pub const STUDENT_VALUE: &str = "Student/value/";
pub const STUDENT_ADDRESS: &str = "Student/address/";

pub const CURRICULUM_VALUE: &str = "CurriculumTree/value/";
pub const CURRICULUM_VERSION: &str = "CurriculumTree/version/";

pub const TOKEN_DEF_VALUE: &str = "TokenDefinition/value/";
pub const TOKEN_DEF_BY_SUBJECT: &str = "TokenDefinition/subject/";
pub const TOKEN_DEF_BY_COURSE: &str = "TokenDefinition/course/";
pub const TOKEN_DEF_BY_INSTITUTION: &str = "TokenDefinition/institution/";

pub const TOKEN_INSTANCE_VALUE: &str = "TokenInstance/value/";
pub const TOKEN_INSTANCE_BY_STUDENT: &str = "TokenInstance/student/";
pub const TOKEN_INSTANCE_BY_TOKEN_DEF: &str = "TokenInstance/tokendef/";

pub const INSTITUTIONS: Counter = Counter::new("Institution/count/", "institution");
pub const COURSES: Counter = Counter::new("Course/count/", "course");
pub const SUBJECTS: Counter = Counter::new("Subject/count/", "subject");
pub const STUDENTS: Counter = Counter::new("Student/count/", "student");
pub const CURRICULA: Counter = Counter::new("CurriculumTree/count/", "curriculum");
pub const TOKEN_DEFINITIONS: Counter = Counter::new("TokenDefinition/count/", "tokendef");
pub const TOKEN_INSTANCES: Counter = Counter::new("TokenInstance/count/", "token-instance");

/// `prefix` followed by `parts` joined with `/`.
pub fn key(prefix: &str, parts: &[&str]) -> Vec<u8> {
    let mut out = String::with_capacity(prefix.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>());
    out.push_str(prefix);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(part);
    }
    out.into_bytes()
}

/// Scan prefix for every entry under `parts`, ending in `/`.
pub fn scan(prefix: &str, parts: &[&str]) -> Vec<u8> {
    let mut out = key(prefix, parts);
    out.push(b'/');
    out
}
