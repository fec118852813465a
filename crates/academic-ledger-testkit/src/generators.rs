//! Proptest generators for property-based testing.

use proptest::prelude::*;

use academic_ledger_core::{Address, DegreeRequestStatus};

/// A well-formed account address with the `cosmos` prefix.
pub fn address() -> impl Strategy<Value = Address> {
    "[a-z0-9]{6,38}".prop_map(|data| Address::new(format!("cosmos1{data}")))
}

/// A string that is not a `cosmos` address.
pub fn malformed_address() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{2,8}1[a-z0-9]{6,20}".prop_filter("foreign prefix", |s| !s.starts_with("cosmos")),
        "cosmos1[A-Z]{6,20}",
        "cosmos1[a-z0-9]{0,2}",
    ]
}

/// A grade inside `[0, 100]`, formatted the way clients send it.
pub fn grade() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..=100).prop_map(|g| g.to_string()),
        (0u32..10_000).prop_map(|g| format!("{:.2}", f64::from(g) / 100.0)),
    ]
}

/// A grade outside `[0, 100]`.
pub fn out_of_range_grade() -> impl Strategy<Value = String> {
    prop_oneof![
        (101u32..100_000).prop_map(|g| g.to_string()),
        (1u32..100_000).prop_map(|g| format!("-{g}")),
        (1u32..100).prop_map(|frac| format!("100.{frac:02}")),
    ]
}

/// A GPA inside `(0, 4.0]`, formatted to two decimals.
pub fn gpa() -> impl Strategy<Value = String> {
    (1u32..=400).prop_map(|g| format!("{:.2}", f64::from(g) / 100.0))
}

/// A calendar date `YYYY-MM-DD`.
pub fn date() -> impl Strategy<Value = String> {
    (1990i32..=2040, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// A semester label such as `2023-2`.
pub fn semester() -> impl Strategy<Value = String> {
    (2000u32..=2040, 1u32..=2).prop_map(|(y, s)| format!("{y}-{s}"))
}

/// A human-readable name.
pub fn name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,12}( [A-Z][a-z]{2,12}){0,3}".prop_map(String::from)
}

pub fn request_status() -> impl Strategy<Value = DegreeRequestStatus> {
    proptest::sample::select(DegreeRequestStatus::ALL.to_vec())
}

/// Parameters for minting a subject token.
#[derive(Debug, Clone)]
pub struct MintParams {
    pub student: Address,
    pub grade: String,
    pub completion_date: String,
    pub semester: String,
}

impl Arbitrary for MintParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (address(), grade(), date(), semester())
            .prop_map(|(student, grade, completion_date, semester)| MintParams {
                student,
                grade,
                completion_date,
                semester,
            })
            .boxed()
    }
}
