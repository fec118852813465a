//! Property tests over message sequences.

mod common;

use std::collections::HashSet;

use academic_ledger::{ErrorKind, LedgerConfig};
use common::*;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Accepted registrations get consecutive ids; rejected ones consume
    /// nothing.
    #[test]
    fn prop_ids_are_dense_and_names_unique(names in prop::collection::vec("[a-d]{1,2}", 1..20)) {
        let (ids, rejected) = runtime().block_on(async {
            let h = harness(LedgerConfig::default());
            let mut ids = Vec::new();
            let mut rejected = Vec::new();
            for (i, name) in names.iter().enumerate() {
                match h.ledger.execute(register_institution(name, &format!("addr-{i}"))).await {
                    Ok(executed) => ids.push(executed.response.created_index().unwrap().to_string()),
                    Err(e) => rejected.push(e.kind()),
                }
            }
            (ids, rejected)
        });

        let distinct: HashSet<_> = names.iter().collect();
        prop_assert_eq!(ids.len(), distinct.len());
        prop_assert!(rejected.iter().all(|k| *k == ErrorKind::Conflict));
        for (n, id) in ids.iter().enumerate() {
            prop_assert_eq!(id, &format!("institution-{}", n + 1));
        }
    }
}
