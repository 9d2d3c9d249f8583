//! Property-based tests for checkpoint set invariants.
//!
//! Uses deterministic, in-memory testing without external dependencies.

use std::{collections::HashSet, sync::Arc};

use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use racetrack_core::{storage::mock::MockRaceStorage, Checkpoints, RaceId, RaceService};

/// Deterministic property test configuration for CI stability.
fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        failure_persistence: None,
        source_file: None,
        ..ProptestConfig::default()
    }
}

/// Checkpoint identifiers drawn from a small alphabet so repeats are common.
fn checkpoint_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("CP[0-9]{1,2}").unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

proptest! {
    #![proptest_config(proptest_config())]

    /// A checkpoint set never holds the same identifier twice.
    #[test]
    fn checkpoint_set_has_no_duplicates(
        submitted in prop::collection::vec(checkpoint_strategy(), 0..64)
    ) {
        let checkpoints: Checkpoints = submitted.iter().cloned().collect();

        let unique: HashSet<&str> = checkpoints.iter().collect();
        prop_assert_eq!(unique.len(), checkpoints.len());

        let distinct_submitted: HashSet<&String> = submitted.iter().collect();
        prop_assert_eq!(checkpoints.len(), distinct_submitted.len());
    }

    /// The set keeps the order in which each checkpoint was first seen.
    #[test]
    fn checkpoint_set_preserves_first_seen_order(
        submitted in prop::collection::vec(checkpoint_strategy(), 0..64)
    ) {
        let checkpoints: Checkpoints = submitted.iter().cloned().collect();

        let mut seen = HashSet::new();
        let expected: Vec<&str> =
            submitted.iter().map(String::as_str).filter(|c| seen.insert(*c)).collect();
        prop_assert_eq!(checkpoints.iter().collect::<Vec<_>>(), expected);
    }

    /// Recording every checkpoint twice yields the same race as recording once.
    #[test]
    fn recording_is_idempotent(
        submitted in prop::collection::vec(checkpoint_strategy(), 1..32)
    ) {
        let (once, twice) = runtime().block_on(async {
            let id = RaceId::from("R1");

            let single = RaceService::new(Arc::new(MockRaceStorage::new()));
            single.create_race(&id).await.unwrap();
            for checkpoint in &submitted {
                single.record_checkpoint(&id, checkpoint).await.unwrap();
            }

            let double = RaceService::new(Arc::new(MockRaceStorage::new()));
            double.create_race(&id).await.unwrap();
            for checkpoint in &submitted {
                double.record_checkpoint(&id, checkpoint).await.unwrap();
                double.record_checkpoint(&id, checkpoint).await.unwrap();
            }

            (
                single.get_or_placeholder(&id).await.unwrap(),
                double.get_or_placeholder(&id).await.unwrap(),
            )
        });

        prop_assert_eq!(once, twice);
    }
}
