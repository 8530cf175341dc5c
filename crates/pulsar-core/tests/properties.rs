//! Property-based tests for pulsar-core debouncing.
//!
//! Feeds randomized bounce trains through the debouncer and checks the
//! at-most-one-change guarantee and the eventual-settling guarantee.

use proptest::prelude::*;
use pulsar_core::{DEFAULT_SETTLING_US, Debouncer, Edge, EdgeLatch};

/// Strategy producing a raw edge (rising, falling or none).
fn edge() -> impl Strategy<Value = Edge> {
    prop_oneof![Just(Edge::Rising), Just(Edge::Falling), Just(Edge::None)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any bounce train confined to one settling window reports at most one
    /// change, no matter how many raw edges it contains.
    #[test]
    fn debounce_single_change_per_window(
        start in 0u64..1_000_000u64,
        steps in prop::collection::vec((1u64..400u64, edge()), 1..64),
    ) {
        let debouncer = Debouncer::new();
        let mut t = start;
        let mut first_change: Option<u64> = None;
        let mut changes_in_window = 0;

        for (dt, e) in steps {
            t += dt;
            let step = debouncer.process(e, t);
            if step.changed {
                let origin = *first_change.get_or_insert(t);
                if t - origin < u64::from(DEFAULT_SETTLING_US) {
                    changes_in_window += 1;
                }
            }
        }
        prop_assert!(changes_in_window <= 1, "{} changes inside one window", changes_in_window);
    }

    /// After a quiet period longer than the settling time, the debounced
    /// output follows the last raw level.
    #[test]
    fn debounce_follows_level_after_quiet(
        levels in prop::collection::vec(any::<bool>(), 1..32),
        spacing in 1u64..300u64,
    ) {
        let debouncer = Debouncer::new();
        let mut t = 0;
        for &level in &levels {
            t += spacing;
            debouncer.process(Edge::from_level(level), t);
        }
        let last = *levels.last().unwrap();
        t += u64::from(DEFAULT_SETTLING_US);
        debouncer.process(Edge::from_level(last), t);
        t += u64::from(DEFAULT_SETTLING_US);
        prop_assert_eq!(debouncer.process(Edge::from_level(last), t).high, last);
    }

    /// However many same-direction transitions land between two takes, the
    /// latch reports one `true` and then `false`.
    #[test]
    fn latch_coalesces(count in 1usize..50) {
        let latch = EdgeLatch::new();
        for _ in 0..count {
            latch.record(true);
        }
        prop_assert!(latch.take_on());
        prop_assert!(!latch.take_on());
    }
}
