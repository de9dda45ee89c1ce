//! Property-based tests for clock monotonicity and ledger ordering.

use crashkit_timing::prelude::*;
use crashkit_timing::ManualTickSource;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #[test]
    fn test_clock_never_decreases_across_wraps(
        start in any::<u32>(),
        steps in prop::collection::vec(0u32..=u32::MAX / 2, 1..200),
    ) {
        let source = Arc::new(ManualTickSource::new(start));
        let clock = MonotonicClock::new(Arc::clone(&source));

        let mut last = clock.now();
        for step in steps {
            source.advance(step);
            let now = clock.now();
            prop_assert!(now >= last);
            prop_assert_eq!(now - last, i64::from(step));
            last = now;
        }
    }

    #[test]
    fn test_next_offset_is_minimum_of_enabled(
        timeouts in prop::collection::vec(0u64..10_000, 1..50),
    ) {
        let clock = VirtualClock::shared(0);
        let mut ledger = TimerLedger::new(clock.clone());

        for (i, timeout) in timeouts.iter().enumerate() {
            let name = format!("t{i}");
            prop_assert!(ledger.add(&name, Timeout::Millis(*timeout)).is_ok());
        }

        let min = timeouts.iter().copied().min().unwrap_or(0);
        prop_assert_eq!(ledger.next_expiry_offset(), Timeout::Millis(min));
        prop_assert_eq!(ledger.active_count(), timeouts.len());
    }

    #[test]
    fn test_expunge_reports_each_due_entry_once_in_order(
        timeouts in prop::collection::vec(0u64..1_000, 1..50),
        advance in 0u64..1_000,
    ) {
        let clock = VirtualClock::shared(0);
        let mut ledger = TimerLedger::new(clock.clone());
        for (i, timeout) in timeouts.iter().enumerate() {
            let name = format!("t{i}");
            prop_assert!(ledger.add(&name, Timeout::Millis(*timeout)).is_ok());
        }

        clock.advance(advance);
        let expired = ledger.expunge_expired();

        let mut expected: Vec<(u64, usize)> = timeouts
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, t)| *t <= advance)
            .map(|(i, t)| (t, i))
            .collect();
        expected.sort_unstable();
        let expected: Vec<String> = expected.into_iter().map(|(_, i)| format!("t{i}")).collect();

        prop_assert_eq!(&expired, &expected);
        prop_assert!(ledger.expunge_expired().is_empty());
        prop_assert_eq!(ledger.total_count(), timeouts.len());
        prop_assert_eq!(ledger.active_count(), timeouts.len() - expected.len());
    }
}
