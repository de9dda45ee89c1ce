//! Property-based tests for buffer cardinality and minimum guarantees.

use crashkit_logbuffer::prelude::*;
use proptest::prelude::*;

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_enumeration_matches_adds_below_capacity(
        severities in prop::collection::vec(severity_strategy(), 0..60),
    ) {
        let mut buffer = PriorityLogBuffer::with_limits([10; Severity::COUNT], 60);
        for (clock, severity) in (0i64..).zip(severities.iter().copied()) {
            prop_assert_eq!(buffer.add(LogEntry::new(clock, severity, "x")), AddOutcome::Appended);
        }

        prop_assert_eq!(buffer.len(), severities.len());
        prop_assert_eq!(buffer.iter().len(), severities.len());
        let mut clocks: Vec<i64> = buffer.iter().map(LogEntry::clock).collect();
        clocks.sort_unstable();
        let expected: Vec<i64> = (0i64..).take(severities.len()).collect();
        prop_assert_eq!(clocks, expected);
    }

    #[test]
    fn test_enumeration_equals_capacity_once_full(
        minimum in 0usize..5,
        extra in 0usize..20,
        severities in prop::collection::vec(severity_strategy(), 1..300),
        by_clock in any::<bool>(),
    ) {
        let total = minimum * Severity::COUNT + extra;
        let merge_key = if by_clock { MergeKey::Clock } else { MergeKey::Timestamp };
        let mut buffer = PriorityLogBuffer::with_limits([minimum; Severity::COUNT], total)
            .with_merge_key(merge_key);

        let mut stored = 0usize;
        for (clock, severity) in (0i64..).zip(severities.iter().copied()) {
            match buffer.add(LogEntry::new(clock, severity, "x")) {
                AddOutcome::Appended => stored += 1,
                AddOutcome::Evicted(_) | AddOutcome::Dropped => {}
            }
        }

        prop_assert_eq!(buffer.len(), stored);
        prop_assert!(buffer.len() <= buffer.total_capacity());
        if severities.len() >= total {
            prop_assert_eq!(buffer.len(), total);
        }

        let mut clocks: Vec<i64> = buffer.iter().map(LogEntry::clock).collect();
        prop_assert_eq!(clocks.len(), buffer.len());
        clocks.sort_unstable();
        clocks.dedup();
        prop_assert_eq!(clocks.len(), buffer.len());
    }

    #[test]
    fn test_bucket_never_evicted_below_minimum_by_others(
        severities in prop::collection::vec(severity_strategy(), 0..200),
    ) {
        let minimum = 3usize;
        let mut buffer = PriorityLogBuffer::with_limits([minimum; Severity::COUNT], 21);
        let mut added = [0usize; Severity::COUNT];

        for (clock, severity) in (0i64..).zip(severities.iter().copied()) {
            let before = buffer.bucket_len(severity);
            buffer.add(LogEntry::new(clock, severity, "x"));
            if let Some(count) = added.get_mut(severity.index()) {
                *count += 1;
            }
            prop_assert!(buffer.bucket_len(severity) >= before.min(minimum));
        }

        for severity in Severity::ALL {
            let seen = added.get(severity.index()).copied().unwrap_or(0);
            prop_assert!(buffer.bucket_len(severity) >= seen.min(minimum));
        }
    }
}
