//! Property-based tests for monitor invariants.

use crashkit_watchdog::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Register(u8, u16, u16),
    Ping(u8),
    Unregister(u8),
    Advance(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 1u16..500, 1u16..1000).prop_map(|(n, w, c)| Op::Register(n, w, c)),
        (0u8..6).prop_map(Op::Ping),
        (0u8..6).prop_map(Op::Unregister),
        (0u16..400).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn test_next_offset_is_min_of_tiers(ops in prop::collection::vec(op(), 1..100)) {
        let clock = VirtualClock::shared(0);
        let monitor = WatchdogMonitor::new(clock.clone(), WatchdogConfig::default());
        monitor.set_warning_handler(|_| {});
        monitor.set_critical_handler(|_| {});

        for op in ops {
            match op {
                Op::Register(n, w, c) => {
                    let name = format!("t{n}");
                    let was = monitor.is_registered(&name);
                    let registered = monitor.register(
                        &name,
                        Timeout::Millis(u64::from(w)),
                        Timeout::Millis(u64::from(c)),
                    );
                    prop_assert_eq!(registered, !was);
                }
                Op::Ping(n) => {
                    let name = format!("t{n}");
                    prop_assert_eq!(monitor.ping(&name), monitor.is_registered(&name));
                }
                Op::Unregister(n) => {
                    let name = format!("t{n}");
                    let was = monitor.is_registered(&name);
                    prop_assert_eq!(monitor.unregister(&name), was);
                }
                Op::Advance(ms) => {
                    clock.advance(u64::from(ms));
                    monitor.poll();
                }
            }

            let expected = monitor.warning_offset().min(monitor.critical_offset());
            prop_assert_eq!(monitor.next_expiry_offset(), expected);

            let deadline = expected
                .as_millis()
                .map(|ms| clock.now() + i64::try_from(ms).unwrap_or(i64::MAX));
            prop_assert_eq!(monitor.alarm_deadline().is_some(), deadline.is_some());
        }
    }
}
