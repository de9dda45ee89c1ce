//! Concurrency tests for the watchdog monitor.

use crashkit_watchdog::prelude::*;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn system_clock() -> SharedClock {
    Arc::new(MonotonicClock::system())
}

#[test]
fn test_concurrent_registration() {
    let monitor = Arc::new(WatchdogMonitor::new(
        system_clock(),
        WatchdogConfig::default(),
    ));
    let mut handles = vec![];

    for i in 0..10 {
        let monitor = Arc::clone(&monitor);
        handles.push(thread::spawn(move || {
            let name = format!("task_{i}");
            assert!(monitor.register(&name, Timeout::Infinite, Timeout::Infinite));
            assert!(monitor.ping(&name));
        }));
    }

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    assert_eq!(monitor.task_count(), 10);
}

#[test]
fn test_racing_duplicate_registration_admits_one() {
    let monitor = Arc::new(WatchdogMonitor::new(
        system_clock(),
        WatchdogConfig::default(),
    ));
    let mut handles = vec![];

    for _ in 0..8 {
        let monitor = Arc::clone(&monitor);
        handles.push(thread::spawn(move || {
            monitor.register("shared", Timeout::Infinite, Timeout::Infinite)
        }));
    }

    let winners = handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .filter(|registered| *registered)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(monitor.task_count(), 1);
}

#[test]
fn test_spawned_monitor_fires_warning() -> TestResult {
    let monitor = WatchdogMonitor::spawn(system_clock(), WatchdogConfig::default())?;
    let (tx, rx) = mpsc::channel();
    let tx = parking_lot::Mutex::new(tx);
    monitor.set_warning_handler(move |report| {
        let names: Vec<String> = report.task_names().map(str::to_owned).collect();
        let _sent = tx.lock().send(names);
    });
    monitor.set_critical_handler(|_| {});

    assert!(monitor.register("sleepy", Timeout::Millis(20), Timeout::Infinite));

    let names = rx.recv_timeout(Duration::from_secs(5))?;
    assert_eq!(names, vec!["sleepy".to_string()]);
    assert_eq!(monitor.status("sleepy"), Some(TaskStatus::Warned));
    Ok(())
}

#[test]
fn test_steady_pings_prevent_alarms() -> TestResult {
    let monitor = WatchdogMonitor::spawn(system_clock(), WatchdogConfig::default())?;
    let (tx, rx) = mpsc::channel::<StallLevel>();
    let tx = parking_lot::Mutex::new(tx);
    monitor.subscribe(move |event| {
        let _sent = tx.lock().send(event.level);
    });
    monitor.set_critical_handler(|_| {});

    assert!(monitor.register("busy", Timeout::Millis(500), Timeout::Millis(2_000)));

    let pinger = {
        let monitor = Arc::clone(&monitor);
        thread::spawn(move || {
            for _ in 0..20 {
                assert!(monitor.ping("busy"));
                thread::sleep(Duration::from_millis(10));
            }
        })
    };
    assert!(pinger.join().is_ok(), "Pinger should not panic");

    assert!(rx.try_recv().is_err());
    assert!(monitor.unregister("busy"));
    Ok(())
}

#[test]
fn test_dropping_spawned_monitor_stops_driver() -> TestResult {
    let monitor = WatchdogMonitor::spawn(system_clock(), WatchdogConfig::default())?;
    let (tx, rx) = mpsc::channel::<StallLevel>();
    let tx = parking_lot::Mutex::new(tx);
    monitor.subscribe(move |event| {
        let _sent = tx.lock().send(event.level);
    });
    monitor.set_critical_handler(|_| {});
    assert!(monitor.register("short", Timeout::Millis(50), Timeout::Millis(100)));

    let weak = Arc::downgrade(&monitor);
    drop(monitor);
    assert!(weak.upgrade().is_none(), "driver must not keep the monitor alive");

    // The listener went away with the monitor without ever being called.
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(300)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));
    Ok(())
}
