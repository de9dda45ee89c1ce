//! Integration tests for the priority log buffer and its dump export.

use chrono::{TimeZone, Utc};
use crashkit_logbuffer::prelude::*;
use crashkit_logbuffer::{DumpValue, LOG_HEADER, LOG_TABLE};
use crashkit_timing::VirtualClock;
use insta::assert_snapshot;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn uniform(minimum: usize, total: usize) -> PriorityLogBuffer {
    PriorityLogBuffer::with_limits([minimum; Severity::COUNT], total)
}

#[test]
fn test_critical_survives_info_flood() {
    let mut buffer = uniform(3, 21);
    buffer.add(LogEntry::new(0, Severity::Critical, "first failure"));

    for clock in 1..10_000 {
        buffer.add(LogEntry::new(clock, Severity::Info, "noise"));
    }

    assert_eq!(buffer.len(), 21);
    assert_eq!(buffer.bucket_len(Severity::Critical), 1);
    assert_eq!(buffer.bucket_len(Severity::Info), 20);

    let newest_info: Vec<i64> = buffer
        .iter()
        .filter(|entry| entry.severity() == Severity::Info)
        .map(LogEntry::clock)
        .collect();
    assert_eq!(newest_info.first(), Some(&9_980));
    assert_eq!(newest_info.last(), Some(&9_999));
}

#[test]
fn test_lower_priority_buckets_drain_first() {
    let mut buffer = uniform(2, 12);
    for clock in 0..6 {
        buffer.add(LogEntry::new(clock, Severity::Other, "start"));
        buffer.add(LogEntry::new(clock, Severity::Verbose, "detail"));
    }
    assert_eq!(buffer.len(), 12);

    for clock in 6..10 {
        assert_eq!(
            buffer.add(LogEntry::new(clock, Severity::Error, "failed")),
            AddOutcome::Evicted(Severity::Other)
        );
    }
    assert_eq!(buffer.bucket_len(Severity::Other), 2);

    assert_eq!(
        buffer.add(LogEntry::new(10, Severity::Error, "failed")),
        AddOutcome::Evicted(Severity::Verbose)
    );
}

#[test]
fn test_remove_unsupported_in_every_state() {
    let mut buffer = uniform(1, 6);
    let entry = LogEntry::new(1, Severity::Warning, "w");
    assert!(buffer.remove(&entry).is_err());

    for clock in 0..20 {
        buffer.add(LogEntry::new(clock, Severity::Warning, "w"));
    }
    let first = buffer.iter().next().cloned();
    if let Some(first) = first {
        assert_eq!(buffer.remove(&first), Err(LogBufferError::RemovalUnsupported));
    }
    buffer.clear();
    assert_eq!(buffer.remove(&entry), Err(LogBufferError::RemovalUnsupported));
}

#[test]
fn test_shared_export_matches_header() -> TestResult {
    let shared = SharedLogBuffer::new(uniform(5, 50));
    let at = Utc
        .with_ymd_and_hms(2024, 5, 17, 8, 30, 0)
        .single()
        .ok_or("invalid timestamp")?;
    shared.add(
        LogEntry::new(12, Severity::Critical, "watchdog expired")
            .with_source("watchdog")
            .with_id(3)
            .with_thread_id("main")
            .with_timestamp(at),
    );
    shared.add(LogEntry::new(13, Severity::Verbose, "heartbeat"));

    let mut writer = MemoryDumpWriter::new();
    let rows = shared.export(&mut writer)?;
    assert_eq!(rows, 2);
    assert_eq!(shared.table_name(), LOG_TABLE);
    assert_eq!(shared.header(), LOG_HEADER.as_slice());

    let table = writer.table(LOG_TABLE).ok_or("missing Log table")?;
    // Unset timestamps sort first.
    assert_eq!(table.cell(0, "message"), Some(&DumpValue::from("heartbeat")));
    assert_eq!(
        table.cell(1, "timestamp"),
        Some(&DumpValue::from("2024-05-17T08:30:00+00:00"))
    );
    assert_eq!(table.cell(1, "source"), Some(&DumpValue::from("watchdog")));
    Ok(())
}

#[test]
fn test_json_dump_snapshot() -> TestResult {
    let mut buffer = uniform(2, 10).with_merge_key(MergeKey::Clock);
    buffer.add(LogEntry::new(2, Severity::Warning, "slow ping").with_source("watchdog"));
    buffer.add(LogEntry::new(1, Severity::Error, "disk full").with_id(7));

    let mut writer = JsonDumpWriter::new(Vec::new());
    buffer.export(&mut writer)?;
    let text = String::from_utf8(writer.finish()?)?;

    assert_snapshot!(text.trim_end(), @r#"{"name":"Log","header":["clock","timestamp","severity","source","id","threadId","message"],"rows":[[1,"","Error","",7,"","disk full"],[2,"","Warning","watchdog",0,"","slow ping"]]}"#);
    Ok(())
}

#[test]
fn test_config_fallback_entries_are_exported() -> TestResult {
    let clock = VirtualClock::new(500);
    let config = LogBufferConfig {
        warning: -1,
        ..LogBufferConfig::default()
    };
    let buffer = config.build(&clock);

    let mut writer = MemoryDumpWriter::new();
    buffer.export(&mut writer)?;
    let table = writer.table(LOG_TABLE).ok_or("missing Log table")?;
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.cell(0, "clock"), Some(&DumpValue::Integer(500)));
    assert_eq!(table.cell(0, "severity"), Some(&DumpValue::from("Warning")));
    Ok(())
}
