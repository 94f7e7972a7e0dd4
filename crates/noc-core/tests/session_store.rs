// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! On-disk behaviour of the session store and history log.

use chrono::{Local, TimeZone};
use noc_core::sessions::{record_session, RECENT_SESSIONS};
use noc_core::{ConnectionType, NocPaths, SessionStore};
use std::fs;

#[test]
fn recording_keeps_foreign_keys_and_caps_recent_list() {
    let root = tempfile::tempdir().unwrap();
    let paths = NocPaths::under(root.path());
    fs::write(
        &paths.sessions_file,
        r#"{"last_session_index": 41, "theme": "dark"}"#,
    )
    .unwrap();
    let store = SessionStore::new(&paths.sessions_file);
    let day = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();

    for i in 0..7 {
        let host = format!("r{i}");
        record_session(&store, &paths.history_file, ConnectionType::Telnet, &host, &day).unwrap();
    }
    let index = record_session(&store, &paths.history_file, ConnectionType::Telnet, "r3", &day).unwrap();
    assert_eq!(index, 49);

    let meta = store.load().unwrap();
    let hosts: Vec<&str> = meta.recent().iter().map(|s| s.host.as_str()).collect();
    assert_eq!(hosts, vec!["r3", "r6", "r5", "r4", "r2"]);
    assert_eq!(hosts.len(), RECENT_SESSIONS);
    assert_eq!(meta.last_host(ConnectionType::Telnet), Some("r3"));
    assert_eq!(meta.extra.get("theme").and_then(|v| v.as_str()), Some("dark"));
}

#[test]
fn history_log_groups_sessions_by_day() {
    let root = tempfile::tempdir().unwrap();
    let paths = NocPaths::under(root.path());
    let store = SessionStore::new(&paths.sessions_file);

    let first = Local.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap();
    let second = Local.with_ymd_and_hms(2024, 6, 2, 0, 1, 5).unwrap();
    record_session(&store, &paths.history_file, ConnectionType::Ssh, "core1", &first).unwrap();
    record_session(&store, &paths.history_file, ConnectionType::Ssh, "core2", &first).unwrap();
    record_session(&store, &paths.history_file, ConnectionType::Telnet, "10.0.0.1", &second).unwrap();

    let history = fs::read_to_string(&paths.history_file).unwrap();
    assert_eq!(
        history,
        "# 01.06.2024\n\
         \x20   1 01.06.2024 23:59:00 ssh core1\n\
         \x20   2 01.06.2024 23:59:00 ssh core2\n\
         # 02.06.2024\n\
         \x20   3 02.06.2024 00:01:05 telnet 10.0.0.1\n"
    );
}

#[test]
fn corrupt_sessions_file_is_reported_with_its_path() {
    let root = tempfile::tempdir().unwrap();
    let paths = NocPaths::under(root.path());
    fs::write(&paths.sessions_file, "{not json").unwrap();

    let err = SessionStore::new(&paths.sessions_file).load().unwrap_err();
    assert!(err.to_string().contains("sessions.json"));
}
