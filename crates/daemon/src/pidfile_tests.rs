// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn claim_then_read_round_trips_pid_version_and_mutex_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgcopydb.pid");
    let mine = Pidfile::mine("logmutex-1");
    let _guard = claim(&path, &mine).unwrap();

    let read_back = read(&path).unwrap().unwrap();
    assert_eq!(read_back, mine);
}

#[test]
fn read_of_a_missing_pidfile_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgcopydb.pid");
    assert!(read(&path).unwrap().is_none());
}

#[test]
fn parse_rejects_a_non_numeric_first_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgcopydb.pid");
    std::fs::write(&path, "not-a-pid\n1.0.0\nmutex\n").unwrap();
    assert!(read(&path).unwrap_err().to_string().contains("malformed"));
}

#[test]
fn reclaim_stale_removes_both_the_pidfile_and_its_logging_mutex() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile_path = dir.path().join("pgcopydb.pid");
    let mutex_dir = dir.path().to_path_buf();
    let mutex_path = mutex_dir.join("logmutex-1");
    std::fs::write(&pidfile_path, "12345\n0.2.0\nlogmutex-1\n").unwrap();
    std::fs::write(&mutex_path, b"").unwrap();

    let pidfile = read(&pidfile_path).unwrap().unwrap();
    reclaim_stale(&pidfile_path, &pidfile, &mutex_dir).unwrap();

    assert!(!pidfile_path.exists());
    assert!(!mutex_path.exists());
}

#[test]
fn reclaim_stale_on_an_already_missing_pidfile_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile_path = dir.path().join("pgcopydb.pid");
    let pidfile = Pidfile {
        pid: 1,
        version: "0.2.0".to_string(),
        log_mutex_id: String::new(),
    };
    assert!(reclaim_stale(&pidfile_path, &pidfile, dir.path()).is_ok());
}

#[test]
fn claim_fails_when_another_handle_already_holds_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgcopydb.pid");
    let _first = claim(&path, &Pidfile::mine("m1")).unwrap();
    assert!(claim(&path, &Pidfile::mine("m2")).is_err());
}

#[test]
fn the_current_process_is_alive() {
    assert!(is_alive(std::process::id()));
}
