// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use yare::parameterized;

fn store(dir: &Path) -> PidFileStore {
    PidFileStore::new(dir.join("app.pid"))
}

#[parameterized(
    no_workers = { vec![] },
    one_worker = { vec![2001] },
    many_workers = { vec![2001, 2002, 2003, 2004] },
)]
fn write_then_read_returns_same_record(workers: Vec<u32>) {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let record = PidRecord::new(1234, "1234", workers);

    store.write(&record).unwrap();

    assert_eq!(store.read().unwrap(), record);
}

#[test]
fn write_uses_wire_format() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store
        .write(&PidRecord::new(1234, "abc", vec![2001, 2002]))
        .unwrap();
    let content = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(content, "1234|abc:2001,2002");
}

#[test]
fn write_truncates_longer_previous_record() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store
        .write(&PidRecord::new(1, "1", vec![100, 200, 300, 400]))
        .unwrap();
    store.write(&PidRecord::new(1, "1", vec![5])).unwrap();
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "1|1:5");
}

#[test]
fn read_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let record = store(dir.path()).read().unwrap();
    assert!(record.is_empty());
}

#[test]
fn read_empty_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    std::fs::write(store.path(), "").unwrap();
    assert!(store.read().unwrap().is_empty());
}

#[test]
fn read_corrupt_file_reports_error() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    std::fs::write(store.path(), "not a record").unwrap();
    assert!(matches!(store.read(), Err(PidFileError::Corrupt(..))));
}

#[test]
fn remove_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store.write(&PidRecord::new(1, "1", vec![2])).unwrap();

    store.remove().unwrap();
    store.remove().unwrap();

    assert!(!store.path().exists());
}

#[test]
fn remove_if_owner_deletes_own_record() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store.write(&PidRecord::new(42, "42", vec![43])).unwrap();

    assert!(store.remove_if_owner(42).unwrap());
    assert!(!store.path().exists());
}

#[test]
fn remove_if_owner_keeps_newer_generation() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store.write(&PidRecord::new(77, "77", vec![78])).unwrap();

    assert!(!store.remove_if_owner(42).unwrap());
    assert_eq!(store.read().unwrap().master_pid, 77);
}

#[test]
fn remove_if_owner_missing_file_is_noop() {
    let dir = tempdir().unwrap();
    assert!(!store(dir.path()).remove_if_owner(42).unwrap());
}

#[test]
fn remove_if_owner_clears_corrupt_file() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    std::fs::write(store.path(), "garbage").unwrap();

    assert!(store.remove_if_owner(42).unwrap());
    assert!(!store.path().exists());
}
