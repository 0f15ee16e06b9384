#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use trip_core::{core::TripManager, domain::ExpenseDraft, ledger::Ledger};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated manager backed by a unique directory.
pub fn setup_test_env() -> (TripManager, PathBuf) {
    let base = temp_base();
    let manager = TripManager::with_base_dir(base.clone()).expect("create trip manager");
    (manager, base)
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).expect("valid date")
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

pub fn draft(payer: &str, amount: f64, split: &[&str]) -> ExpenseDraft {
    ExpenseDraft::new(day(1), "Expense", payer, amount, names(split))
}

/// Builds a ledger from `(payer, amount, eligible)` rows.
pub fn ledger_with(participants: &[&str], rows: &[(&str, f64, &[&str])]) -> Ledger {
    let mut ledger = Ledger::new("Fixture", participants.iter().copied());
    for (payer, amount, split) in rows {
        let record = ledger
            .record_from_draft(draft(payer, *amount, split))
            .expect("valid fixture row");
        ledger.upsert_record(record).expect("fixture row accepted");
    }
    ledger
}
