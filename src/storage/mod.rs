pub mod json_backend;

use std::path::Path;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing trip ledgers.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    /// Fails with [`LedgerError::TripNotFound`] when nothing is stored under `name`.
    fn load(&self, name: &str) -> Result<Ledger>;
    fn exists(&self, name: &str) -> bool;
    fn list(&self) -> Result<Vec<String>>;
    /// Returns `false` when there was nothing to delete.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Export/import helpers for arbitrary files outside managed storage.
    fn save_to_path(&self, ledger: &Ledger, path: &Path) -> Result<()> {
        json_backend::save_ledger_to_path(ledger, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Ledger> {
        json_backend::load_ledger_from_path(path)
    }
}

pub use json_backend::JsonStorage;
