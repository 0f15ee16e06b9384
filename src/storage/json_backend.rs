use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{canonical_name, ensure_dir, write_atomic, PathResolver},
    errors::LedgerError,
    ledger::{ledger::CURRENT_SCHEMA_VERSION, Ledger},
};

use super::{Result, StorageBackend};

const LEDGER_EXTENSION: &str = "json";

/// Stores one pretty-printed JSON ledger per trip under `<root>/trips`.
#[derive(Clone, Debug)]
pub struct JsonStorage {
    trips_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = PathResolver::resolve_base(root);
        let trips_dir = PathResolver::trips_dir_in(&root);
        ensure_dir(&trips_dir)?;
        Ok(Self { trips_dir })
    }

    pub fn trip_path(&self, name: &str) -> PathBuf {
        self.trips_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        save_ledger_to_path(ledger, &self.trip_path(name))
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.trip_path(name);
        if !path.exists() {
            return Err(LedgerError::TripNotFound(name.to_string()));
        }
        load_ledger_from_path(&path)
    }

    fn exists(&self, name: &str) -> bool {
        self.trip_path(name).is_file()
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.trips_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.trips_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.trip_path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

/// Saves a ledger to an arbitrary path on disk.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)?;
    tracing::debug!(path = %path.display(), records = ledger.record_count(), "ledger saved");
    Ok(())
}

/// Loads a ledger from the provided filesystem path, rejecting newer schemas
/// and records that fail validation or name unknown participants.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Persistence(format!(
            "`{}` uses schema version {}, newer than supported {}",
            path.display(),
            ledger.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    ledger.validate_records()?;
    Ok(ledger)
}
