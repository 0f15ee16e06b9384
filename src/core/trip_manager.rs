use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::Serialize;

use crate::config::{Config, ConfigManager, TripConfig};
use crate::core::services::{
    BalanceReport, BalanceService, ExpenseService, GroupReport, GroupService, InterGroupReport,
    ServiceError, ServiceResult, SettlementService,
};
use crate::core::utils::{canonical_name, display_trip_name, normalize_trip_name};
use crate::domain::{ExpenseDraft, ExpenseRecord, Group, Settlement};
use crate::errors::LedgerError;
use crate::ledger::Ledger;
use crate::storage::{JsonStorage, StorageBackend};

/// Explicit handle for the trip a caller is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSession {
    trip: String,
}

impl TripSession {
    pub fn trip(&self) -> &str {
        &self.trip
    }

    pub fn display_name(&self) -> String {
        display_trip_name(&self.trip)
    }
}

/// Everything derived from a trip snapshot: balances, settlements, groups.
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub trip: String,
    pub locked: bool,
    pub balances: BalanceReport,
    pub settlements: Vec<Settlement>,
    pub pairwise: Vec<Settlement>,
    pub groups: GroupReport,
    pub group_settlements: Vec<Settlement>,
    pub inter_group: InterGroupReport,
}

impl TripSummary {
    pub fn compute(ledger: &Ledger, config: &TripConfig) -> Self {
        let balances = BalanceService::compute_balances(ledger);
        let settlements = SettlementService::net_settlements(balances.balances());
        let pairwise = SettlementService::pairwise_settlements(ledger);
        let groups = GroupService::compute_group_stats(&config.groups, &balances);
        let group_settlements = GroupService::group_settlements(&groups);
        let inter_group = GroupService::inter_group_settlements(&pairwise, &config.groups);
        Self {
            trip: ledger.name.clone(),
            locked: config.locked,
            balances,
            settlements,
            pairwise,
            groups,
            group_settlements,
            inter_group,
        }
    }

    /// Plain-text message listing who pays whom, suitable for sharing.
    pub fn share_text(&self, currency_symbol: &str) -> String {
        let mut lines = vec![format!("*Trip: {}*", display_trip_name(&self.trip))];
        lines.extend(
            self.settlements
                .iter()
                .map(|settlement| settlement.describe(currency_symbol)),
        );
        lines.join("\n")
    }
}

/// Coordinates trip ledgers, their configuration, and serialized writes.
///
/// Every mutation of a trip runs load → change → save while holding that
/// trip's mutex, so concurrent writers cannot overwrite each other.
pub struct TripManager {
    storage: Box<dyn StorageBackend>,
    config: ConfigManager,
    trip_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    config_lock: Mutex<()>,
}

impl TripManager {
    pub fn new(storage: Box<dyn StorageBackend>, config: ConfigManager) -> Self {
        Self {
            storage,
            config,
            trip_locks: Mutex::new(HashMap::new()),
            config_lock: Mutex::new(()),
        }
    }

    /// JSON storage and configuration rooted at `base`.
    pub fn with_base_dir(base: PathBuf) -> ServiceResult<Self> {
        let storage = JsonStorage::new(Some(base.clone()))?;
        let config = ConfigManager::with_base_dir(base)?;
        Ok(Self::new(Box::new(storage), config))
    }

    /// Opens an existing trip or starts a new one.
    ///
    /// A trip protected by a password only opens with the matching password.
    /// Participants not yet in the ledger are added.
    pub fn open_trip(
        &self,
        name: &str,
        password: Option<&str>,
        participants: &[String],
    ) -> ServiceResult<TripSession> {
        let trip = trip_id(name)?;

        self.with_trip_lock(&trip, || {
            let created = self.update_config(|config| {
                match config.trips.get(&trip) {
                    Some(existing) if !existing.verify_password(password) => {
                        return Err(LedgerError::IncorrectPassword(trip.clone()).into());
                    }
                    Some(_) => {}
                    None => {
                        config.trips.insert(trip.clone(), TripConfig::new(password));
                    }
                }
                config.last_opened_trip = Some(trip.clone());
                Ok(!self.storage.exists(&trip))
            })?;

            if created {
                let ledger = Ledger::new(trip.clone(), participants.iter().cloned());
                self.storage.save(&ledger, &trip)?;
                tracing::info!(%trip, participants = ledger.participants.len(), "trip created");
            } else {
                let mut ledger = self.storage.load(&trip)?;
                let mut added = 0usize;
                for participant in participants {
                    if ledger.add_participant(participant.clone()) {
                        added += 1;
                    }
                }
                if added > 0 {
                    self.storage.save(&ledger, &trip)?;
                }
                tracing::info!(%trip, added, "trip opened");
            }
            Ok(TripSession { trip: trip.clone() })
        })
    }

    pub fn ledger(&self, session: &TripSession) -> ServiceResult<Ledger> {
        Ok(self.storage.load(session.trip())?)
    }

    pub fn trip_config(&self, session: &TripSession) -> ServiceResult<TripConfig> {
        Ok(self
            .load_config()?
            .trips
            .remove(session.trip())
            .unwrap_or_default())
    }

    pub fn currency_symbol(&self) -> ServiceResult<String> {
        Ok(self.load_config()?.currency_symbol)
    }

    /// Consistent snapshot of the trip with every derived figure.
    pub fn summary(&self, session: &TripSession) -> ServiceResult<TripSummary> {
        self.with_trip_lock(session.trip(), || {
            let ledger = self.storage.load(session.trip())?;
            let config = self.trip_config(session)?;
            Ok(TripSummary::compute(&ledger, &config))
        })
    }

    /// Adds the given participants; returns how many were new.
    pub fn add_participants(&self, session: &TripSession, names: &[String]) -> ServiceResult<usize> {
        self.mutate_ledger(session, |ledger| {
            Ok(names
                .iter()
                .filter(|name| ledger.add_participant(name.as_str()))
                .count())
        })
    }

    pub fn save_expense(&self, session: &TripSession, draft: ExpenseDraft) -> ServiceResult<String> {
        self.mutate_ledger(session, |ledger| ExpenseService::save(ledger, draft))
    }

    pub fn remove_expense(&self, session: &TripSession, id: &str) -> ServiceResult<ExpenseRecord> {
        self.mutate_ledger(session, |ledger| ExpenseService::remove(ledger, id))
    }

    /// Registers or replaces a group; returns `true` when one was replaced.
    pub fn set_group(
        &self,
        session: &TripSession,
        name: &str,
        members: &[String],
    ) -> ServiceResult<bool> {
        self.with_trip_lock(session.trip(), || {
            let ledger = self.storage.load(session.trip())?;
            self.mutate_trip_config(session.trip(), |trip| {
                GroupService::set_group(&mut trip.groups, &ledger, name, members)
            })
        })
    }

    pub fn remove_group(&self, session: &TripSession, name: &str) -> ServiceResult<Group> {
        self.with_trip_lock(session.trip(), || {
            self.mutate_trip_config(session.trip(), |trip| {
                GroupService::remove_group(&mut trip.groups, name)
            })
        })
    }

    pub fn set_locked(&self, session: &TripSession, locked: bool) -> ServiceResult<()> {
        self.with_trip_lock(session.trip(), || {
            self.update_config(|config| {
                config
                    .trips
                    .entry(session.trip().to_string())
                    .or_default()
                    .locked = locked;
                Ok(())
            })?;
            tracing::info!(trip = %session.trip(), locked, "trip lock changed");
            Ok(())
        })
    }

    pub fn list_trips(&self) -> ServiceResult<Vec<String>> {
        Ok(self.storage.list()?)
    }

    /// Writes the trip ledger to an arbitrary file.
    pub fn export_trip(&self, session: &TripSession, path: &Path) -> ServiceResult<()> {
        self.with_trip_lock(session.trip(), || {
            let ledger = self.storage.load(session.trip())?;
            self.storage.save_to_path(&ledger, path)?;
            tracing::info!(trip = %session.trip(), path = %path.display(), "trip exported");
            Ok(())
        })
    }

    /// Adds a trip from an exported ledger file under the name it carries.
    ///
    /// Refuses to overwrite a trip that already exists.
    pub fn import_trip(&self, path: &Path, password: Option<&str>) -> ServiceResult<TripSession> {
        let mut ledger = self.storage.load_from_path(path)?;
        let trip = trip_id(&ledger.name)?;
        ledger.name = trip.clone();

        self.with_trip_lock(&trip, || {
            if self.storage.exists(&trip) {
                return Err(ServiceError::Invalid(format!(
                    "Trip `{}` already exists",
                    display_trip_name(&trip)
                )));
            }
            self.update_config(|config| {
                if config.trips.contains_key(&trip) {
                    return Err(ServiceError::Invalid(format!(
                        "Trip `{}` already exists",
                        display_trip_name(&trip)
                    )));
                }
                config.trips.insert(trip.clone(), TripConfig::new(password));
                config.last_opened_trip = Some(trip.clone());
                Ok(())
            })?;
            self.storage.save(&ledger, &trip)?;
            tracing::info!(%trip, records = ledger.records.len(), "trip imported");
            Ok(TripSession { trip: trip.clone() })
        })
    }

    /// Deletes the ledger and settings of an unlocked trip.
    pub fn delete_trip(&self, name: &str) -> ServiceResult<bool> {
        let trip = trip_id(name)?;
        let deleted = self.with_trip_lock(&trip, || {
            let removed_config = self.update_config(|config| {
                if config.trip(&trip).is_some_and(|t| t.locked) {
                    return Err(LedgerError::TripLocked(trip.clone()).into());
                }
                if config.last_opened_trip.as_deref() == Some(trip.as_str()) {
                    config.last_opened_trip = None;
                }
                Ok(config.trips.remove(&trip).is_some())
            })?;
            let removed_ledger = self.storage.delete(&trip)?;
            if removed_ledger {
                tracing::info!(%trip, "trip deleted");
            }
            Ok(removed_ledger || removed_config)
        })?;
        self.release_trip_lock(&trip)?;
        Ok(deleted)
    }

    fn mutate_ledger<T, F>(&self, session: &TripSession, mutator: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Ledger) -> ServiceResult<T>,
    {
        let trip = session.trip();
        self.with_trip_lock(trip, || {
            self.ensure_unlocked(trip)?;
            let mut ledger = self.storage.load(trip)?;
            let outcome = mutator(&mut ledger)?;
            self.storage.save(&ledger, trip)?;
            Ok(outcome)
        })
    }

    fn mutate_trip_config<T, F>(&self, trip: &str, mutator: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut TripConfig) -> ServiceResult<T>,
    {
        self.update_config(|config| {
            let entry = config.trips.entry(trip.to_string()).or_default();
            if entry.locked {
                return Err(LedgerError::TripLocked(trip.to_string()).into());
            }
            mutator(entry)
        })
    }

    fn ensure_unlocked(&self, trip: &str) -> ServiceResult<()> {
        match self.load_config()?.trip(trip) {
            Some(config) if config.locked => Err(LedgerError::TripLocked(trip.to_string()).into()),
            _ => Ok(()),
        }
    }

    fn load_config(&self) -> ServiceResult<Config> {
        let _guard = self.config_lock.lock().map_err(|_| poisoned("configuration"))?;
        Ok(self.config.load()?)
    }

    /// The configuration file is shared by all trips, so it has its own lock.
    fn update_config<T, F>(&self, mutator: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Config) -> ServiceResult<T>,
    {
        let _guard = self.config_lock.lock().map_err(|_| poisoned("configuration"))?;
        let mut config = self.config.load()?;
        let outcome = mutator(&mut config)?;
        self.config.save(&config)?;
        Ok(outcome)
    }

    fn with_trip_lock<T, F>(&self, trip: &str, action: F) -> ServiceResult<T>
    where
        F: FnOnce() -> ServiceResult<T>,
    {
        let lock = {
            let mut locks = self.trip_locks.lock().map_err(|_| poisoned("trip registry"))?;
            Arc::clone(locks.entry(trip.to_string()).or_default())
        };
        let _guard = lock.lock().map_err(|_| poisoned(trip))?;
        action()
    }

    /// Drops the registry entry unless another caller still holds it.
    fn release_trip_lock(&self, trip: &str) -> ServiceResult<()> {
        let mut locks = self.trip_locks.lock().map_err(|_| poisoned("trip registry"))?;
        if locks.get(trip).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(trip);
        }
        Ok(())
    }
}

/// Normalizes a trip name and rejects names that would share a ledger file
/// with another name.
fn trip_id(name: &str) -> ServiceResult<String> {
    let trip = normalize_trip_name(name);
    if trip.is_empty() {
        return Err(ServiceError::Invalid("Trip name cannot be empty".into()));
    }
    if canonical_name(&trip) != trip {
        return Err(ServiceError::Invalid(format!(
            "Trip name `{}` may only contain letters, digits, spaces, `-` and `_`",
            name.trim()
        )));
    }
    Ok(trip)
}

fn poisoned(what: &str) -> ServiceError {
    LedgerError::Persistence(format!("lock for {what} was poisoned")).into()
}
