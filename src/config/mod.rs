use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    domain::GroupRoster,
    errors::LedgerError,
};

/// Per-trip settings kept outside the expense ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TripConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub groups: GroupRoster,
}

impl TripConfig {
    /// Blank passwords are treated as no password.
    pub fn new(password: Option<&str>) -> Self {
        Self {
            password: password
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            locked: false,
            groups: GroupRoster::new(),
        }
    }

    /// A trip without a password accepts any attempt.
    pub fn verify_password(&self, attempt: Option<&str>) -> bool {
        match self.password.as_deref() {
            None => true,
            Some(expected) => attempt.map(str::trim) == Some(expected),
        }
    }
}

/// Application preferences plus the settings of every known trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_trip: Option<String>,
    #[serde(default)]
    pub trips: BTreeMap<String, TripConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            last_opened_trip: None,
            trips: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "₹".into()
    }

    pub fn trip(&self, id: &str) -> Option<&TripConfig> {
        self.trips.get(id)
    }
}

/// Loads and atomically saves [`Config`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self::new(PathResolver::config_file_in(&base)))
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    /// Load, mutate, and save in one step, returning the mutator's result.
    pub fn update<T, F>(&self, mutator: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Config) -> Result<T, LedgerError>,
    {
        let mut config = self.load()?;
        let outcome = mutator(&mut config)?;
        self.save(&config)?;
        Ok(outcome)
    }
}
