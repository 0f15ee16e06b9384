use dirs::home_dir;
use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".trip_core";
const TRIPS_DIR: &str = "trips";
const CONFIG_FILE: &str = "trips_config.json";
const TMP_SUFFIX: &str = "tmp";

/// Resolves on-disk locations, honoring `TRIP_CORE_HOME` when set.
pub struct PathResolver;

impl PathResolver {
    /// Returns the application data directory, defaulting to `~/.trip_core`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os("TRIP_CORE_HOME") {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn trips_dir_in(base: &Path) -> PathBuf {
        base.join(TRIPS_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

/// Trip identifiers use underscores in place of spaces.
pub fn normalize_trip_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Human-facing form of a trip identifier.
pub fn display_trip_name(id: &str) -> String {
    id.replace('_', " ")
}

/// File-system safe stem for a trip identifier.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = normalize_trip_name(name)
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "trip".into()
    } else {
        sanitized
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` next to `path` and renames it into place.
pub(crate) fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}
