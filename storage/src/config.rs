// storage/src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use models::errors::{ScheduleError, ScheduleResult};
use serde::{Deserialize, Serialize};
use serde_yaml2 as serde_yaml;

pub const DEFAULT_DATA_DIRECTORY: &str = "./data/medisched";
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreEngineType {
    Sled,
    InMemory,
}

/// Custom parser for the store engine, accepting the aliases users
/// actually type (inmemory, in-memory, in_memory).
pub fn parse_store_engine(engine: &str) -> Result<StoreEngineType, String> {
    match engine.to_lowercase().as_str() {
        "sled" => Ok(StoreEngineType::Sled),
        "inmemory" | "in-memory" | "in_memory" => Ok(StoreEngineType::InMemory),
        other => Err(format!(
            "Invalid store engine: '{}'. Supported values: sled, inmemory, in-memory",
            other
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub engine: StoreEngineType,
    pub data_directory: Option<PathBuf>,
    pub cache_capacity: Option<u64>,
    /// Temporary stores drop their files on close (sled `temporary` mode).
    #[serde(default)]
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            engine: StoreEngineType::Sled,
            data_directory: Some(PathBuf::from(DEFAULT_DATA_DIRECTORY)),
            cache_capacity: Some(DEFAULT_CACHE_CAPACITY),
            temporary: false,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig {
            engine: StoreEngineType::InMemory,
            data_directory: None,
            cache_capacity: None,
            temporary: true,
        }
    }

    pub fn resolved_data_directory(&self) -> PathBuf {
        self.data_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIRECTORY))
    }
}

/// Loads the store configuration from a YAML file.
///
/// A missing path (or `None`) falls back to `StoreConfig::default()`; a
/// present but unreadable or malformed file is an error, so a typo in the
/// config never silently books appointments into the wrong store.
pub fn load_store_config_from_yaml(path: Option<&Path>) -> ScheduleResult<StoreConfig> {
    let path = match path {
        Some(p) => p,
        None => {
            debug!("No config path given, using default store config");
            return Ok(StoreConfig::default());
        }
    };

    if !path.exists() {
        warn!("Config file {:?} does not exist, using default store config", path);
        return Ok(StoreConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let config: StoreConfig = serde_yaml::from_str(&raw).map_err(|e| {
        ScheduleError::StorageUnavailable(format!("failed to parse config {:?}: {}", path, e))
    })?;
    debug!("Loaded store config from {:?}: {:?}", path, config);
    Ok(config)
}
