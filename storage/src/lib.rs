// storage/src/lib.rs

use std::sync::Arc;

use log::{debug, error, info};
use models::errors::ScheduleResult;

// Declare submodules
pub mod config;
pub mod inmemory_store;
pub mod record_store;
pub mod sled_store;

// Re-export key items
pub use config::{load_store_config_from_yaml, parse_store_engine, StoreConfig, StoreEngineType};
pub use inmemory_store::InMemoryStore;
pub use record_store::{AppointmentFilter, DoctorFilter, PatientFilter, RecordFilter, RecordStore};
pub use sled_store::SledStore;

/// Creates a record store instance based on the provided configuration.
///
/// Sled is the default engine (as per `StoreConfig::default`); InMemory is
/// intended for tests and ephemeral runs.
pub async fn create_store(config: &StoreConfig) -> ScheduleResult<Arc<dyn RecordStore>> {
    debug!("Creating record store with config: {:?}", config);

    let store: Arc<dyn RecordStore> = match config.engine {
        StoreEngineType::Sled => {
            let path = config.resolved_data_directory();
            match SledStore::open(&path, config) {
                Ok(store) => {
                    info!("Created sled record store at {:?}", path);
                    Arc::new(store)
                }
                Err(e) => {
                    error!("Failed to create sled record store at {:?}: {}", path, e);
                    return Err(e);
                }
            }
        }
        StoreEngineType::InMemory => {
            info!("Created in-memory record store");
            Arc::new(InMemoryStore::new())
        }
    };

    Ok(store)
}

impl std::fmt::Display for StoreEngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StoreEngineType::Sled => "sled",
            StoreEngineType::InMemory => "in-memory",
        };
        write!(f, "{}", label)
    }
}
