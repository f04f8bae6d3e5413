use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use atb_core::models::Passenger;
use atb_core::repository::PassengerRepository;
use atb_core::store::RecordStore;
use atb_core::validation::Validate;
use atb_core::StorageError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::CachedTable;

/// Read-only passenger cache. Passengers come from seed data only.
pub struct CsvPassengerRepository {
    table: CachedTable<Passenger>,
}

impl CsvPassengerRepository {
    /// Loads the passengers file. Records that break the field rules are kept but logged.
    pub async fn open(
        store: Arc<dyn RecordStore<Passenger>>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let table = CachedTable::load(store, path.into()).await?;

        for passenger in table.all().await {
            for violation in passenger.validate() {
                warn!("Passenger {}: {}", passenger.id, violation);
            }
        }

        info!("Loaded {} passengers from {}", table.len().await, table.path().display());
        Ok(Self { table })
    }
}

#[async_trait]
impl PassengerRepository for CsvPassengerRepository {
    async fn get_all(&self) -> Vec<Passenger> {
        self.table.all().await
    }

    async fn get_by_id(&self, id: Uuid) -> Option<Passenger> {
        self.table.get(id).await
    }
}
