use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use atb_core::models::Flight;
use atb_core::repository::FlightRepository;
use atb_core::search::FlightSearchCriteria;
use atb_core::store::RecordStore;
use atb_core::StorageError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::CachedTable;

pub struct CsvFlightRepository {
    table: CachedTable<Flight>,
}

impl CsvFlightRepository {
    /// Loads every flight from `path` before the repository is handed out
    pub async fn open(
        store: Arc<dyn RecordStore<Flight>>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let table = CachedTable::load(store, path.into()).await?;
        info!("Loaded {} flights from {}", table.len().await, table.path().display());
        Ok(Self { table })
    }
}

#[async_trait]
impl FlightRepository for CsvFlightRepository {
    async fn get_all(&self) -> Vec<Flight> {
        self.table.all().await
    }

    async fn get_by_id(&self, id: Uuid) -> Option<Flight> {
        self.table.get(id).await
    }

    async fn add(&self, flights: Vec<Flight>) -> Result<(), StorageError> {
        let count = flights.len();
        self.table
            .mutate(move |records| {
                let changed = !flights.is_empty();
                for flight in flights {
                    records.insert(flight.id, flight);
                }
                (changed, ())
            })
            .await?;

        info!("Added {} flights", count);
        Ok(())
    }

    async fn get_matching_criteria(&self, criteria: Option<&FlightSearchCriteria>) -> Vec<Flight> {
        let matches = match criteria {
            Some(criteria) => self.table.filter(|f| criteria.matches(f)).await,
            None => self.table.all().await,
        };
        debug!("{} flights match the search criteria", matches.len());
        matches
    }
}
