use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use atb_core::models::{Booking, FlightClass};
use atb_core::repository::{BookingRepository, FlightRepository};
use atb_core::search::BookingSearchCriteria;
use atb_core::store::RecordStore;
use atb_core::StorageError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::CachedTable;

/// Bookings file cache. Holds the flight repository to evaluate
/// flight-derived search fields against each booking's flight.
pub struct CsvBookingRepository {
    table: CachedTable<Booking>,
    flights: Arc<dyn FlightRepository>,
}

impl CsvBookingRepository {
    pub async fn open(
        store: Arc<dyn RecordStore<Booking>>,
        path: impl Into<PathBuf>,
        flights: Arc<dyn FlightRepository>,
    ) -> Result<Self, StorageError> {
        let table = CachedTable::load(store, path.into()).await?;
        info!("Loaded {} bookings from {}", table.len().await, table.path().display());
        Ok(Self { table, flights })
    }
}

#[async_trait]
impl BookingRepository for CsvBookingRepository {
    async fn get_all(&self) -> Vec<Booking> {
        self.table.all().await
    }

    async fn get_by_id(&self, id: Uuid) -> Option<Booking> {
        self.table.get(id).await
    }

    async fn add(&self, booking: Booking) -> Result<(), StorageError> {
        self.table
            .mutate(move |records| {
                records.insert(booking.id, booking);
                (true, ())
            })
            .await
    }

    async fn update(&self, booking: Booking) -> Result<bool, StorageError> {
        self.table
            .mutate(move |records| match records.get_mut(&booking.id) {
                Some(existing) => {
                    *existing = booking;
                    (true, true)
                }
                None => (false, false),
            })
            .await
    }

    async fn delete(&self, booking: &Booking) -> Result<bool, StorageError> {
        let id = booking.id;
        self.table
            .mutate(move |records| {
                let removed = records.shift_remove(&id).is_some();
                (removed, removed)
            })
            .await
    }

    async fn get_by_passenger(&self, passenger_id: Uuid) -> Vec<Booking> {
        self.table.filter(|b| b.passenger_id == passenger_id).await
    }

    async fn get_by_flight_and_class(&self, flight_id: Uuid, class: FlightClass) -> Vec<Booking> {
        self.table
            .filter(|b| b.flight_id == flight_id && b.class == class)
            .await
    }

    async fn get_matching_criteria(&self, criteria: Option<&BookingSearchCriteria>) -> Vec<Booking> {
        let Some(criteria) = criteria else {
            return self.table.all().await;
        };

        let matches = if criteria.needs_flight() {
            let flights: HashMap<_, _> = self
                .flights
                .get_all()
                .await
                .into_iter()
                .map(|f| (f.id, f))
                .collect();
            self.table
                .filter(|b| criteria.matches(b, flights.get(&b.flight_id)))
                .await
        } else {
            self.table.filter(|b| criteria.matches(b, None)).await
        };

        debug!("{} bookings match the search criteria", matches.len());
        matches
    }
}
