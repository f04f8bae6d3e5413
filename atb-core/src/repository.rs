use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Booking, Flight, FlightClass, Passenger};
use crate::search::{BookingSearchCriteria, FlightSearchCriteria};
use crate::StorageError;

/// Read-only access to passenger records
#[async_trait]
pub trait PassengerRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Passenger>;

    async fn get_by_id(&self, id: Uuid) -> Option<Passenger>;
}

/// Flight records, appended in batches by the importer
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Flight>;

    async fn get_by_id(&self, id: Uuid) -> Option<Flight>;

    /// Appends the batch and rewrites the whole file. On failure nothing is retained.
    async fn add(&self, flights: Vec<Flight>) -> Result<(), StorageError>;

    /// `None` matches every flight
    async fn get_matching_criteria(&self, criteria: Option<&FlightSearchCriteria>) -> Vec<Flight>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_all(&self) -> Vec<Booking>;

    async fn get_by_id(&self, id: Uuid) -> Option<Booking>;

    async fn add(&self, booking: Booking) -> Result<(), StorageError>;

    /// Replaces the booking with the same id. Returns `false` without writing when absent.
    async fn update(&self, booking: Booking) -> Result<bool, StorageError>;

    /// Removes the booking with the same id and reports whether one was removed.
    async fn delete(&self, booking: &Booking) -> Result<bool, StorageError>;

    async fn get_by_passenger(&self, passenger_id: Uuid) -> Vec<Booking>;

    async fn get_by_flight_and_class(&self, flight_id: Uuid, class: FlightClass) -> Vec<Booking>;

    /// `None` matches every booking
    async fn get_matching_criteria(&self, criteria: Option<&BookingSearchCriteria>) -> Vec<Booking>;
}
