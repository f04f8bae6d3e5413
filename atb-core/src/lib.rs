pub mod models;
pub mod search;
pub mod repository;
pub mod store;
pub mod validation;

use std::path::PathBuf;
use models::FlightClass;
use uuid::Uuid;

pub use models::{Booking, Flight, FlightClassDetails, FlightDraft, Passenger};
pub use search::{BookingSearchCriteria, FlightSearchCriteria};
pub use validation::Validate;

/// Failures of the backing flat-file store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed record in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Class {class} has no remaining seats on flight with id {flight_id}")]
    CapacityExceeded { flight_id: Uuid, class: FlightClass },
    #[error("Class {class} not available for flight with id {flight_id}")]
    ClassUnavailable { flight_id: Uuid, class: FlightClass },
    #[error("Booking with id {booking_id} already has class {class}")]
    NoOpRejected { booking_id: Uuid, class: FlightClass },
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    pub fn flight_not_found(id: Uuid) -> Self {
        CoreError::NotFound { entity: "Flight", id }
    }

    pub fn passenger_not_found(id: Uuid) -> Self {
        CoreError::NotFound { entity: "Passenger", id }
    }

    pub fn booking_not_found(id: Uuid) -> Self {
        CoreError::NotFound { entity: "Booking", id }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
