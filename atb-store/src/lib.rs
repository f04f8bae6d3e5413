pub mod app_config;
pub mod csv_store;
pub mod memory_store;
mod cache;
pub mod flight_repo;
pub mod booking_repo;
pub mod passenger_repo;

pub use csv_store::CsvFileStore;
pub use memory_store::MemoryStore;
pub use flight_repo::CsvFlightRepository;
pub use booking_repo::CsvBookingRepository;
pub use passenger_repo::CsvPassengerRepository;
