pub mod availability;
pub mod locks;
pub mod manager;
pub mod catalog;

pub use availability::SeatAvailability;
pub use catalog::FlightCatalog;
pub use locks::FlightLocks;
pub use manager::BookingManager;
