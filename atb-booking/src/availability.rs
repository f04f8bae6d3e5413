use std::sync::Arc;

use atb_core::models::{Flight, FlightClass};
use atb_core::repository::BookingRepository;

/// Seat accounting per flight class.
///
/// Remaining seats are recomputed from the live bookings on every call; there are
/// no cached counters to drift from the booking set.
#[derive(Clone)]
pub struct SeatAvailability {
    bookings: Arc<dyn BookingRepository>,
}

impl SeatAvailability {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// Seats left in `class`, or `None` when the flight does not offer it
    pub async fn remaining_seats(&self, flight: &Flight, class: FlightClass) -> Option<u32> {
        let capacity = flight.class_details(class)?.capacity;
        let booked = self.bookings.get_by_flight_and_class(flight.id, class).await.len();
        let booked = u32::try_from(booked).unwrap_or(u32::MAX);
        Some(capacity.saturating_sub(booked))
    }

    pub async fn is_class_available(&self, flight: &Flight, class: FlightClass) -> bool {
        matches!(self.remaining_seats(flight, class).await, Some(remaining) if remaining > 0)
    }
}
