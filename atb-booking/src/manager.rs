use std::sync::Arc;

use atb_core::models::{Booking, FlightClass};
use atb_core::repository::{BookingRepository, FlightRepository, PassengerRepository};
use atb_core::search::BookingSearchCriteria;
use atb_core::{CoreError, CoreResult};
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::SeatAvailability;
use crate::locks::FlightLocks;

/// Books, cancels and modifies seat reservations
pub struct BookingManager {
    bookings: Arc<dyn BookingRepository>,
    flights: Arc<dyn FlightRepository>,
    passengers: Arc<dyn PassengerRepository>,
    availability: SeatAvailability,
    locks: FlightLocks,
}

impl BookingManager {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        flights: Arc<dyn FlightRepository>,
        passengers: Arc<dyn PassengerRepository>,
    ) -> Self {
        Self {
            availability: SeatAvailability::new(bookings.clone()),
            bookings,
            flights,
            passengers,
            locks: FlightLocks::new(),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<Booking> {
        self.bookings.get_by_id(id).await
    }

    /// Reserves a seat. The capacity check and the insert run under the flight's lock.
    pub async fn book_flight(&self, flight_id: Uuid, passenger_id: Uuid, class: FlightClass) -> CoreResult<Booking> {
        // Unknown flights never get a lock entry
        let flight = self
            .flights
            .get_by_id(flight_id)
            .await
            .ok_or_else(|| CoreError::flight_not_found(flight_id))?;
        let _guard = self.locks.acquire(flight_id).await;

        if !self.availability.is_class_available(&flight, class).await {
            warn!("Rejected booking: {} is full or not offered on flight {}", class, flight_id);
            return Err(CoreError::CapacityExceeded { flight_id, class });
        }

        if self.passengers.get_by_id(passenger_id).await.is_none() {
            return Err(CoreError::passenger_not_found(passenger_id));
        }

        let booking = Booking::new(passenger_id, flight_id, class);
        self.bookings.add(booking.clone()).await?;

        info!("Booking {} created: passenger {} on flight {} ({})", booking.id, passenger_id, flight_id, class);
        Ok(booking)
    }

    pub async fn cancel_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        let flight_id = self.find(booking_id).await?.flight_id;
        let _guard = self.locks.acquire(flight_id).await;

        let booking = self.find(booking_id).await?;

        if !self.bookings.delete(&booking).await? {
            return Err(CoreError::booking_not_found(booking_id));
        }

        info!("Booking {} cancelled", booking_id);
        Ok(booking)
    }

    /// Moves a booking to another class offered by its flight.
    ///
    /// Remaining seats in the target class are not checked here, unlike `book_flight`.
    pub async fn modify_booking(&self, booking_id: Uuid, new_class: FlightClass) -> CoreResult<Booking> {
        let flight_id = self.find(booking_id).await?.flight_id;
        let _guard = self.locks.acquire(flight_id).await;

        // Re-read under the lock, the booking may have been cancelled meanwhile
        let mut booking = self.find(booking_id).await?;

        if booking.class == new_class {
            warn!("Rejected modification of booking {}: already {}", booking_id, new_class);
            return Err(CoreError::NoOpRejected { booking_id, class: new_class });
        }

        let flight = self
            .flights
            .get_by_id(booking.flight_id)
            .await
            .ok_or_else(|| CoreError::flight_not_found(booking.flight_id))?;

        if !flight.offers(new_class) {
            warn!("Rejected modification of booking {}: flight {} has no {}", booking_id, flight.id, new_class);
            return Err(CoreError::ClassUnavailable { flight_id: flight.id, class: new_class });
        }

        let previous = booking.class;
        booking.class = new_class;
        if !self.bookings.update(booking.clone()).await? {
            return Err(CoreError::booking_not_found(booking_id));
        }

        info!("Booking {} moved from {} to {}", booking_id, previous, new_class);
        Ok(booking)
    }

    pub async fn get_passenger_bookings(&self, passenger_id: Uuid) -> Vec<Booking> {
        self.bookings.get_by_passenger(passenger_id).await
    }

    /// Manager filter over all bookings
    pub async fn get_matching_criteria(&self, criteria: Option<&BookingSearchCriteria>) -> Vec<Booking> {
        self.bookings.get_matching_criteria(criteria).await
    }

    pub async fn remaining_seats(&self, flight_id: Uuid, class: FlightClass) -> CoreResult<Option<u32>> {
        let flight = self
            .flights
            .get_by_id(flight_id)
            .await
            .ok_or_else(|| CoreError::flight_not_found(flight_id))?;
        Ok(self.availability.remaining_seats(&flight, class).await)
    }

    async fn find(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.bookings
            .get_by_id(booking_id)
            .await
            .ok_or_else(|| CoreError::booking_not_found(booking_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atb_core::models::{Flight, FlightClassDetails, Passenger};
    use atb_store::{CsvBookingRepository, CsvFlightRepository, CsvPassengerRepository, MemoryStore};
    use rust_decimal::Decimal;

    struct Fixture {
        manager: BookingManager,
        flight: Flight,
        passengers: Vec<Passenger>,
        booking_store: Arc<MemoryStore<Booking>>,
    }

    fn passenger(name: &str) -> Passenger {
        Passenger {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: "+962790000000".to_string(),
            passport_number: "A1234567".to_string(),
        }
    }

    async fn fixture(economy_capacity: u32, business_capacity: u32) -> Fixture {
        let flight = Flight {
            id: Uuid::new_v4(),
            departure_country: "Jordan".to_string(),
            destination_country: "Lebanon".to_string(),
            departure_date: "2025-09-01T09:00:00Z".parse().unwrap(),
            departure_airport: "AMM".to_string(),
            arrival_airport: "BEY".to_string(),
            class_details: vec![
                FlightClassDetails::new(FlightClass::Economy, Decimal::from(90), economy_capacity),
                FlightClassDetails::new(FlightClass::Business, Decimal::from(400), business_capacity),
            ],
        };
        let passengers = vec![passenger("Nour"), passenger("Fadi"), passenger("Maya")];

        let flights: Arc<dyn FlightRepository> = Arc::new(
            CsvFlightRepository::open(Arc::new(MemoryStore::with_file("f.csv", vec![flight.clone()])), "f.csv")
                .await
                .unwrap(),
        );
        let passenger_repo = CsvPassengerRepository::open(Arc::new(MemoryStore::with_file("p.csv", passengers.clone())), "p.csv")
            .await
            .unwrap();
        let booking_store = Arc::new(MemoryStore::<Booking>::with_file("b.csv", Vec::new()));
        let bookings = CsvBookingRepository::open(booking_store.clone(), "b.csv", flights.clone())
            .await
            .unwrap();

        Fixture {
            manager: BookingManager::new(Arc::new(bookings), flights, Arc::new(passenger_repo)),
            flight,
            passengers,
            booking_store,
        }
    }

    #[tokio::test]
    async fn test_book_flight_persists_booking() {
        let f = fixture(2, 1).await;
        let booking = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();

        assert_eq!(f.manager.get_by_id(booking.id).await, Some(booking.clone()));
        assert_eq!(f.manager.get_passenger_bookings(f.passengers[0].id).await, vec![booking]);
        assert_eq!(f.booking_store.write_count(), 1);
        assert_eq!(
            f.manager.remaining_seats(f.flight.id, FlightClass::Economy).await.unwrap(),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_book_unknown_flight_or_passenger() {
        let f = fixture(2, 1).await;

        let err = f
            .manager
            .book_flight(Uuid::new_v4(), f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Flight", .. }));

        let err = f
            .manager
            .book_flight(f.flight.id, Uuid::new_v4(), FlightClass::Economy)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Passenger", .. }));
        assert!(f.manager.get_matching_criteria(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_flight_takes_no_lock() {
        let f = fixture(2, 1).await;
        for _ in 0..5 {
            let result = f
                .manager
                .book_flight(Uuid::new_v4(), f.passengers[0].id, FlightClass::Economy)
                .await;
            assert!(matches!(result, Err(CoreError::NotFound { entity: "Flight", .. })));
        }
        assert!(f.manager.locks.is_empty());

        f.manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();
        assert_eq!(f.manager.locks.len(), 1);
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let f = fixture(2, 1).await;
        for p in &f.passengers {
            let _ = f.manager.book_flight(f.flight.id, p.id, FlightClass::Economy).await;
        }
        let err = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::CapacityExceeded { class: FlightClass::Economy, .. }));
        let criteria = BookingSearchCriteria {
            flight_id: Some(f.flight.id),
            class: Some(FlightClass::Economy),
            ..Default::default()
        };
        assert_eq!(f.manager.get_matching_criteria(Some(&criteria)).await.len(), 2);
    }

    #[tokio::test]
    async fn test_class_not_offered_is_unavailable() {
        let f = fixture(2, 1).await;
        let err = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::FirstClass)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::CapacityExceeded { .. }));
        assert_eq!(
            f.manager.remaining_seats(f.flight.id, FlightClass::FirstClass).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_cancel_booking() {
        let f = fixture(1, 1).await;
        let booking = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();

        f.manager.cancel_booking(booking.id).await.unwrap();
        assert_eq!(f.manager.get_by_id(booking.id).await, None);

        let err = f.manager.cancel_booking(booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Booking", .. }));
    }

    #[tokio::test]
    async fn test_cancel_returns_the_latest_class() {
        let f = fixture(2, 1).await;
        let booking = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();

        // Hold the flight lock so the cancel queues behind a pending class change
        let guard = f.manager.locks.acquire(f.flight.id).await;
        let (cancelled, _) = tokio::join!(f.manager.cancel_booking(booking.id), async {
            let mut moved = booking.clone();
            moved.class = FlightClass::Business;
            f.manager.bookings.update(moved).await.unwrap();
            drop(guard);
        });

        assert_eq!(cancelled.unwrap().class, FlightClass::Business);
        assert_eq!(f.manager.get_by_id(booking.id).await, None);
    }

    #[tokio::test]
    async fn test_modify_to_same_class_is_rejected_without_writing() {
        let f = fixture(2, 1).await;
        let booking = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();
        let writes = f.booking_store.write_count();

        let err = f.manager.modify_booking(booking.id, FlightClass::Economy).await.unwrap_err();

        assert!(matches!(err, CoreError::NoOpRejected { .. }));
        assert_eq!(f.booking_store.write_count(), writes);
        assert_eq!(f.manager.get_by_id(booking.id).await, Some(booking));
    }

    #[tokio::test]
    async fn test_modify_to_unoffered_class() {
        let f = fixture(2, 1).await;
        let booking = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap();

        let err = f.manager.modify_booking(booking.id, FlightClass::FirstClass).await.unwrap_err();
        assert!(matches!(err, CoreError::ClassUnavailable { class: FlightClass::FirstClass, .. }));

        let err = f.manager.modify_booking(Uuid::new_v4(), FlightClass::Business).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Booking", .. }));
    }

    #[tokio::test]
    async fn test_modify_does_not_recheck_target_capacity() {
        // Business holds a single seat and is already taken
        let f = fixture(2, 1).await;
        f.manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Business)
            .await
            .unwrap();
        let economy = f
            .manager
            .book_flight(f.flight.id, f.passengers[1].id, FlightClass::Economy)
            .await
            .unwrap();

        let moved = f.manager.modify_booking(economy.id, FlightClass::Business).await.unwrap();

        assert_eq!(moved.class, FlightClass::Business);
        assert_eq!(
            f.manager.remaining_seats(f.flight.id, FlightClass::Business).await.unwrap(),
            Some(0)
        );
        let business = BookingSearchCriteria {
            class: Some(FlightClass::Business),
            ..Default::default()
        };
        assert_eq!(f.manager.get_matching_criteria(Some(&business)).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_book() {
        let f = fixture(2, 1).await;
        f.booking_store.set_fail_writes(true);

        let err = f
            .manager
            .book_flight(f.flight.id, f.passengers[0].id, FlightClass::Economy)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Storage(_)));
        assert!(f.manager.get_passenger_bookings(f.passengers[0].id).await.is_empty());
    }
}
