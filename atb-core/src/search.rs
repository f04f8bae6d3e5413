use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, Flight, FlightClass};

/// Optional-field flight filter. An absent field matches every flight.
///
/// `price` is a ceiling: with `class` set, that class must cost at most `price`;
/// without it, any offered class may satisfy the bound. Dates compare on the
/// full timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightSearchCriteria {
    pub price: Option<Decimal>,
    pub departure_country: Option<String>,
    pub destination_country: Option<String>,
    pub departure_date: Option<DateTime<Utc>>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub class: Option<FlightClass>,
}

impl FlightSearchCriteria {
    pub fn matches(&self, flight: &Flight) -> bool {
        field_matches(&self.departure_country, &flight.departure_country)
            && field_matches(&self.destination_country, &flight.destination_country)
            && field_matches(&self.departure_date, &flight.departure_date)
            && field_matches(&self.departure_airport, &flight.departure_airport)
            && field_matches(&self.arrival_airport, &flight.arrival_airport)
            && self.class_matches(flight)
            && self.price_matches(flight)
    }

    fn class_matches(&self, flight: &Flight) -> bool {
        self.class.map_or(true, |class| flight.offers(class))
    }

    fn price_matches(&self, flight: &Flight) -> bool {
        let Some(max_price) = self.price else {
            return true;
        };
        match self.class {
            Some(class) => flight
                .class_details(class)
                .is_some_and(|d| d.price <= max_price),
            None => flight.class_details.iter().any(|d| d.price <= max_price),
        }
    }
}

/// Optional-field booking filter used by managers.
///
/// Flight-derived fields are evaluated against the booking's flight; a booking
/// whose flight cannot be resolved only matches criteria that leave them unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingSearchCriteria {
    pub passenger_id: Option<Uuid>,
    pub flight_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub departure_country: Option<String>,
    pub destination_country: Option<String>,
    pub departure_date: Option<DateTime<Utc>>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub class: Option<FlightClass>,
}

impl BookingSearchCriteria {
    /// Whether any field needs the referenced flight to be evaluated
    pub fn needs_flight(&self) -> bool {
        self.price.is_some()
            || self.departure_country.is_some()
            || self.destination_country.is_some()
            || self.departure_date.is_some()
            || self.departure_airport.is_some()
            || self.arrival_airport.is_some()
    }

    pub fn matches(&self, booking: &Booking, flight: Option<&Flight>) -> bool {
        let own_fields = field_matches(&self.passenger_id, &booking.passenger_id)
            && field_matches(&self.flight_id, &booking.flight_id)
            && field_matches(&self.class, &booking.class);

        if !own_fields {
            return false;
        }
        if !self.needs_flight() {
            return true;
        }

        match flight {
            Some(flight) if flight.id == booking.flight_id => {
                field_matches(&self.departure_country, &flight.departure_country)
                    && field_matches(&self.destination_country, &flight.destination_country)
                    && field_matches(&self.departure_date, &flight.departure_date)
                    && field_matches(&self.departure_airport, &flight.departure_airport)
                    && field_matches(&self.arrival_airport, &flight.arrival_airport)
                    && self.price.map_or(true, |max_price| {
                        flight
                            .class_details(booking.class)
                            .is_some_and(|d| d.price <= max_price)
                    })
            }
            _ => false,
        }
    }
}

fn field_matches<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
    wanted.as_ref().map_or(true, |w| w == actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlightClassDetails;

    fn sample_flight() -> Flight {
        Flight {
            id: Uuid::new_v4(),
            departure_country: "USA".to_string(),
            destination_country: "UK".to_string(),
            departure_date: "2025-06-01T08:30:00Z".parse().unwrap(),
            departure_airport: "JFK".to_string(),
            arrival_airport: "LHR".to_string(),
            class_details: vec![
                FlightClassDetails::new(FlightClass::Economy, Decimal::from(300), 100),
                FlightClassDetails::new(FlightClass::Business, Decimal::from(1200), 10),
            ],
        }
    }

    #[test]
    fn test_empty_flight_criteria_matches_everything() {
        assert!(FlightSearchCriteria::default().matches(&sample_flight()));
    }

    #[test]
    fn test_flight_criteria_is_a_conjunction() {
        let flight = sample_flight();
        let criteria = FlightSearchCriteria {
            departure_country: Some("USA".to_string()),
            arrival_airport: Some("LHR".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&flight));

        let criteria = FlightSearchCriteria {
            departure_country: Some("USA".to_string()),
            arrival_airport: Some("CDG".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&flight));
    }

    #[test]
    fn test_flight_date_requires_exact_timestamp() {
        let flight = sample_flight();
        let same_day: DateTime<Utc> = "2025-06-01T00:00:00Z".parse().unwrap();
        let criteria = FlightSearchCriteria {
            departure_date: Some(same_day),
            ..Default::default()
        };
        assert!(!criteria.matches(&flight));

        let criteria = FlightSearchCriteria {
            departure_date: Some(flight.departure_date),
            ..Default::default()
        };
        assert!(criteria.matches(&flight));
    }

    #[test]
    fn test_flight_price_is_a_ceiling() {
        let flight = sample_flight();
        let any_class = FlightSearchCriteria {
            price: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert!(any_class.matches(&flight));

        let business = FlightSearchCriteria {
            price: Some(Decimal::from(500)),
            class: Some(FlightClass::Business),
            ..Default::default()
        };
        assert!(!business.matches(&flight));

        let first = FlightSearchCriteria {
            class: Some(FlightClass::FirstClass),
            ..Default::default()
        };
        assert!(!first.matches(&flight));
    }

    #[test]
    fn test_booking_criteria_uses_booked_class_price() {
        let flight = sample_flight();
        let booking = Booking::new(Uuid::new_v4(), flight.id, FlightClass::Business);

        let cheap = BookingSearchCriteria {
            price: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert!(!cheap.matches(&booking, Some(&flight)));

        let exact = BookingSearchCriteria {
            price: Some(Decimal::from(1200)),
            passenger_id: Some(booking.passenger_id),
            class: Some(FlightClass::Business),
            ..Default::default()
        };
        assert!(exact.matches(&booking, Some(&flight)));
    }

    #[test]
    fn test_booking_without_flight_only_matches_own_fields() {
        let booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), FlightClass::Economy);

        let by_passenger = BookingSearchCriteria {
            passenger_id: Some(booking.passenger_id),
            ..Default::default()
        };
        assert!(by_passenger.matches(&booking, None));

        let by_country = BookingSearchCriteria {
            departure_country: Some("USA".to_string()),
            ..Default::default()
        };
        assert!(!by_country.matches(&booking, None));
        assert!(BookingSearchCriteria::default().matches(&booking, None));
    }
}
