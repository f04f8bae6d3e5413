use std::path::PathBuf;

use atb_core::models::FlightClass;
use atb_core::{BookingSearchCriteria, FlightSearchCriteria};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "atb", about = "Airport ticket booking", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search flights that still have seats left
    Flights(FlightFilter),
    /// Book a seat for a passenger
    Book {
        #[arg(long)]
        flight: Uuid,
        #[arg(long)]
        passenger: Uuid,
        #[arg(long, default_value = "economy")]
        class: FlightClass,
    },
    /// Cancel a booking and free its seat
    Cancel {
        #[arg(long)]
        booking: Uuid,
    },
    /// Move a booking to another class on the same flight
    Modify {
        #[arg(long)]
        booking: Uuid,
        #[arg(long)]
        class: FlightClass,
    },
    /// List a passenger's bookings
    Bookings {
        #[arg(long)]
        passenger: Uuid,
    },
    /// Filter every booking (manager view)
    FilterBookings {
        #[arg(long)]
        passenger: Option<Uuid>,
        #[arg(long)]
        flight: Option<Uuid>,
        #[command(flatten)]
        route: FlightFilter,
    },
    /// Import flights from a CSV file and report rejected records
    Import {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Show the field rules applied to imported flights
    Rules,
}

#[derive(Args, Debug, Default)]
pub struct FlightFilter {
    /// Highest acceptable price
    #[arg(long)]
    pub max_price: Option<Decimal>,
    #[arg(long)]
    pub departure_country: Option<String>,
    #[arg(long)]
    pub destination_country: Option<String>,
    /// Exact departure timestamp, RFC 3339
    #[arg(long)]
    pub departure_date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub departure_airport: Option<String>,
    #[arg(long)]
    pub arrival_airport: Option<String>,
    #[arg(long)]
    pub class: Option<FlightClass>,
}

impl From<FlightFilter> for FlightSearchCriteria {
    fn from(filter: FlightFilter) -> Self {
        Self {
            price: filter.max_price,
            departure_country: filter.departure_country,
            destination_country: filter.destination_country,
            departure_date: filter.departure_date,
            departure_airport: filter.departure_airport,
            arrival_airport: filter.arrival_airport,
            class: filter.class,
        }
    }
}

impl FlightFilter {
    pub fn into_booking_criteria(self, passenger_id: Option<Uuid>, flight_id: Option<Uuid>) -> BookingSearchCriteria {
        BookingSearchCriteria {
            passenger_id,
            flight_id,
            price: self.max_price,
            departure_country: self.departure_country,
            destination_country: self.destination_country,
            departure_date: self.departure_date,
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
            class: self.class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book() {
        let flight = Uuid::new_v4();
        let passenger = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "atb",
            "book",
            "--flight",
            &flight.to_string(),
            "--passenger",
            &passenger.to_string(),
            "--class",
            "first class",
        ])
        .unwrap();

        match cli.command {
            Command::Book { flight: f, passenger: p, class } => {
                assert_eq!((f, p, class), (flight, passenger, FlightClass::FirstClass));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_filter_bookings_criteria() {
        let cli = Cli::try_parse_from([
            "atb",
            "filter-bookings",
            "--departure-country",
            "Jordan",
            "--max-price",
            "300.50",
        ])
        .unwrap();

        let Command::FilterBookings { passenger, flight, route } = cli.command else {
            panic!("expected filter-bookings");
        };
        let criteria = route.into_booking_criteria(passenger, flight);
        assert_eq!(criteria.departure_country.as_deref(), Some("Jordan"));
        assert_eq!(criteria.price, Some(Decimal::new(30050, 2)));
        assert!(criteria.passenger_id.is_none());
    }

    #[test]
    fn test_every_command_has_help() {
        use clap::CommandFactory;

        let cli = Cli::command();
        let undocumented: Vec<_> = cli
            .get_subcommands()
            .filter(|c| c.get_about().is_none())
            .map(|c| c.get_name().to_string())
            .collect();
        assert!(undocumented.is_empty(), "no help text for {:?}", undocumented);
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let result = Cli::try_parse_from(["atb", "flights", "--class", "premium"]);
        assert!(result.is_err());
    }
}
