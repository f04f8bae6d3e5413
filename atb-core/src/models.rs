use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Records cached by a repository are keyed by their id
pub trait Identified {
    fn id(&self) -> Uuid;
}

/// Fare tier with its own price and seat capacity on a flight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FlightClass {
    Economy,
    Business,
    FirstClass,
}

impl FlightClass {
    pub const ALL: [FlightClass; 3] = [FlightClass::Economy, FlightClass::Business, FlightClass::FirstClass];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightClass::Economy => "Economy",
            FlightClass::Business => "Business",
            FlightClass::FirstClass => "FirstClass",
        }
    }
}

impl fmt::Display for FlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown flight class: {0}")]
pub struct UnknownFlightClass(pub String);

impl FromStr for FlightClass {
    type Err = UnknownFlightClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "economy" => Ok(FlightClass::Economy),
            "business" => Ok(FlightClass::Business),
            "first" | "firstclass" => Ok(FlightClass::FirstClass),
            _ => Err(UnknownFlightClass(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightClassDetails {
    pub class: FlightClass,
    pub price: Decimal,
    pub capacity: u32,
}

impl FlightClassDetails {
    pub fn new(class: FlightClass, price: Decimal, capacity: u32) -> Self {
        Self { class, price, capacity }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: Uuid,
    pub departure_country: String,
    pub destination_country: String,
    pub departure_date: DateTime<Utc>,
    pub departure_airport: String,
    pub arrival_airport: String,
    #[serde(with = "class_details_column")]
    pub class_details: Vec<FlightClassDetails>,
}

impl Flight {
    /// Details for `class`. When a flight carries duplicate entries the first one wins.
    pub fn class_details(&self, class: FlightClass) -> Option<&FlightClassDetails> {
        self.class_details.iter().find(|d| d.class == class)
    }

    pub fn offers(&self, class: FlightClass) -> bool {
        self.class_details(class).is_some()
    }
}

impl Identified for Flight {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A candidate flight as read from an import file. Every column is optional so
/// that absent values can be reported by the validator instead of failing the read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightDraft {
    pub id: Option<Uuid>,
    pub departure_country: Option<String>,
    pub destination_country: Option<String>,
    pub departure_date: Option<DateTime<Utc>>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    #[serde(default, with = "class_details_column")]
    pub class_details: Vec<FlightClassDetails>,
}

impl FlightDraft {
    /// Converts a complete draft; a draft without an id receives a fresh one.
    pub fn into_flight(self) -> Option<Flight> {
        Some(Flight {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            departure_country: self.departure_country?,
            destination_country: self.destination_country?,
            departure_date: self.departure_date?,
            departure_airport: self.departure_airport?,
            arrival_airport: self.arrival_airport?,
            class_details: self.class_details,
        })
    }
}

impl From<Flight> for FlightDraft {
    fn from(flight: Flight) -> Self {
        Self {
            id: Some(flight.id),
            departure_country: Some(flight.departure_country),
            destination_country: Some(flight.destination_country),
            departure_date: Some(flight.departure_date),
            departure_airport: Some(flight.departure_airport),
            arrival_airport: Some(flight.arrival_airport),
            class_details: flight.class_details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub passport_number: String,
}

impl Identified for Passenger {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A seat reservation. Passenger and flight are referenced by id, not owned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub flight_id: Uuid,
    pub class: FlightClass,
    pub booking_date: DateTime<Utc>,
}

impl Booking {
    pub fn new(passenger_id: Uuid, flight_id: Uuid, class: FlightClass) -> Self {
        Self {
            id: Uuid::new_v4(),
            passenger_id,
            flight_id,
            class,
            booking_date: Utc::now(),
        }
    }
}

impl Identified for Booking {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Single-column encoding of class details: `Class:price:capacity` entries joined by `|`.
pub mod class_details_column {
    use super::{FlightClass, FlightClassDetails};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn encode(details: &[FlightClassDetails]) -> String {
        details
            .iter()
            .map(|d| format!("{}:{}:{}", d.class, d.price, d.capacity))
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn decode(raw: &str) -> Result<Vec<FlightClassDetails>, String> {
        raw.split('|')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
                let [class, price, capacity] = parts.as_slice() else {
                    return Err(format!("expected Class:price:capacity, got '{}'", entry));
                };
                let class: FlightClass = class.parse().map_err(|e| format!("{}", e))?;
                let price: Decimal = price
                    .parse()
                    .map_err(|_| format!("invalid price '{}' for {}", price, class))?;
                let capacity: u32 = capacity
                    .parse()
                    .map_err(|_| format!("invalid capacity '{}' for {}", capacity, class))?;
                Ok(FlightClassDetails { class, price, capacity })
            })
            .collect()
    }

    pub fn serialize<S: Serializer>(details: &[FlightClassDetails], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(details))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FlightClassDetails>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode(&raw).map_err(serde::de::Error::custom)
    }
}
