//! Declarative field rules for records entering the system.
//!
//! Each validated type publishes a static rule table and exposes its field values
//! by name. `validate` reports every violation as `Error in <field>: <message>`;
//! `describe` renders the same table for tooling.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{FlightClassDetails, FlightDraft, Passenger};

static AIRPORT_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));
static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9 ()-]{7,20}$").expect("valid regex"));
static PASSPORT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{6,9}$").expect("valid regex"));

/// A field value as seen by the validator
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Timestamp(Option<&'a DateTime<Utc>>),
    Classes(&'a [FlightClassDetails]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAttribute {
    Price,
    Capacity,
}

pub enum Constraint {
    Required,
    MaxLength(usize),
    Pattern {
        regex: &'static Lazy<Regex>,
        format: &'static str,
    },
    NonEmpty,
    UniqueClasses,
    EachInRange {
        attribute: ClassAttribute,
        min: i64,
        max: i64,
    },
}

impl Constraint {
    pub fn describe(&self) -> String {
        match self {
            Constraint::Required => "Required".to_string(),
            Constraint::MaxLength(max) => format!("Max length: {}", max),
            Constraint::Pattern { format, .. } => format!("Format: {}", format),
            Constraint::NonEmpty => "At least one entry".to_string(),
            Constraint::UniqueClasses => "One entry per class".to_string(),
            Constraint::EachInRange { attribute, min, max } => {
                let name = match attribute {
                    ClassAttribute::Price => "Price",
                    ClassAttribute::Capacity => "Capacity",
                };
                format!("{} range: {} to {}", name, min, max)
            }
        }
    }

    /// Violation messages for `value`; absent values only violate `Required`.
    fn check(&self, value: FieldValue<'_>) -> Vec<String> {
        match (self, value) {
            (Constraint::Required, FieldValue::Text(text)) => {
                if text.map_or(true, |t| t.trim().is_empty()) {
                    return vec!["is required".to_string()];
                }
                Vec::new()
            }
            (Constraint::Required, FieldValue::Timestamp(None)) => vec!["is required".to_string()],
            (Constraint::MaxLength(max), FieldValue::Text(Some(text))) if text.chars().count() > *max => {
                vec![format!("must be at most {} characters", max)]
            }
            (Constraint::Pattern { regex, format }, FieldValue::Text(Some(text)))
                if !text.trim().is_empty() && !regex.is_match(text) =>
            {
                vec![format!("must match the format {}", format)]
            }
            (Constraint::NonEmpty, FieldValue::Classes(classes)) if classes.is_empty() => {
                vec!["must contain at least one entry".to_string()]
            }
            (Constraint::UniqueClasses, FieldValue::Classes(classes)) => {
                let mut seen = HashSet::new();
                let mut reported = HashSet::new();
                classes
                    .iter()
                    .filter(|d| !seen.insert(d.class) && reported.insert(d.class))
                    .map(|d| format!("contains more than one entry for {}", d.class))
                    .collect()
            }
            (Constraint::EachInRange { attribute, min, max }, FieldValue::Classes(classes)) => {
                let (low, high) = (Decimal::from(*min), Decimal::from(*max));
                classes
                    .iter()
                    .filter_map(|d| {
                        let (name, value) = match attribute {
                            ClassAttribute::Price => ("price", d.price),
                            ClassAttribute::Capacity => ("capacity", Decimal::from(d.capacity)),
                        };
                        (value < low || value > high).then(|| {
                            format!("{} {} must be between {} and {}", d.class, name, min, max)
                        })
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

pub struct FieldRule {
    pub field: &'static str,
    pub constraints: &'static [Constraint],
}

pub trait Validate {
    fn rules() -> &'static [FieldRule]
    where
        Self: Sized;

    fn field_value(&self, field: &str) -> Option<FieldValue<'_>>;

    fn validate(&self) -> Vec<String>
    where
        Self: Sized,
    {
        let mut errors = Vec::new();
        for rule in Self::rules() {
            let Some(value) = self.field_value(rule.field) else {
                continue;
            };
            for constraint in rule.constraints {
                errors.extend(
                    constraint
                        .check(value)
                        .into_iter()
                        .map(|message| format!("Error in {}: {}", rule.field, message)),
                );
            }
        }
        errors
    }

    /// Field name to a human-readable summary of its constraints
    fn describe() -> IndexMap<&'static str, String>
    where
        Self: Sized,
    {
        Self::rules()
            .iter()
            .map(|rule| {
                let summary = rule
                    .constraints
                    .iter()
                    .map(Constraint::describe)
                    .collect::<Vec<_>>()
                    .join(", ");
                (rule.field, summary)
            })
            .collect()
    }
}

static FLIGHT_RULES: &[FieldRule] = &[
    FieldRule {
        field: "departure_country",
        constraints: &[Constraint::Required, Constraint::MaxLength(64)],
    },
    FieldRule {
        field: "destination_country",
        constraints: &[Constraint::Required, Constraint::MaxLength(64)],
    },
    FieldRule {
        field: "departure_date",
        constraints: &[Constraint::Required],
    },
    FieldRule {
        field: "departure_airport",
        constraints: &[
            Constraint::Required,
            Constraint::Pattern { regex: &AIRPORT_CODE, format: "three-letter IATA code" },
        ],
    },
    FieldRule {
        field: "arrival_airport",
        constraints: &[
            Constraint::Required,
            Constraint::Pattern { regex: &AIRPORT_CODE, format: "three-letter IATA code" },
        ],
    },
    FieldRule {
        field: "class_details",
        constraints: &[
            Constraint::NonEmpty,
            Constraint::UniqueClasses,
            Constraint::EachInRange { attribute: ClassAttribute::Price, min: 0, max: 10_000 },
            Constraint::EachInRange { attribute: ClassAttribute::Capacity, min: 0, max: 1_000 },
        ],
    },
];

impl Validate for FlightDraft {
    fn rules() -> &'static [FieldRule] {
        FLIGHT_RULES
    }

    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "departure_country" => FieldValue::Text(self.departure_country.as_deref()),
            "destination_country" => FieldValue::Text(self.destination_country.as_deref()),
            "departure_date" => FieldValue::Timestamp(self.departure_date.as_ref()),
            "departure_airport" => FieldValue::Text(self.departure_airport.as_deref()),
            "arrival_airport" => FieldValue::Text(self.arrival_airport.as_deref()),
            "class_details" => FieldValue::Classes(&self.class_details),
            _ => return None,
        };
        Some(value)
    }
}

static PASSENGER_RULES: &[FieldRule] = &[
    FieldRule {
        field: "name",
        constraints: &[Constraint::Required, Constraint::MaxLength(100)],
    },
    FieldRule {
        field: "email",
        constraints: &[
            Constraint::Required,
            Constraint::Pattern { regex: &EMAIL, format: "email address" },
        ],
    },
    FieldRule {
        field: "phone_number",
        constraints: &[
            Constraint::Required,
            Constraint::Pattern { regex: &PHONE_NUMBER, format: "7-20 digits, optional leading +" },
        ],
    },
    FieldRule {
        field: "passport_number",
        constraints: &[
            Constraint::Required,
            Constraint::Pattern { regex: &PASSPORT_NUMBER, format: "6-9 uppercase letters or digits" },
        ],
    },
];

impl Validate for Passenger {
    fn rules() -> &'static [FieldRule] {
        PASSENGER_RULES
    }

    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "name" => FieldValue::Text(Some(&self.name)),
            "email" => FieldValue::Text(Some(&self.email)),
            "phone_number" => FieldValue::Text(Some(&self.phone_number)),
            "passport_number" => FieldValue::Text(Some(&self.passport_number)),
            _ => return None,
        };
        Some(value)
    }
}
