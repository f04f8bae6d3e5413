use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use atb_core::models::{Flight, FlightDraft};
use atb_core::repository::FlightRepository;
use atb_core::search::FlightSearchCriteria;
use atb_core::store::RecordStore;
use atb_core::validation::Validate;
use atb_core::{CoreError, CoreResult};
use futures_util::stream::{self, StreamExt};
use indexmap::IndexMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::SeatAvailability;

/// Flight lookup, seat-aware search and bulk import
pub struct FlightCatalog {
    flights: Arc<dyn FlightRepository>,
    availability: SeatAvailability,
    drafts: Arc<dyn RecordStore<FlightDraft>>,
}

impl FlightCatalog {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        availability: SeatAvailability,
        drafts: Arc<dyn RecordStore<FlightDraft>>,
    ) -> Self {
        Self { flights, availability, drafts }
    }

    pub async fn get_by_id(&self, id: Uuid) -> CoreResult<Flight> {
        self.flights
            .get_by_id(id)
            .await
            .ok_or_else(|| CoreError::flight_not_found(id))
    }

    pub async fn get_all(&self) -> Vec<Flight> {
        self.flights.get_all().await
    }

    /// Criteria matches that still have seats left in the requested class,
    /// or in any offered class when the criteria names none.
    pub async fn get_available_flights_matching_criteria(&self, criteria: &FlightSearchCriteria) -> Vec<Flight> {
        let candidates = self.flights.get_matching_criteria(Some(criteria)).await;
        let class = criteria.class;

        stream::iter(candidates)
            .filter_map(|flight| async move {
                let available = match class {
                    Some(class) => self.availability.is_class_available(&flight, class).await,
                    None => self.has_any_seat(&flight).await,
                };
                available.then_some(flight)
            })
            .collect::<Vec<_>>()
            .await
    }

    async fn has_any_seat(&self, flight: &Flight) -> bool {
        for details in &flight.class_details {
            if self.availability.is_class_available(flight, details.class).await {
                return true;
            }
        }
        false
    }

    /// Imports candidate flights from `path`.
    ///
    /// Every valid candidate is persisted in one batch; the violations of the
    /// rejected ones are returned. An empty result means everything was imported.
    pub async fn import_flights(&self, path: &Path) -> CoreResult<Vec<String>> {
        let drafts = self.drafts.read(path).await?;
        let total = drafts.len();

        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut accepted = Vec::new();
        let mut violations = Vec::new();

        for (index, draft) in drafts.into_iter().enumerate() {
            let mut errors = draft.validate();
            if let Some(id) = draft.id {
                if seen.contains(&id) || self.flights.get_by_id(id).await.is_some() {
                    errors.push(format!("Error in id: flight {} already exists", id));
                }
            }

            if !errors.is_empty() {
                // Header is line 1
                warn!("Rejected flight on line {} of {}: {}", index + 2, path.display(), errors.join("; "));
                violations.extend(errors);
                continue;
            }

            match draft.into_flight() {
                Some(flight) => {
                    seen.insert(flight.id);
                    accepted.push(flight);
                }
                None => violations.push(format!("Error in record {}: incomplete flight", index + 1)),
            }
        }

        let imported = accepted.len();
        if !accepted.is_empty() {
            self.flights.add(accepted).await?;
        }

        info!(
            "Imported {} of {} flights from {} ({} violations)",
            imported,
            total,
            path.display(),
            violations.len()
        );
        Ok(violations)
    }

    /// Field name to constraint summary for import files
    pub fn validation_rules(&self) -> IndexMap<&'static str, String> {
        FlightDraft::describe()
    }
}
