use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per flight id. Holders of a flight's guard see its
/// check-capacity-then-write sequence as a single step.
#[derive(Default)]
pub struct FlightLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl FlightLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, flight_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(flight_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of flights that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
