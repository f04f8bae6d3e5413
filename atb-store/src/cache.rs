use std::path::{Path, PathBuf};
use std::sync::Arc;

use atb_core::models::Identified;
use atb_core::store::RecordStore;
use atb_core::StorageError;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{error, warn};
use uuid::Uuid;

/// Id-keyed, insertion-ordered mirror of one data file.
///
/// Mutations hold the write lock across the whole stage, persist, swap sequence:
/// the cache only changes after the file has been rewritten.
pub(crate) struct CachedTable<T> {
    store: Arc<dyn RecordStore<T>>,
    path: PathBuf,
    records: RwLock<IndexMap<Uuid, T>>,
}

impl<T> CachedTable<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub async fn load(store: Arc<dyn RecordStore<T>>, path: PathBuf) -> Result<Self, StorageError> {
        let rows = store.read(&path).await?;

        let mut records = IndexMap::with_capacity(rows.len());
        for row in rows {
            let id = row.id();
            if records.insert(id, row).is_some() {
                warn!("Duplicate id {} in {}, keeping the last row", id, path.display());
            }
        }

        Ok(Self {
            store,
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn all(&self) -> Vec<T> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.records
            .read()
            .await
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Applies `change` to a staged copy. When it reports a change the staged copy
    /// is written to the store and only then replaces the cache.
    pub async fn mutate<F, R>(&self, change: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut IndexMap<Uuid, T>) -> (bool, R) + Send,
        R: Send,
    {
        let mut records = self.records.write().await;
        let mut staged = records.clone();

        let (changed, outcome) = change(&mut staged);
        if !changed {
            return Ok(outcome);
        }

        let rows: Vec<T> = staged.values().cloned().collect();
        if let Err(e) = self.store.write(&self.path, &rows).await {
            error!("Failed to persist {}: {}", self.path.display(), e);
            return Err(e);
        }

        *records = staged;
        Ok(outcome)
    }
}
