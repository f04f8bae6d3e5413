use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use atb_core::store::RecordStore;
use atb_core::StorageError;
use tokio::sync::Mutex;

/// In-memory record store keyed by path. Writes can be made to fail on demand.
pub struct MemoryStore<T> {
    files: Mutex<HashMap<PathBuf, Vec<T>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl<T: Clone + Send + Sync> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Store pre-populated with one file
    pub fn with_file(path: impl Into<PathBuf>, records: Vec<T>) -> Self {
        Self {
            files: Mutex::new(HashMap::from([(path.into(), records)])),
            ..Self::new()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn contents(&self, path: &Path) -> Option<Vec<T>> {
        self.files.lock().await.get(path).cloned()
    }
}

impl<T: Clone + Send + Sync> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> RecordStore<T> for MemoryStore<T> {
    async fn read(&self, path: &Path) -> Result<Vec<T>, StorageError> {
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    async fn write(&self, path: &Path, records: &[T]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        self.files.lock().await.insert(path.to_path_buf(), records.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
