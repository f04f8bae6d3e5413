use std::path::Path;

use async_trait::async_trait;

use crate::StorageError;

/// Reads and writes an ordered sequence of records from a delimited text file.
///
/// `read` fails with [`StorageError::NotFound`] for a missing path and returns an
/// empty sequence for an empty file. `write` replaces the previous contents.
#[async_trait]
pub trait RecordStore<T>: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<T>, StorageError>;

    async fn write(&self, path: &Path, records: &[T]) -> Result<(), StorageError>;
}
