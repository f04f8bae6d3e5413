use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use atb_core::store::RecordStore;
use atb_core::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Comma-separated files with a header row named after the record fields
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFileStore;

impl CsvFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> RecordStore<T> for CsvFileStore
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self, path: &Path) -> Result<Vec<T>, StorageError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(StorageError::Io { path: path.to_path_buf(), source });
            }
        };

        let records = decode(path, &bytes)?;
        debug!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    async fn write(&self, path: &Path, records: &[T]) -> Result<(), StorageError> {
        let bytes = encode(path, records)?;

        // Stage next to the target so the rename stays on one filesystem
        let staging = staging_path(path);
        let staged = match tokio::fs::write(&staging, &bytes).await {
            Ok(()) => tokio::fs::rename(&staging, path).await,
            Err(e) => Err(e),
        };

        if let Err(source) = staged {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StorageError::Io { path: path.to_path_buf(), source });
        }

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<Vec<T>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|e| StorageError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn encode<T: Serialize>(path: &Path, records: &[T]) -> Result<Vec<u8>, StorageError> {
    let malformed = |message: String| StorageError::Malformed { path: path.to_path_buf(), message };

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).map_err(|e| malformed(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| malformed(e.to_string()))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
