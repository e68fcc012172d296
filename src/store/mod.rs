//! Loading and saving the dataset as a whole.

pub mod blob;
pub mod file;

pub use blob::BlobStore;
pub use file::FileStore;

use crate::{dataset::Dataset, error::StoreError};

#[allow(async_fn_in_trait)]
pub trait DatasetStore {
    /// Returns an empty dataset when nothing has been persisted yet.
    async fn load(&self) -> Result<Dataset, StoreError>;

    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError>;
}

/// The store selected by configuration.
#[derive(Debug)]
pub enum Store {
    File(FileStore),
    Blob(BlobStore),
}

impl Store {
    pub fn describe(&self) -> String {
        match self {
            Store::File(store) => store.path().display().to_string(),
            Store::Blob(store) => format!("blob '{}'", store.blob_name()),
        }
    }
}

impl DatasetStore for Store {
    async fn load(&self) -> Result<Dataset, StoreError> {
        match self {
            Store::File(store) => store.load().await,
            Store::Blob(store) => store.load().await,
        }
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        match self {
            Store::File(store) => store.save(dataset).await,
            Store::Blob(store) => store.save(dataset).await,
        }
    }
}

fn encode(dataset: &Dataset) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(dataset).map_err(StoreError::Encode)
}

fn decode(bytes: &[u8]) -> Result<Dataset, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Dataset::new());
    }
    serde_json::from_slice(bytes).map_err(StoreError::Decode)
}

// -- Tests -------------------------------------------------------------------
