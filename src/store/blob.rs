//! Dataset kept in a remote blob container.
//!
//! The container is addressed by a URL carrying a shared access signature,
//! e.g. `https://account.blob.core.windows.net/weather?sv=...&sig=...`. Blobs
//! are plain block blobs read with `GET` and replaced with `PUT`.

use std::{path::Path, time::Duration};

use reqwest::{Client, StatusCode};
use url::Url;

use super::{decode, encode, DatasetStore};
use crate::{dataset::Dataset, error::StoreError};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct BlobStore {
    client: Client,
    container: Url,
    blob_name: String,
}

impl BlobStore {
    pub fn new(container_url: &str, blob_name: &str) -> Result<Self, StoreError> {
        let container = Url::parse(container_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StoreError::InvalidUrl(redact(container_url)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| StoreError::Request {
                blob: blob_name.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            container,
            blob_name: blob_name.to_string(),
        })
    }

    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    fn blob_url(&self, name: &str) -> Result<Url, StoreError> {
        let mut url = self.container.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(redact(self.container.as_str())))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Fetches a blob, `None` when it does not exist.
    pub async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let request_err = |source| StoreError::Request {
            blob: name.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.blob_url(name)?)
            .send()
            .await
            .map_err(request_err)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(request_err)?;
                Ok(Some(bytes.to_vec()))
            }
            status => Err(StoreError::Status {
                blob: name.to_string(),
                status,
            }),
        }
    }

    /// Creates or overwrites a blob.
    pub async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.blob_url(name)?)
            .header("x-ms-blob-type", "BlockBlob")
            .body(bytes)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                blob: name.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                blob: name.to_string(),
                status,
            });
        }

        Ok(())
    }

    /// Copies blob `name` to `path`. Returns `false` if the blob is absent.
    pub async fn download_file(&self, name: &str, path: &Path) -> Result<bool, StoreError> {
        match self.get(name).await? {
            Some(bytes) => {
                std::fs::write(path, bytes).map_err(|e| StoreError::Io(path.to_path_buf(), e))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn upload_file(&self, name: &str, path: &Path) -> Result<(), StoreError> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::Io(path.to_path_buf(), e))?;
        self.put(name, bytes).await
    }
}

impl DatasetStore for BlobStore {
    async fn load(&self) -> Result<Dataset, StoreError> {
        match self.get(&self.blob_name).await? {
            Some(bytes) => decode(&bytes),
            None => Ok(Dataset::new()),
        }
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        self.put(&self.blob_name, encode(dataset)?).await
    }
}

/// Drops the query string so signatures never end up in messages.
fn redact(url: &str) -> String {
    url.split('?').next().unwrap_or_default().to_string()
}

// -- Tests -------------------------------------------------------------------
