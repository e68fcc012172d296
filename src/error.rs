//! Error kinds surfaced by the update pipeline and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// The anchor location is missing from a dataset that already holds data, so
/// the resume point cannot be determined.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Dataset is not empty but anchor location '{anchor}' is missing")]
pub struct InconsistentDataset {
    pub anchor: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for '{location}' failed")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for '{location}' returned status {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response for '{location}': {message}")]
    Malformed { location: String, message: String },

    #[error("Response for '{location}' holds {found} days, expected {expected}")]
    ShortPayload {
        location: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode dataset")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode dataset")]
    Decode(#[source] serde_json::Error),

    #[error("Blob request for '{blob}' failed")]
    Request {
        blob: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Blob request for '{blob}' returned status {status}")]
    Status {
        blob: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid blob container URL '{0}'")]
    InvalidUrl(String),
}
