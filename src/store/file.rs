//! Dataset kept as a JSON file on the local file system.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use super::{decode, encode, DatasetStore};
use crate::{dataset::Dataset, error::StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetStore for FileStore {
    async fn load(&self) -> Result<Dataset, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => decode(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Dataset::new()),
            Err(e) => Err(StoreError::Io(self.path.clone(), e)),
        }
    }

    /// Writes to a sibling temporary file and renames it over the target, so
    /// a failed save leaves the previous file intact.
    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let bytes = encode(dataset)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |e| StoreError::Io(self.path.clone(), e);

        fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
