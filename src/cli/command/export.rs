use std::path::PathBuf;

use anyhow::Result;

use super::{load_dataset, make_parquet_file_name};
use crate::{parquet, store::Store};

pub async fn export(store: &Store, output: Option<PathBuf>) -> Result<String> {
    let dataset = load_dataset(store).await?;
    let file_path = match output {
        Some(path) => path,
        None => make_parquet_file_name()?,
    };

    let rows = parquet::save_dataset(&dataset, &file_path)?;
    tracing::info!("Exported {} rows to {}", rows, file_path.display());

    Ok(format!("{} rows saved to `{}`", rows, file_path.to_string_lossy()))
}

// -- Tests -------------------------------------------------------------------
