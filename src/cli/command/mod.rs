pub mod export;
pub mod menu;
pub mod status;
pub mod update;
pub mod view;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
pub use export::export;
pub use menu::menu;
pub use status::status;
pub use update::update;
pub use view::view;

use crate::{
    dataset::Dataset,
    store::{DatasetStore, Store},
};

pub fn make_parquet_file_name() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(parquet_file_name(Local::now().date_naive())))
}

/// `weather-YYYY-MM-DD.parquet` for `date`.
pub fn parquet_file_name(date: NaiveDate) -> String {
    format!("weather-{}.parquet", date.format("%Y-%m-%d"))
}

async fn load_dataset(store: &Store) -> Result<Dataset> {
    tracing::info!("Loading data from {}", store.describe());
    let dataset = store
        .load()
        .await
        .with_context(|| format!("Failed to load data from {}", store.describe()))?;
    tracing::info!("Loaded {} locations", dataset.len());

    Ok(dataset)
}
