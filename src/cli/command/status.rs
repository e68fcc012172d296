//! Report how far the stored data reaches.

use anyhow::Result;

use super::load_dataset;
use crate::{config::Config, dataset::Dataset, store::Store};

pub async fn status(config: &Config, store: &Store) -> Result<String> {
    tracing::info!("Data availability check...");
    let dataset = load_dataset(store).await?;

    Ok(availability(&dataset, &config.anchor_location))
}

pub fn availability(dataset: &Dataset, anchor: &str) -> String {
    let range = dataset
        .get(anchor)
        .and_then(|history| Some((history.earliest_date()?, history.latest_date()?)));

    match range {
        Some((first, latest)) => format!("Data available between {} - {}", first, latest),
        None => "No data available".to_string(),
    }
}

// -- Tests -------------------------------------------------------------------
