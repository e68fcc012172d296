//! Fetch missing days for every configured city and save the result.

use anyhow::{Context, Error, Result};

use super::load_dataset;
use crate::{
    cli::create_spinner,
    config::Config,
    dataset::{Clock, Dataset, DateWindow, SystemClock},
    error::FetchError,
    logging::TracingLog,
    store::{DatasetStore, Store},
    update::{self as updater, FetchedHistory, HistorySource, UpdateOutcome},
    weatherapi::WeatherApiClient,
};

pub async fn update(config: &Config, store: &Store) -> Result<String> {
    let mut dataset = load_dataset(store).await?;
    apply(config, store, &mut dataset).await
}

/// Updates `dataset` in place and saves it when new days were merged.
pub async fn apply(config: &Config, store: &Store, dataset: &mut Dataset) -> Result<String> {
    apply_at(config, store, dataset, &SystemClock).await
}

async fn apply_at<C: Clock>(
    config: &Config,
    store: &Store,
    dataset: &mut Dataset,
    clock: &C,
) -> Result<String> {
    let client = WeatherApiClient::new(&config.base_url, config.api_key()?)?;
    let source = WithSpinner(client);

    tracing::info!("Updating data...");
    let outcome = updater::update(
        dataset,
        &config.cities,
        &source,
        clock,
        &config.policy(),
        &TracingLog,
    )
    .await?;

    match outcome {
        UpdateOutcome::UpToDate => Ok("Nothing to update, most recent data available".to_string()),
        UpdateOutcome::Updated { window } => {
            store
                .save(dataset)
                .await
                .with_context(|| format!("Failed to save data to {}", store.describe()))?;
            tracing::info!("Saved data to {}", store.describe());

            Ok(format!(
                "Fetched {} for {} cities, saved to {}",
                window,
                config.cities.len(),
                store.describe()
            ))
        }
        UpdateOutcome::Failed { location, error } => Err(Error::new(error)
            .context(format!("Update aborted at '{}', nothing was saved", location))),
    }
}

/// Shows a spinner while each city is fetched.
struct WithSpinner<S>(S);

impl<S: HistorySource> HistorySource for WithSpinner<S> {
    async fn fetch(
        &self,
        location: &str,
        window: &DateWindow,
    ) -> Result<FetchedHistory, FetchError> {
        let bar = create_spinner(format!("Fetching {}...", location));
        let result = self.0.fetch(location, window).await;

        match &result {
            Ok(fetched) => bar.finish_with_message(format!("Fetched {}", fetched.location)),
            Err(_) => bar.abandon_with_message(format!("Request for {} failed", location)),
        }

        result
    }
}

// -- Tests -------------------------------------------------------------------
