mod cli;
mod config;
mod dataset;
mod error;
mod logging;
mod parquet;
mod store;
mod update;
mod weatherapi;

use std::path::Path;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use config::Config;
use store::Store;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let store = config.store()?;

    // With remote storage the log file is kept next to the dataset blob.
    let log_blob = log_blob_name(&config.log_file);
    let log_download = match &store {
        Store::Blob(blob) => Some(blob.download_file(&log_blob, &config.log_file).await),
        Store::File(_) => None,
    };

    logging::init(&config.log_file)?;
    let session = tracing::info_span!("session", user = %logging::username());

    async {
        match log_download {
            Some(Ok(true)) => tracing::info!("Log downloaded from storage"),
            Some(Ok(false)) => tracing::info!("No log in storage, starting a new one"),
            Some(Err(e)) => tracing::warn!("Failed to download log: {:#}", anyhow::Error::new(e)),
            None => {}
        }

        match run(&cli, &config, &store).await {
            Ok(message) => println!("{}", message),
            Err(e) => {
                tracing::error!("{:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }

        tracing::info!("Program terminated");

        if let Store::Blob(blob) = &store {
            if let Err(e) = blob.upload_file(&log_blob, &config.log_file).await {
                eprintln!("Failed to upload log: {:#}", anyhow::Error::new(e));
            }
        }
    }
    .instrument(session)
    .await;

    Ok(())
}

async fn run(cli: &Cli, config: &Config, store: &Store) -> Result<String> {
    match &cli.command {
        Commands::Update {} => command::update(config, store).await,
        Commands::Status {} => command::status(config, store).await,
        Commands::Menu {} => command::menu(config, store).await,
        Commands::View { location } => command::view(store, location).await,
        Commands::Export { output } => command::export(store, output.clone()).await,
    }
}

fn log_blob_name(log_file: &Path) -> String {
    log_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "weather_log.log".to_string())
}
