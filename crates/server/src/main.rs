//! World server entry point: load configuration, start logging, load every
//! DB2 data store or exit with the bootstrap error's code.
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::{Context, Result};
use config::ServerConfig;
use game_content::{BootstrapError, DataStores, SnapshotSource};

fn main() -> ExitCode {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

fn run() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load server configuration")?;
    let _guard = logging::init(config.log_path().as_deref())?;

    tracing::info!(
        "Loading DB2 data from {} (default locale {})",
        config.data_dir.display(),
        config.default_locale
    );

    let stores = DataStores::load(&config.bootstrap(), &SnapshotSource::new())?;

    for (_, store) in stores.registry().iter() {
        tracing::debug!(
            "{}: {} records, {} fields",
            store.table_name(),
            store.len(),
            store.field_count()
        );
    }
    tracing::info!("World data ready ({} tables)", stores.len());

    Ok(())
}

/// Process exit code for a failed run.
///
/// Bootstrap failures carry their own code; anything else exits with 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<BootstrapError>()
        .map_or(ExitCode::FAILURE, |err| ExitCode::from(err.exit_code()))
}
