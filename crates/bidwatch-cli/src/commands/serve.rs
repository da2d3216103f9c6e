use std::sync::Arc;

use bidwatch_core::AppConfig;
use bidwatch_web::AppState;
use tracing::{info, warn};

use crate::error::CliError;

use super::build_multiplexer;

pub async fn run() -> Result<(), CliError> {
    let config = Arc::new(AppConfig::from_env()?);
    let multiplexer = Arc::new(build_multiplexer(&config, false)?);

    bidwatch_web::serve(AppState::new(config, multiplexer), shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("interrupt received, shutting down"),
        Err(error) => warn!(%error, "could not listen for interrupt, shutting down"),
    }
}
