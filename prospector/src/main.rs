use std::{net::TcpListener, path::Path};

use anyhow::Context;
use prospector::{
    configuration::get_configuration,
    services::{RateLimiter, SearchPipeline},
    startup::run,
    telemetry::init_logger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().context("Failed to read configuration.")?;
    init_logger(configuration.application.log_file.as_deref().map(Path::new))
        .context("Failed to open log file.")?;

    if configuration.api_keys.google_credentials().is_err() {
        log::warn!("Google API key or Search Engine ID missing, searches will fail until set");
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;

    let pipeline = SearchPipeline::new(configuration.search, configuration.api_keys)?;
    let rate_limiter = RateLimiter::new(&configuration.rate_limit);

    log::info!("Starting lead search service on {}", address);
    run(listener, pipeline, rate_limiter)?.await?;

    Ok(())
}
