//! MCP weather server
//!
//! Serves `get_current_weather` and `get_forecast` over stdio, backed by
//! OpenWeatherMap. Started by `skycast` for each session; can also be used by
//! any other MCP client.

#[path = "../telemetry.rs"]
mod telemetry;

use anyhow::{Result, anyhow};
use clap::Parser;
use skycast_application::WeatherToolset;
use skycast_infrastructure::{ConfigLoader, Implementation, McpServer, OpenWeatherClient};
use skycast_presentation::ServerCli;
use std::sync::Arc;
use tracing::info;

const INSTRUCTIONS: &str = "Weather tools backed by OpenWeatherMap. City names may be given \
in any language; add a country code (\"Paris,FR\") to disambiguate.";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = telemetry::init(cli.verbose, config.logging.file.as_deref())?;

    let source = Arc::new(OpenWeatherClient::new(config.weather.to_settings())?);
    let server = McpServer::new(
        Arc::new(WeatherToolset::new(source)),
        Implementation::new("skycast-weather", env!("CARGO_PKG_VERSION")),
    )
    .with_instructions(INSTRUCTIONS);

    server.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("Weather server exited");
    Ok(())
}
