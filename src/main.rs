use crate::app::App;
use crate::app_config::AppConfig;
use crate::pipeline::Pipeline;
use crate::resolver::{GeolocationResolver, IpResolver};
use crate::search_form::SearchQuery;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod app;
mod app_config;
mod domain;
mod geolocation_deserializer;
mod http_client;
mod pipeline;
mod presentation;
mod resolver;
mod search_form;
mod store;

/// Shows where an IP address or domain is located, starting with your own.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// IP address or domain to look up instead of your own address
    query: Option<String>,
    /// Render the first lookup and exit instead of prompting for searches
    #[arg(long)]
    once: bool,
    /// Configuration file to read instead of ./config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Arc::new(AppConfig::load(cli.config.as_deref())?);
    tracing_subscriber::fmt()
        .with_max_level(config.core().log_level()?)
        .with_writer(std::io::stderr)
        .init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("✅  Loaded configuration");

    let query = cli.query.as_deref().map(SearchQuery::parse).transpose()?;

    let client = http_client::new_client(&config)?;
    let pipeline = Pipeline::new(
        Arc::new(IpResolver::new(client.clone(), &config)),
        Arc::new(GeolocationResolver::new(client, config.geolocation(), config.http())),
    );
    info!("✅  Initialized resolvers");

    let app = App::new(config.clone(), pipeline);
    if cli.once {
        app.run_once(query).await?;
    } else {
        app.run_interactive(query).await?;
    }

    info!("👋 {} stopped", env!("CARGO_PKG_NAME"));
    Ok(())
}
