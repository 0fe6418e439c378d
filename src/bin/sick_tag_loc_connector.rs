use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sick_tag_loc_connector::platform::LogPublisher;
use sick_tag_loc_connector::{load_and_validate, MasterController};

/// The SICK Tag-LOC connector
#[derive(Parser)]
#[command(name = "sick-tag-loc-connector")]
struct Args {
    /// Path to the YAML file containing the connector configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Output verbose information
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_and_validate(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    info!("Configuration loaded from {}", args.config.display());
    let refresh_period = Duration::from_secs_f64(config.tag_refresh_secs);

    let mut controller = MasterController::new(Arc::new(config), Arc::new(LogPublisher))
        .await
        .context("enumerating tags")?;
    controller.start().await.context("starting connectors")?;
    info!("Started {} tag connectors", controller.connector_count());

    let mut refresh = tokio::time::interval(refresh_period);
    refresh.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("...exiting");
                break;
            }
            _ = refresh.tick() => {
                if let Err(e) = controller.refresh().await {
                    error!("Tag refresh failed: {e}");
                }
            }
        }
    }

    controller.stop().await.context("stopping connectors")?;
    Ok(())
}
