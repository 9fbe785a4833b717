pub mod cli;
pub mod core;
pub mod market;
pub mod providers;
pub mod store;

pub use crate::core::config;

use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Import,
    Prices,
    Portfolio,
    Streaks,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("zai starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!(
        symbol = %config.symbol,
        contributions = %config.contributions.display(),
        lookback_days = config.lookback_days,
        "Loaded config"
    );

    match command {
        AppCommand::Import => cli::import::run(&config),
        AppCommand::Streaks => cli::streaks::run(&config),
        AppCommand::Summary => cli::summary::run(&config, &orchestrator(&config)).await,
        AppCommand::Prices => cli::prices::run(&config.symbol, &orchestrator(&config)).await,
        AppCommand::Portfolio => cli::portfolio::run(&config, &orchestrator(&config)).await,
    }
}

fn orchestrator(config: &config::AppConfig) -> providers::orchestrator::PriceOrchestrator {
    let cache = store::open_price_cache(config);
    providers::build_orchestrator(config, cache)
}
