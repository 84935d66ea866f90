//! Match Day Cover CLI
//!
//! Quote, recommend, simulate, and play through rain cover for T20 tickets:
//! - stadiums / tiers: reference data
//! - quote / recommend: live or manual rain risk to premiums
//! - play: buy cover, simulate the match, settle into the stored wallet

mod cli;
mod commands;
mod config;
mod display;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cover_engine::EngineConfig;
use tracing::debug;

use crate::cli::Cli;
use crate::commands::App;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::load(&cli);
    logging::initialize_logging(&config.logging)?;

    let engine = EngineConfig::load(config.engine_config.as_deref())
        .context("Failed to load engine configuration")?;
    debug!("Loaded configuration: {:?}", config);

    let app = App::new(config, engine, cli.json);
    app.run(cli.command).await
}
