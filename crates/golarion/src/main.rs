mod auth;
mod commands;
mod config;
mod daily;
mod discord;
mod messages;
mod scheduler;
mod store;
mod version;
mod year_offset;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use crate::{
    config::{open_config, write_default_config},
    store::Store,
    version::{long_version, short_version},
};

#[derive(Parser)]
#[command(version = short_version(), long_version = long_version())]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.init {
        write_default_config(&args.config)?;
        info!(path = ?args.config, "Created default configuration");
        return Ok(());
    }

    info!(version = short_version(), "golarion version");

    let config = open_config(&args.config).context("Failed to load configuration")?;
    info!(
        admins = config.discord.admins.len(),
        year_offset = config.calendar.year_offset,
        schedule = %config.schedule.time,
        "Configuration loaded"
    );

    let store = Store::connect(&config.database.url).await?;
    let inserted = store
        .seed_holidays(&golarion_calendar::seed_holidays())
        .await
        .context("Failed to seed holidays")?;
    info!(inserted, "Holidays seeded");

    discord::run(config, store).await
}
