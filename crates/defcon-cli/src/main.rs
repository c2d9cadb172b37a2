mod cli;
mod commands;
mod observability;
mod output;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use defcon_config::{FileSource, LoggingSettings};

use cli::{Cli, Commands, ListCommand};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        observability::log_failure(&e);
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let bootstrap_level = LoggingSettings::default().level;
    observability::init_tracing(cli.log_level.as_deref().unwrap_or(&bootstrap_level));

    let settings = FileSource::resolve(cli.config.as_deref())
        .load()
        .context("Failed to load settings")?;
    if cli.log_level.is_none() {
        observability::apply_logging_level(&settings.logging.level);
    }

    let choice = store::choose(&settings.storage, cli.backend, cli.database_url.as_deref());
    let store = store::open(choice).await?;

    match &cli.command {
        Commands::LoadComponents => {
            commands::sync::load_components(store.as_ref(), &settings).await?;
        }
        Commands::LoadPlugins => {
            commands::sync::load_plugins(store.as_ref(), &settings).await?;
        }
        Commands::Sync => {
            commands::sync::sync(store.as_ref(), &settings).await?;
        }
        Commands::Components(args) => match &args.command {
            ListCommand::List(list) => {
                commands::components::list(store.as_ref(), list.format).await?;
            }
        },
        Commands::Plugins(args) => match &args.command {
            ListCommand::List(list) => {
                commands::plugins::list(store.as_ref(), list.format).await?;
            }
        },
    }

    Ok(())
}
