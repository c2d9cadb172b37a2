use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use defcon_config::StorageBackend;

#[derive(Debug, Parser)]
#[command(name = "defcon")]
#[command(about = "Load status-page components and plugins from a settings file into storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML, or JSON by extension). Defaults to ./defcon.toml if present
    #[arg(short, long, global = true, env = "DEFCON_CONFIG")]
    pub config: Option<PathBuf>,

    /// PostgreSQL URL (overrides storage.postgres.url and selects the postgres backend)
    #[arg(long, global = true, env = "DEFCON_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Storage backend: postgres or memory
    #[arg(long, global = true)]
    pub backend: Option<StorageBackend>,

    /// Log filter directive, e.g. "debug" or "defcon_sync=trace" (RUST_LOG wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile stored components and plugin instances with the settings file
    LoadComponents,
    /// Register the plugin catalog from the settings file
    LoadPlugins,
    /// Run load-plugins then load-components against the same store
    Sync,
    /// Inspect stored components
    Components(ComponentsArgs),
    /// Inspect the plugin catalog
    Plugins(PluginsArgs),
}

#[derive(Debug, clap::Args)]
pub struct ComponentsArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Debug, clap::Args)]
pub struct PluginsArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListCommand {
    /// List stored records
    List(ListArgs),
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "defcon",
            "load-components",
            "-c",
            "status.toml",
            "--backend",
            "memory",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::LoadComponents));
        assert_eq!(cli.config, Some(PathBuf::from("status.toml")));
        assert_eq!(cli.backend, Some(StorageBackend::Memory));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_list_format() {
        let cli = Cli::try_parse_from(["defcon", "plugins", "list", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Plugins(PluginsArgs {
                command: ListCommand::List(args),
            }) => assert_eq!(args.format, OutputFormat::Json),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["defcon", "components", "list"]).unwrap();
        match cli.command {
            Commands::Components(ComponentsArgs {
                command: ListCommand::List(args),
            }) => assert_eq!(args.format, OutputFormat::Table),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["defcon", "sync", "--backend", "mysql"]).is_err());
    }
}
