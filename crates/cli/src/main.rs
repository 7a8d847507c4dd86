//! cxform - contact-center configuration reconciler CLI

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cxform_domain::ProviderConfig;
use cxform_infra::{config, Provider};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cxform", version, about = "Reconcile contact-center configuration")]
struct Cli {
    /// Configuration file (TOML or JSON). Environment and searched paths are
    /// used when omitted.
    #[arg(long, global = true, env = "CXFORM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered resource and data source types
    Types,
    /// List every exportable entity of a resource type
    Export {
        /// Resource type name, e.g. `genesyscloud_oauth_client`
        type_name: String,
    },
    /// Read one entity and print its state
    Read { type_name: String, id: String },
    /// Resolve a data source by name and print the id
    Lookup { data_source: String, name: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<PathBuf>) -> Result<ProviderConfig> {
    let loaded = match path {
        Some(path) => config::load_from_file(Some(path)),
        None => config::load(),
    };
    loaded.context("failed to load provider configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    let provider = Provider::with_cancel(load_config(cli.config)?, cancel.clone())?;
    tracing::debug!(base_url = provider.base_url(), "Provider ready");

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Types => commands::types(&provider, &mut out),
        Commands::Export { type_name } => {
            commands::export(&provider, &type_name, &mut out).await
        }
        Commands::Read { type_name, id } => {
            commands::read(&provider, &type_name, &id, &mut out).await
        }
        Commands::Lookup { data_source, name } => {
            commands::lookup(&provider, &data_source, &name, &mut out).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_read_with_global_config() {
        let cli = Cli::try_parse_from([
            "cxform",
            "read",
            "genesyscloud_location",
            "abc",
            "--config",
            "cxform.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("cxform.toml")));
        assert!(matches!(
            cli.command,
            Commands::Read { ref type_name, ref id }
                if type_name == "genesyscloud_location" && id == "abc"
        ));
    }

    #[test]
    fn test_export_requires_a_type() {
        assert!(Cli::try_parse_from(["cxform", "export"]).is_err());
    }
}
