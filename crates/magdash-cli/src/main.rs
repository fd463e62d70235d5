mod diagnose;
mod filters;
mod sales;
mod stores;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::filters::FilterCommands;
use crate::stores::StoreCommands;
use crate::sync::SyncCommands;

#[derive(Debug, Parser)]
#[command(name = "magdash")]
#[command(about = "Magento merchant dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive date filters
    Filters {
        #[command(subcommand)]
        command: FilterCommands,
    },
    /// Trigger and follow Magento syncs
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Manage stores and their Magento connections
    Stores {
        #[command(subcommand)]
        command: StoreCommands,
    },
    /// Daily sales summary for a date range
    Sales {
        /// First day (yyyy-mm-dd); defaults to the start of the current month
        #[arg(long)]
        from: Option<chrono::NaiveDate>,
        /// Last day (yyyy-mm-dd); defaults to the end of the current month
        #[arg(long)]
        to: Option<chrono::NaiveDate>,
        /// Comma-separated store ids; all stores when omitted
        #[arg(long)]
        store_ids: Option<String>,
        /// ISO currency code for display
        #[arg(long, default_value = "DKK")]
        currency: String,
    },
    /// Run connectivity checks against the hosted backend
    Diagnose,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = magdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    for var in config.missing_credentials() {
        tracing::warn!(var, "credential not set; hosted access is degraded");
    }

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("magdash: no command given; see --help");
        return Ok(());
    };

    // Range derivation needs no backend.
    if let Commands::Filters {
        command: FilterCommands::Range { range },
    } = &command
    {
        filters::run_range(*range, config.locale);
        return Ok(());
    }

    let client = magdash_db::HostedClient::from_config(&config)?;
    match command {
        Commands::Filters { command } => filters::run(&client, command, config.locale).await,
        Commands::Sync { command } => sync::run(&client, command, config.locale).await,
        Commands::Stores { command } => stores::run(&client, command).await,
        Commands::Sales {
            from,
            to,
            store_ids,
            currency,
        } => {
            sales::run_sales(
                &client,
                sales::SalesArgs {
                    from,
                    to,
                    store_ids: store_ids.as_deref(),
                    currency: &currency,
                },
                config.locale,
            )
            .await
        }
        Commands::Diagnose => diagnose::run_diagnose(&client).await,
    }
}

#[cfg(test)]
mod tests;
