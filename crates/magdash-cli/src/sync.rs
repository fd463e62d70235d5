//! `sync` subcommands: manual trigger, one-shot status and live watch.

use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;

use magdash_core::{
    format_time, progress_percentage, DisplayLocale, ProgressSource, SyncBoard,
};
use magdash_db::{HostedClient, SyncProgressStatus};

#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Ask the sync function to import a store's Magento data
    Trigger {
        /// Store to synchronise
        store_id: String,
        /// Only import changes since the last sync
        #[arg(long)]
        changes_only: bool,
    },
    /// Show the latest sync run of a store
    Status {
        store_id: String,
    },
    /// Poll the latest sync run until it stops
    Watch {
        store_id: String,
        /// Seconds between polls
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

pub(crate) async fn run(
    client: &HostedClient,
    command: SyncCommands,
    locale: DisplayLocale,
) -> anyhow::Result<()> {
    match command {
        SyncCommands::Trigger {
            store_id,
            changes_only,
        } => {
            let result = magdash_db::trigger_magento_sync(client, &store_id, changes_only).await?;
            println!("sync requested for store {store_id}");
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        SyncCommands::Status { store_id } => {
            let status = magdash_db::get_sync_progress(client, &store_id, Utc::now()).await?;
            print_status(&status, locale);
            Ok(())
        }
        SyncCommands::Watch { store_id, interval } => {
            watch(client, &store_id, Duration::from_secs(interval.max(1)), locale).await
        }
    }
}

async fn watch(
    client: &HostedClient,
    store_id: &str,
    interval: Duration,
    locale: DisplayLocale,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let status = magdash_db::get_sync_progress(client, store_id, Utc::now()).await?;
        print_status(&status, locale);
        if !status.in_progress {
            return Ok(());
        }
    }
}

fn print_status(status: &SyncProgressStatus, locale: DisplayLocale) {
    let Some(run) = &status.progress else {
        println!("no sync runs recorded");
        return;
    };

    let percent = progress_percentage(ProgressSource::from(run));
    let total = run
        .total_orders
        .map_or_else(|| "?".to_string(), |t| t.to_string());
    println!(
        "[{}] {} {percent}% ({} / {total} orders, page {}) updated {}",
        run.status.as_str(),
        run.id,
        run.orders_processed,
        run.current_page,
        format_time(run.updated_at),
    );
    if status.is_stale {
        println!("  run was idle too long and has been marked failed");
    }
    if let Some(message) = run.error_message.as_deref().or(run.warning_message.as_deref()) {
        println!("  {message}");
    }

    let board = SyncBoard::from_run(run);
    for (entity, entity_status) in board.entries() {
        println!("  {:<20}{}", entity.label(locale), entity_status.label(locale));
    }
    println!("  {}", board.progress_text(locale));
}
