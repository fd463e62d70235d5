//! `filters` subcommands: month picker and trend range derivation.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use magdash_core::{
    format_month, split_list, DateFilter, DisplayLocale, SalesFilterState, TimeRange,
};
use magdash_db::HostedClient;

#[derive(Debug, Subcommand)]
pub enum FilterCommands {
    /// Show available sales months and the filter for a selected month
    Month {
        /// Any day of the month to select; defaults to the latest month with data
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Comma-separated store ids; all stores when omitted
        #[arg(long)]
        store_ids: Option<String>,
    },
    /// Show the date range for a trends selector (7d, 30d, 1y, all)
    Range {
        #[arg(default_value = "1y")]
        range: TimeRange,
    },
}

pub(crate) async fn run(
    client: &HostedClient,
    command: FilterCommands,
    locale: DisplayLocale,
) -> anyhow::Result<()> {
    match command {
        FilterCommands::Month { date, store_ids } => {
            run_month(client, date, store_ids.as_deref(), locale).await
        }
        FilterCommands::Range { range } => {
            run_range(range, locale);
            Ok(())
        }
    }
}

/// Print the filter for a trends range. Pure; no backend access.
pub(crate) fn run_range(range: TimeRange, locale: DisplayLocale) {
    let filter = range.date_range(Utc::now().date_naive(), locale);
    println!("{}: {}", range, range.label(locale));
    print_filter(&filter);
}

async fn run_month(
    client: &HostedClient,
    date: Option<NaiveDate>,
    store_ids: Option<&str>,
    locale: DisplayLocale,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let ids = store_ids.map(split_list).unwrap_or_default();

    let mut picker = SalesFilterState::new(locale);
    let ticket = picker.begin_months_request();
    let months = magdash_db::fetch_available_data_months(client, &ids)
        .await
        .map_err(|e| e.to_string());
    picker.apply_months(ticket, months, today);
    if date.is_some() {
        picker.select_date(date, today);
    }

    if let Some(err) = picker.months_error() {
        eprintln!("warning: could not load months with data: {err}");
    } else if picker.months().is_empty() {
        println!("no months with sales data");
    } else {
        println!("months with data:");
        for day in picker.months().iter().filter_map(magdash_core::AvailableMonth::first_day) {
            println!("  {}", format_month(day, locale));
        }
    }

    if let Some(selected) = picker.selected_date() {
        let marker = if picker.has_data_for(selected) { "" } else { " (no data)" };
        println!("selected: {}{marker}", format_month(selected, locale));
    }
    print_filter(&picker.date_filter(today));
    Ok(())
}

fn print_filter(filter: &DateFilter) {
    println!("{:<8}{}", "label", filter.display_text);
    println!("{:<8}{}", "from", filter.from_date);
    println!("{:<8}{}", "to", filter.to_date);
}
