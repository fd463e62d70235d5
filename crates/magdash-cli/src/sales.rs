use chrono::{NaiveDate, Utc};

use magdash_core::{
    format_currency, format_day, format_long_date, month_bounds, split_list, summarize_sales,
    DisplayLocale, FilterSelection,
};
use magdash_db::{HostedClient, SalesQuery};

pub(crate) struct SalesArgs<'a> {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub store_ids: Option<&'a str>,
    pub currency: &'a str,
}

/// Print daily sales and the metric-card summary for a range.
///
/// # Errors
///
/// Returns an error if the range is inverted or the sales query fails.
pub(crate) async fn run_sales(
    client: &HostedClient,
    args: SalesArgs<'_>,
    locale: DisplayLocale,
) -> anyhow::Result<()> {
    let (month_start, month_end) = month_bounds(Utc::now().date_naive());
    let from = args.from.unwrap_or(month_start);
    let to = args.to.unwrap_or(month_end);
    let ids = args.store_ids.map(split_list).unwrap_or_default();

    let query = SalesQuery::new(from, to, FilterSelection::for_stores(ids))?;
    let rows = magdash_db::fetch_daily_sales_data(client, &query, Utc::now()).await?;

    println!(
        "sales {} \u{2013} {}",
        format_long_date(from, locale),
        format_long_date(to, locale)
    );
    if rows.is_empty() {
        println!("no sales in range");
        return Ok(());
    }

    println!("{:<12}{:<10}{:<24}{:>8}{:>18}", "DATE", "DAY", "STORE", "ORDERS", "REVENUE");
    for row in &rows {
        println!(
            "{:<12}{:<10}{:<24}{:>8}{:>18}",
            row.date,
            format_day(row.date, locale),
            row.store_id,
            row.order_count,
            format_currency(row.total_sales, args.currency)
        );
    }

    let summary = summarize_sales(&rows);
    println!();
    println!("revenue          {}", format_currency(summary.total_sales, args.currency));
    println!("orders           {}", summary.order_count);
    println!(
        "avg order value  {}",
        format_currency(summary.average_order_value, args.currency)
    );
    println!("days with sales  {}", summary.days);
    Ok(())
}
