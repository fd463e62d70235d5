//! Daily sales series for the trends view.

use chrono::NaiveDate;

use magdash_core::DailySales;

use crate::{DbError, HostedClient};

/// `daily_sales` rows between `from` and `to` inclusive, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_trends_data(
    client: &HostedClient,
    from: NaiveDate,
    to: NaiveDate,
    store_ids: &[String],
) -> Result<Vec<DailySales>, DbError> {
    client
        .table("daily_sales")
        .select("*")
        .gte("date", from)
        .lte("date", to)
        .in_stores(store_ids)
        .order("date", true)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, %from, %to, "trends: fetch failed"))
}
