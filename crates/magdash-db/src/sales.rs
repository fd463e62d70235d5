//! Daily sales and month availability, with a fallback to raw transactions
//! when the `daily_sales` aggregate is unavailable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use magdash_core::{
    aggregate_daily_sales, distinct_months, AvailableMonth, DailySales, FilterSelection,
    TransactionAmount,
};

use crate::{DbError, HostedClient};

const DAILY_SALES: &str = "daily_sales";

/// Date range plus segment filters for a sales query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub filters: FilterSelection,
}

impl SalesQuery {
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate, filters: FilterSelection) -> Result<Self, DbError> {
        if from > to {
            return Err(DbError::Validation(format!(
                "from date {from} is after to date {to}"
            )));
        }
        Ok(Self { from, to, filters })
    }
}

/// Ask the backend whether `table` exists.
///
/// # Errors
///
/// Returns [`DbError`] if the `check_table_exists` call fails.
pub async fn check_table_exists(client: &HostedClient, table: &str) -> Result<bool, DbError> {
    let exists: Option<bool> = client
        .rpc("check_table_exists", &json!({ "table_name": table }))
        .await?;
    Ok(exists.unwrap_or(false))
}

/// Whether `daily_sales` can be used. Check failures mean "no".
async fn daily_sales_available(client: &HostedClient) -> bool {
    match check_table_exists(client, DAILY_SALES).await {
        Ok(exists) => {
            if !exists {
                tracing::info!("sales: daily_sales table missing, using transactions");
            }
            exists
        }
        Err(e) => {
            tracing::warn!(error = %e, "sales: table check failed, using transactions");
            false
        }
    }
}

/// Daily sales in the query range.
///
/// Reads `daily_sales`; falls back to aggregating `transactions` when the
/// table is missing, the existence check fails, or the range has no rows.
///
/// # Errors
///
/// Returns [`DbError`] if the query that is finally used fails.
pub async fn fetch_daily_sales_data(
    client: &HostedClient,
    query: &SalesQuery,
    now: DateTime<Utc>,
) -> Result<Vec<DailySales>, DbError> {
    let store_ids = query.filters.store_ids.as_slice();
    tracing::debug!(
        from = %query.from,
        to = %query.to,
        stores = store_ids.len(),
        store_view = %query.filters.store_view,
        customer_group = %query.filters.customer_group,
        statuses = query.filters.order_statuses.len(),
        "sales: fetching daily sales"
    );

    if !daily_sales_available(client).await {
        return daily_sales_from_transactions(client, query, now).await;
    }

    let rows: Vec<DailySales> = client
        .table(DAILY_SALES)
        .select("*")
        .gte("date", query.from)
        .lte("date", query.to)
        .in_stores(store_ids)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "sales: daily sales fetch failed"))?;

    if rows.is_empty() {
        tracing::info!("sales: no daily_sales rows in range, using transactions");
        return daily_sales_from_transactions(client, query, now).await;
    }
    Ok(rows)
}

async fn daily_sales_from_transactions(
    client: &HostedClient,
    query: &SalesQuery,
    now: DateTime<Utc>,
) -> Result<Vec<DailySales>, DbError> {
    let rows: Vec<TransactionAmount> = client
        .table("transactions")
        .select("amount,transaction_date,store_id")
        .gte("transaction_date", query.from)
        .lte("transaction_date", format!("{}T23:59:59", query.to))
        .in_stores(&query.filters.store_ids)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "sales: fallback transactions fetch failed"))?;

    let daily = aggregate_daily_sales(&rows, now);
    tracing::debug!(transactions = rows.len(), days = daily.len(), "sales: built fallback daily sales");
    Ok(daily)
}

#[derive(Debug, Deserialize)]
struct DateRow {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct TransactionDateRow {
    transaction_date: Option<DateTime<Utc>>,
}

/// Distinct months with sales, in first-seen order.
///
/// Uses `daily_sales` when available and non-empty, otherwise
/// `transactions`.
///
/// # Errors
///
/// Returns [`DbError`] if the query that is finally used fails.
pub async fn fetch_available_data_months(
    client: &HostedClient,
    store_ids: &[String],
) -> Result<Vec<AvailableMonth>, DbError> {
    if daily_sales_available(client).await {
        let rows: Vec<DateRow> = client
            .table(DAILY_SALES)
            .select("date")
            .in_stores(store_ids)
            .order("date", true)
            .fetch()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "sales: available months fetch failed"))?;
        let months = distinct_months(rows.into_iter().filter_map(|r| r.date));
        if !months.is_empty() {
            return Ok(months);
        }
        tracing::info!("sales: no months in daily_sales, using transactions");
    }

    let rows: Vec<TransactionDateRow> = client
        .table("transactions")
        .select("transaction_date")
        .in_stores(store_ids)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "sales: fallback months fetch failed"))?;
    Ok(distinct_months(
        rows.into_iter()
            .filter_map(|r| r.transaction_date)
            .map(|d| d.date_naive()),
    ))
}
