//! Raw transaction reads.

use chrono::NaiveDate;
use serde_json::Value;

use magdash_core::Transaction;

use crate::{DbError, HostedClient};

/// Transactions between `from` and `to` (whole days), oldest first.
///
/// Each row's `email` is replaced by the best available customer email so
/// analytics can key customers consistently.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_transaction_data(
    client: &HostedClient,
    from: NaiveDate,
    to: NaiveDate,
    store_ids: &[String],
) -> Result<Vec<Transaction>, DbError> {
    let rows: Vec<Transaction> = client
        .table("transactions")
        .select("*")
        .gte("transaction_date", from)
        .lte("transaction_date", format!("{to}T23:59:59"))
        .in_stores(store_ids)
        .order("transaction_date", true)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, %from, %to, "transactions: fetch failed"))?;

    Ok(rows
        .into_iter()
        .map(|mut tx| {
            tx.email = tx.resolved_email().map(str::to_owned);
            tx
        })
        .collect())
}

/// Exact number of rows in `transactions`.
///
/// # Errors
///
/// Returns [`DbError`] if the count request fails.
pub async fn get_transaction_count(client: &HostedClient) -> Result<u64, DbError> {
    let count = client
        .table("transactions")
        .select("id")
        .count()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "transactions: count failed"))?;
    Ok(count.unwrap_or(0))
}

/// Run a trivial read to prove the backend is reachable.
///
/// # Errors
///
/// Returns [`DbError`] if the read fails.
pub async fn test_database_connection(client: &HostedClient) -> Result<(), DbError> {
    client
        .table("transactions")
        .select("id")
        .limit(1)
        .fetch::<Value>()
        .await
        .map(|_| ())
}
