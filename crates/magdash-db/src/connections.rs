//! Magento connection records, order statuses and manual sync triggers.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{json, Value};

use magdash_core::{MagentoConnection, NewMagentoConnection};

use crate::{DbError, HostedClient};

/// Statuses every Magento install ships with.
pub const COMMON_ORDER_STATUSES: [&str; 7] = [
    "pending",
    "processing",
    "complete",
    "closed",
    "canceled",
    "holded",
    "payment_review",
];

/// Returned when the status lookup fails.
pub const FALLBACK_ORDER_STATUSES: [&str; 4] = ["pending", "processing", "complete", "canceled"];

const SYNC_FUNCTION: &str = "magento-sync";
const SYNC_MAX_PAGES: u32 = 1000;

/// All connections of a user, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_magento_connections(
    client: &HostedClient,
    user_id: &str,
) -> Result<Vec<MagentoConnection>, DbError> {
    client
        .table("magento_connections")
        .select("*")
        .eq("user_id", user_id)
        .order("created_at", false)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "connections: fetch failed"))
}

/// Active connections of a user, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_active_magento_connections(
    client: &HostedClient,
    user_id: &str,
) -> Result<Vec<MagentoConnection>, DbError> {
    client
        .table("magento_connections")
        .select("*")
        .eq("user_id", user_id)
        .eq("status", "active")
        .order("created_at", false)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "connections: fetch active failed"))
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the backend returns no row, or the query
/// error.
pub async fn add_magento_connection(
    client: &HostedClient,
    connection: &NewMagentoConnection,
) -> Result<MagentoConnection, DbError> {
    let rows: Vec<MagentoConnection> = client
        .table("magento_connections")
        .insert(connection)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, store_url = %connection.store_url, "connections: insert failed");
        })?;
    let stored = rows.into_iter().next().ok_or(DbError::NotFound)?;
    tracing::info!(connection_id = %stored.id, store_name = %stored.store_name, "connections: added");
    Ok(stored)
}

/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn delete_magento_connection(client: &HostedClient, id: &str) -> Result<(), DbError> {
    client
        .table("magento_connections")
        .eq("id", id)
        .delete()
        .await
        .inspect_err(|e| tracing::error!(error = %e, connection_id = id, "connections: delete failed"))
}

#[derive(Debug, Deserialize)]
struct MetadataRow {
    #[serde(default)]
    metadata: Value,
}

/// Known Magento order statuses plus any status seen in synced transactions.
///
/// Never fails: when the transaction lookup errors a short default list is
/// returned instead.
pub async fn fetch_order_statuses(client: &HostedClient) -> Vec<String> {
    let rows: Vec<MetadataRow> = match client.table("transactions").select("metadata").fetch().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "connections: order status lookup failed, using defaults");
            return FALLBACK_ORDER_STATUSES.iter().map(ToString::to_string).collect();
        }
    };

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut statuses: Vec<String> = COMMON_ORDER_STATUSES.iter().map(ToString::to_string).collect();
    seen.extend(statuses.iter().cloned());
    for status in rows
        .iter()
        .filter_map(|r| r.metadata.get("status").and_then(Value::as_str))
    {
        if seen.insert(status.to_string()) {
            statuses.push(status.to_string());
        }
    }
    statuses
}

/// Ask the sync function to import a store's Magento data.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for a blank store id, or the function
/// call error.
pub async fn trigger_magento_sync(
    client: &HostedClient,
    store_id: &str,
    changes_only: bool,
) -> Result<Value, DbError> {
    if store_id.trim().is_empty() {
        tracing::error!("connections: sync trigger without store id");
        return Err(DbError::Validation(
            "store id is required for synchronization".to_string(),
        ));
    }

    let sync_type = if changes_only { "changes_only" } else { "full" };
    tracing::info!(store_id, sync_type, "connections: triggering magento sync");

    let body = json!({
        "store_id": store_id,
        "trigger": "manual_sync",
        "syncType": sync_type,
        "maxPages": SYNC_MAX_PAGES,
    });
    client
        .invoke_function(SYNC_FUNCTION, &body)
        .await
        .inspect_err(|e| tracing::error!(error = %e, store_id, "connections: sync trigger failed"))
}
