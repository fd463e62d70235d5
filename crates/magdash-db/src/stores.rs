//! Store lookups and mutations.

use serde::Deserialize;
use serde_json::json;

use magdash_core::{Store, StoreUpdate};

use crate::{DbError, HostedClient};

#[derive(Debug, Deserialize)]
struct ConnectionStoreRef {
    store_id: Option<String>,
}

/// Stores the user has a Magento connection for.
///
/// Reads the user's connections first and then the referenced stores. A user
/// without connections gets an empty list and the stores table is never
/// queried.
///
/// # Errors
///
/// Returns [`DbError`] if either query fails.
pub async fn get_stores_for_user(
    client: &HostedClient,
    user_id: &str,
) -> Result<Vec<Store>, DbError> {
    let refs: Vec<ConnectionStoreRef> = client
        .table("magento_connections")
        .select("store_id")
        .eq("user_id", user_id)
        .not_null("store_id")
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "stores: connection lookup failed"))?;

    let mut store_ids: Vec<String> = refs.into_iter().filter_map(|r| r.store_id).collect();
    store_ids.sort();
    store_ids.dedup();

    if store_ids.is_empty() {
        tracing::debug!(user_id, "stores: user has no connected stores");
        return Ok(Vec::new());
    }

    client
        .table("stores")
        .select("id,name,url,created_at,updated_at")
        .in_list("id", &store_ids)
        .order("name", true)
        .fetch()
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "stores: store lookup failed"))
}

/// # Errors
///
/// Returns [`DbError::Validation`] for a blank name, [`DbError::NotFound`]
/// if the backend returns no row, or the query error.
pub async fn create_store(
    client: &HostedClient,
    name: &str,
    url: Option<&str>,
) -> Result<Store, DbError> {
    if name.trim().is_empty() {
        return Err(DbError::Validation("store name is required".to_string()));
    }
    let rows: Vec<Store> = client
        .table("stores")
        .insert(&json!({ "name": name, "url": url }))
        .await
        .inspect_err(|e| tracing::error!(error = %e, name, "stores: create failed"))?;
    rows.into_iter().next().ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no store has `id`, or the query error.
pub async fn update_store(
    client: &HostedClient,
    id: &str,
    update: &StoreUpdate,
) -> Result<Store, DbError> {
    let rows: Vec<Store> = client
        .table("stores")
        .eq("id", id)
        .update(update)
        .await
        .inspect_err(|e| tracing::error!(error = %e, store_id = id, "stores: update failed"))?;
    rows.into_iter().next().ok_or(DbError::NotFound)
}

/// Delete a store and all of its synced data through the
/// `delete_store_data` database function.
///
/// # Errors
///
/// Returns [`DbError`] if the call fails.
pub async fn delete_store(client: &HostedClient, id: &str) -> Result<(), DbError> {
    let _: serde_json::Value = client
        .rpc("delete_store_data", &json!({ "target_store_id": id }))
        .await
        .inspect_err(|e| tracing::error!(error = %e, store_id = id, "stores: delete failed"))?;
    tracing::info!(store_id = id, "stores: deleted store data");
    Ok(())
}
