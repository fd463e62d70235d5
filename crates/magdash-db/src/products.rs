//! Reads from the `products` table.

use magdash_core::Product;

use crate::{DbError, HostedClient};

/// Products for the given stores (all stores when empty), ordered by name.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_product_data(
    client: &HostedClient,
    store_ids: &[String],
) -> Result<Vec<Product>, DbError> {
    client
        .table("products")
        .select("*")
        .in_stores(store_ids)
        .order("name", true)
        .fetch()
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, stores = store_ids.len(), "products: fetch failed");
        })
}

/// Products that have an image, for the gallery view.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn fetch_products_with_images(
    client: &HostedClient,
    store_ids: &[String],
) -> Result<Vec<Product>, DbError> {
    client
        .table("products")
        .select("*")
        .in_stores(store_ids)
        .not_null("image_url")
        .order("name", true)
        .fetch()
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, stores = store_ids.len(), "products: fetch with images failed");
        })
}
