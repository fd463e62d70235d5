use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use magdash_core::{Product, Store};

use crate::middleware::RequestId;

use super::{map_db_error, store_ids, ApiError, ApiResponse, AppState};

pub(super) async fn list_user_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Store>>>, ApiError> {
    let stores = magdash_db::get_stores_for_user(&state.client, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(stores, req_id.0))
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub store_ids: Option<String>,
    #[serde(default)]
    pub with_images: bool,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let ids = store_ids(query.store_ids.as_deref());
    let products = if query.with_images {
        magdash_db::fetch_products_with_images(&state.client, &ids).await
    } else {
        magdash_db::fetch_product_data(&state.client, &ids).await
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(products, req_id.0))
}
