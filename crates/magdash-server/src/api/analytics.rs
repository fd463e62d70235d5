use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use magdash_core::{
    calculate_monthly_repeat_rates, calculate_repeat_purchase_rate, period_range,
    BasketOpenerProduct, DateFilter, MonthlyRepeatRate, RepeatPurchaseSummary,
};
use magdash_db::BasketOpenerQuery;

use crate::middleware::RequestId;

use super::sales::bounds;
use super::{
    filter_selection, map_core_error, map_db_error, store_ids, today, ApiError, ApiResponse,
    AppState,
};

const DEFAULT_PERIOD_MONTHS: u32 = 12;
const MAX_PERIOD_MONTHS: u32 = 36;

fn period_months(raw: Option<u32>) -> u32 {
    raw.unwrap_or(DEFAULT_PERIOD_MONTHS).clamp(1, MAX_PERIOD_MONTHS)
}

#[derive(Debug, Deserialize)]
pub(super) struct RepeatPurchaseQuery {
    pub months: Option<u32>,
    pub store_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RepeatPurchaseData {
    filter: DateFilter,
    summary: RepeatPurchaseSummary,
    monthly: Vec<MonthlyRepeatRate>,
}

pub(super) async fn repeat_purchase(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RepeatPurchaseQuery>,
) -> Result<Json<ApiResponse<RepeatPurchaseData>>, ApiError> {
    let months = period_months(query.months);
    let filter = period_range(months, today(), state.locale);
    let (from, to) = bounds(&filter, &req_id)?;
    let ids = store_ids(query.store_ids.as_deref());

    let transactions = magdash_db::fetch_transaction_data(&state.client, from, to, &ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::debug!(transactions = transactions.len(), months, "repeat purchase: computing");

    Ok(ApiResponse::json(
        RepeatPurchaseData {
            summary: calculate_repeat_purchase_rate(&transactions, months),
            monthly: calculate_monthly_repeat_rates(&transactions, months, state.locale),
            filter,
        },
        req_id.0,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct BasketOpenerParams {
    pub months: Option<u32>,
    pub store_ids: Option<String>,
    pub customer_group: Option<String>,
    pub store_view: Option<String>,
    pub order_statuses: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BasketOpenerData {
    filter: DateFilter,
    products: Vec<BasketOpenerProduct>,
}

pub(super) async fn basket_openers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<BasketOpenerParams>,
) -> Result<Json<ApiResponse<BasketOpenerData>>, ApiError> {
    let filters = filter_selection(
        params.store_ids.as_deref(),
        params.store_view.as_deref(),
        params.customer_group.as_deref(),
        params.order_statuses.as_deref(),
    )
    .map_err(|e| map_core_error(req_id.0.clone(), &e))?;
    let filter = period_range(period_months(params.months), today(), state.locale);
    let (from, to) = bounds(&filter, &req_id)?;

    let products = magdash_db::fetch_basket_opener_products(
        &state.client,
        &BasketOpenerQuery { from, to, filters },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(BasketOpenerData { filter, products }, req_id.0))
}

pub(super) async fn order_statuses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    let statuses = magdash_db::fetch_order_statuses(&state.client).await;
    ApiResponse::json(statuses, req_id.0)
}
