use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use magdash_core::{
    month_filter, summarize_sales, AvailableMonth, DailySales, DateFilter, SalesFilterState,
    SalesSummary, TimeRange,
};
use magdash_db::SalesQuery;

use crate::middleware::RequestId;

use super::{
    filter_selection, map_core_error, map_db_error, store_ids, today, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct DailySalesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Any day of the month to report when no explicit range is given.
    pub date: Option<NaiveDate>,
    pub store_ids: Option<String>,
    pub store_view: Option<String>,
    pub customer_group: Option<String>,
    pub order_statuses: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DailySalesData {
    from: NaiveDate,
    to: NaiveDate,
    display_text: Option<String>,
    summary: SalesSummary,
    rows: Vec<DailySales>,
}

pub(super) async fn daily_sales(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DailySalesQuery>,
) -> Result<Json<ApiResponse<DailySalesData>>, ApiError> {
    let (from, to, display_text) = match (query.from, query.to) {
        (Some(from), Some(to)) => (from, to, None),
        (None, None) => {
            let filter = month_filter(query.date.unwrap_or_else(today), state.locale);
            let (from, to) = bounds(&filter, &req_id)?;
            (from, to, Some(filter.display_text))
        }
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "from and to must be given together",
            ))
        }
    };

    let filters = filter_selection(
        query.store_ids.as_deref(),
        query.store_view.as_deref(),
        query.customer_group.as_deref(),
        query.order_statuses.as_deref(),
    )
    .map_err(|e| map_core_error(req_id.0.clone(), &e))?;
    let sales_query =
        SalesQuery::new(from, to, filters).map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let rows = magdash_db::fetch_daily_sales_data(&state.client, &sales_query, chrono::Utc::now())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(
        DailySalesData {
            from,
            to,
            display_text,
            summary: summarize_sales(&rows),
            rows,
        },
        req_id.0,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct SalesFilterQuery {
    pub date: Option<NaiveDate>,
    pub store_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SalesFilterData {
    months: Vec<AvailableMonth>,
    months_error: Option<String>,
    selected_date: Option<NaiveDate>,
    has_data: bool,
    filter: DateFilter,
}

/// Month picker state: available months, the effective selection and the
/// derived date filter.
pub(super) async fn sales_filter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SalesFilterQuery>,
) -> Result<Json<ApiResponse<SalesFilterData>>, ApiError> {
    let today = today();
    let ids = store_ids(query.store_ids.as_deref());

    let mut picker = SalesFilterState::new(state.locale);
    let ticket = picker.begin_months_request();
    let months = magdash_db::fetch_available_data_months(&state.client, &ids)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "sales filter: month lookup failed"))
        .map_err(|e| e.to_string());
    picker.apply_months(ticket, months, today);
    if query.date.is_some() {
        picker.select_date(query.date, today);
    }

    let selected_date = picker.selected_date();
    Ok(ApiResponse::json(
        SalesFilterData {
            months: picker.months().to_vec(),
            months_error: picker.months_error().map(str::to_owned),
            selected_date,
            has_data: selected_date.is_some_and(|d| picker.has_data_for(d)),
            filter: picker.date_filter(today),
        },
        req_id.0,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub range: Option<String>,
    pub store_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendsData {
    range: TimeRange,
    label: &'static str,
    filter: DateFilter,
    rows: Vec<DailySales>,
}

pub(super) async fn trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<TrendsData>>, ApiError> {
    let range = match query.range.as_deref() {
        Some(raw) => raw
            .parse::<TimeRange>()
            .map_err(|e| map_core_error(req_id.0.clone(), &e))?,
        None => TimeRange::default(),
    };
    let filter = range.date_range(today(), state.locale);
    let (from, to) = bounds(&filter, &req_id)?;
    let ids = store_ids(query.store_ids.as_deref());

    let rows = magdash_db::fetch_trends_data(&state.client, from, to, &ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(
        TrendsData {
            range,
            label: range.label(state.locale),
            filter,
            rows,
        },
        req_id.0,
    ))
}

pub(super) fn bounds(filter: &DateFilter, req_id: &RequestId) -> Result<(NaiveDate, NaiveDate), ApiError> {
    filter.bounds().ok_or_else(|| {
        tracing::error!(?filter, "derived date filter has unparseable bounds");
        ApiError::new(req_id.0.clone(), "internal_error", "invalid date filter")
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, get, json_body};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_table_check(server: &MockServer, exists: bool) {
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/check_table_exists"))
            .and(body_partial_json(json!({ "table_name": "daily_sales" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(exists))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn daily_sales_for_explicit_range_include_summary() {
        let server = MockServer::start().await;
        mount_table_check(&server, true).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/daily_sales"))
            .and(query_param("date", "gte.2024-06-01"))
            .and(query_param("store_id", "in.(s1)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "d1", "store_id": "s1", "date": "2024-06-01", "total_sales": 100, "order_count": 2 },
                { "id": "d2", "store_id": "s1", "date": "2024-06-02", "total_sales": 50, "order_count": 1 }
            ])))
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/daily?from=2024-06-01&to=2024-06-30&store_ids=s1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["rows"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["data"]["summary"]["order_count"], 3);
        assert_eq!(json["data"]["summary"]["days"], 2);
        assert!(json["data"]["display_text"].is_null());
    }

    #[tokio::test]
    async fn daily_sales_default_to_month_of_date() {
        let server = MockServer::start().await;
        mount_table_check(&server, true).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/daily_sales"))
            .and(query_param("date", "gte.2024-02-01"))
            .and(query_param("date", "lte.2024-02-29"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "d1", "store_id": "s1", "date": "2024-02-10", "total_sales": 10, "order_count": 1 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/daily?date=2024-02-14"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["from"], "2024-02-01");
        assert_eq!(json["data"]["to"], "2024-02-29");
        assert_eq!(json["data"]["display_text"], "februar 2024");
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let server = MockServer::start().await;
        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/daily?from=2024-07-01&to=2024-06-01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_store_view_is_rejected() {
        let server = MockServer::start().await;
        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/daily?store_view=xx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn sales_filter_selects_latest_month_with_data() {
        let server = MockServer::start().await;
        mount_table_check(&server, true).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/daily_sales"))
            .and(query_param("select", "date"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "date": "2023-11-04" },
                { "date": "2024-03-09" },
                { "date": "2024-01-15" }
            ])))
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/filter"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["months"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["data"]["selected_date"], "2024-03-01");
        assert_eq!(json["data"]["has_data"], true);
        assert_eq!(json["data"]["filter"]["from_date"], "2024-03-01");
        assert_eq!(json["data"]["filter"]["to_date"], "2024-03-31");
    }

    #[tokio::test]
    async fn sales_filter_reports_month_lookup_failure() {
        let server = MockServer::start().await;
        mount_table_check(&server, false).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/transactions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/sales/filter?date=2024-05-20"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["data"]["months_error"].as_str().is_some_and(|m| m.contains("boom")));
        assert_eq!(json["data"]["has_data"], false);
        assert_eq!(json["data"]["filter"]["from_date"], "2024-05-01");
    }

    #[tokio::test]
    async fn trends_reject_unknown_range() {
        let server = MockServer::start().await;
        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/trends?range=2w"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn trends_default_to_one_year() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/daily_sales"))
            .and(query_param("order", "date.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/trends"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["range"], "1y");
    }
}
