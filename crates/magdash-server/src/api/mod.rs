mod analytics;
mod diagnostics;
mod profiles;
mod sales;
mod stores;
mod sync;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use magdash_core::{split_list, CoreError, DisplayLocale, FilterSelection};
use magdash_db::{DbError, HostedClient};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};
use crate::relay::SyncRelay;
use crate::trigger;

#[derive(Clone)]
pub struct AppState {
    pub client: HostedClient,
    pub relay: SyncRelay,
    pub locale: DisplayLocale,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    hosted: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn json(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        DbError::Validation(message) => ApiError::new(request_id, "validation_error", message.clone()),
        DbError::NotConfigured => {
            tracing::warn!("hosted backend is not configured");
            ApiError::new(request_id, "service_unavailable", "hosted backend is not configured")
        }
        _ => {
            tracing::error!(error = %error, "hosted query failed");
            ApiError::new(request_id, "internal_error", "hosted query failed")
        }
    }
}

pub(super) fn map_core_error(request_id: String, error: &CoreError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

/// Store ids from a comma-separated query value. Absent means all stores.
pub(super) fn store_ids(raw: Option<&str>) -> Vec<String> {
    raw.map(split_list).unwrap_or_default()
}

/// Segment filters from query values. Absent values mean `alle` / no
/// restriction.
pub(super) fn filter_selection(
    store_ids_raw: Option<&str>,
    store_view: Option<&str>,
    customer_group: Option<&str>,
    order_statuses: Option<&str>,
) -> Result<FilterSelection, CoreError> {
    let mut selection = FilterSelection::for_stores(store_ids(store_ids_raw));
    if let Some(view) = store_view {
        selection.store_view = view.parse()?;
    }
    if let Some(group) = customer_group {
        selection.customer_group = group.parse()?;
    }
    selection.order_statuses = order_statuses.map(split_list).unwrap_or_default();
    Ok(selection)
}

pub(super) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/{user_id}/stores", get(stores::list_user_stores))
        .route("/api/v1/products", get(stores::list_products))
        .route("/api/v1/sales/daily", get(sales::daily_sales))
        .route("/api/v1/sales/filter", get(sales::sales_filter))
        .route("/api/v1/trends", get(sales::trends))
        .route("/api/v1/repeat-purchase", get(analytics::repeat_purchase))
        .route("/api/v1/basket-openers", get(analytics::basket_openers))
        .route("/api/v1/order-statuses", get(analytics::order_statuses))
        .route(
            "/api/v1/stores/{store_id}/sync-progress",
            get(sync::sync_progress),
        )
        .route("/api/v1/stores/{store_id}/sync", post(sync::trigger_sync))
        .route(
            "/api/v1/profiles/{user_id}",
            get(profiles::get_profile).patch(profiles::update_profile),
        )
        .route("/api/v1/diagnostics", get(diagnostics::run))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let api = Router::new()
        .route("/api/v1/health", get(health))
        .merge(protected_router(auth))
        .layer(build_cors());

    Router::new()
        .merge(api)
        .merge(trigger::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    if !state.client.is_configured() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    hosted: "unconfigured",
                },
                meta,
            }),
        );
    }

    match magdash_db::test_database_connection(&state.client).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    hosted: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: hosted backend unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        hosted: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;

    use super::*;

    pub(crate) fn state_for(base_url: &str) -> AppState {
        AppState {
            client: HostedClient::with_base_url(base_url, "anon-key", 5).expect("client"),
            relay: SyncRelay::new(
                Some(&format!("{base_url}/functions/v1/magento-sync")),
                Some("service-key"),
                5,
            )
            .expect("relay"),
            locale: DisplayLocale::Danish,
        }
    }

    pub(crate) fn app_for(base_url: &str) -> Router {
        let auth = AuthState::from_raw("", true).expect("auth");
        build_app(state_for(base_url), auth)
    }

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    pub(crate) async fn json_body(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }
}
