use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use magdash_core::{
    format_time, progress_percentage, EntityStatus, ProgressSource, SyncBoard, SyncEntity,
    SyncProgress,
};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct EntityView {
    entity: SyncEntity,
    label: &'static str,
    status: EntityStatus,
    status_label: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncProgressView {
    in_progress: bool,
    is_stale: bool,
    percent: u8,
    progress_text: String,
    /// Local `HH:MM` of the last progress update.
    last_update: Option<String>,
    entities: Vec<EntityView>,
    progress: Option<SyncProgress>,
}

pub(super) async fn sync_progress(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
) -> Result<Json<ApiResponse<SyncProgressView>>, ApiError> {
    let status = magdash_db::get_sync_progress(&state.client, &store_id, Utc::now())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let board = status
        .progress
        .as_ref()
        .map_or_else(SyncBoard::new, SyncBoard::from_run);
    let percent = status
        .progress
        .as_ref()
        .map_or(0, |run| progress_percentage(ProgressSource::from(run)));
    let locale = state.locale;

    let view = SyncProgressView {
        in_progress: status.in_progress,
        is_stale: status.is_stale,
        percent,
        progress_text: board.progress_text(locale),
        last_update: status.progress.as_ref().map(|run| format_time(run.updated_at)),
        entities: board
            .entries()
            .map(|(entity, entity_status)| EntityView {
                entity,
                label: entity.label(locale),
                status: entity_status,
                status_label: entity_status.label(locale),
            })
            .collect(),
        progress: status.progress,
    };
    Ok(ApiResponse::json(view, req_id.0))
}

#[derive(Debug, Deserialize)]
pub(super) struct TriggerSyncParams {
    #[serde(default)]
    pub changes_only: bool,
}

pub(super) async fn trigger_sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
    Query(params): Query<TriggerSyncParams>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let result = magdash_db::trigger_magento_sync(&state.client, &store_id, params.changes_only)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(store_id, changes_only = params.changes_only, "manual sync triggered");
    Ok(ApiResponse::json(result, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, get, json_body};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_progress(server: &MockServer, row: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/check_table_exists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(true))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sync_progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn running_sync_reports_percentage_and_entities() {
        let server = MockServer::start().await;
        mount_progress(
            &server,
            json!({
                "id": "run-1",
                "store_id": "s1",
                "current_page": 2,
                "orders_processed": 50,
                "total_orders": 200,
                "status": "in_progress",
                "updated_at": (Utc::now() - Duration::minutes(1)).to_rfc3339()
            }),
        )
        .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/stores/s1/sync-progress"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let data = &json["data"];
        assert_eq!(data["in_progress"], true);
        assert_eq!(data["percent"], 25);
        assert_eq!(data["entities"].as_array().map(Vec::len), Some(4));
        assert_eq!(data["entities"][1]["status_label"], "Synkroniserer...");
    }

    #[tokio::test]
    async fn completed_sync_is_full() {
        let server = MockServer::start().await;
        mount_progress(
            &server,
            json!({
                "id": "run-2",
                "store_id": "s1",
                "current_page": 9,
                "orders_processed": 10,
                "total_orders": 0,
                "status": "completed",
                "updated_at": Utc::now().to_rfc3339()
            }),
        )
        .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/stores/s1/sync-progress"))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["data"]["in_progress"], false);
        assert_eq!(json["data"]["progress_text"], "100% fuldført");
        assert_eq!(json["data"]["entities"][3]["status"], "completed");
    }

    #[tokio::test]
    async fn manual_sync_forwards_changes_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/magento-sync"))
            .and(body_partial_json(json!({
                "store_id": "s1",
                "syncType": "changes_only"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "queued": true })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/stores/s1/sync?changes_only=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["queued"], true);
    }
}
