use axum::{extract::State, Extension, Json};
use serde::Serialize;

use magdash_core::TestResult;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct DiagnosticsData {
    passed: usize,
    failed: usize,
    results: Vec<TestResult>,
}

/// Connectivity checks. Always 200; failures are reported per check.
pub(super) async fn run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<DiagnosticsData>> {
    let results = magdash_db::run_diagnostics(&state.client).await;
    let passed = results.iter().filter(|r| r.passed()).count();
    ApiResponse::json(
        DiagnosticsData {
            passed,
            failed: results.len() - passed,
            results,
        },
        req_id.0,
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, get, json_body};
    use axum::http::StatusCode;
    use tower::ServiceExt;
    use wiremock::MockServer;

    #[tokio::test]
    async fn unreachable_backend_reports_every_check_as_failed() {
        let server = MockServer::start().await;
        // No mocks: every request gets wiremock's default 404.
        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/diagnostics"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["passed"], 0);
        assert_eq!(json["data"]["failed"], 9);
        assert_eq!(json["data"]["results"][0]["status"], "error");
    }
}
