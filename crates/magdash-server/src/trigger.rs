//! Public endpoint that an external scheduler calls to start a Magento sync.
//!
//! `OPTIONS` answers CORS preflight, `POST` relays to the sync function and
//! everything else is rejected. Every response carries the CORS headers.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::AppState;

pub const TRIGGER_PATH: &str = "/functions/v1/magento-sync-cron";

const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TriggerReply {
    Completed {
        success: bool,
        message: &'static str,
        result: Value,
    },
    Failed {
        success: bool,
        error: String,
    },
    Rejected {
        error: &'static str,
    },
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route(TRIGGER_PATH, any(handle))
}

async fn handle(State(state): State<AppState>, method: Method) -> Response {
    let response = match method {
        Method::OPTIONS => StatusCode::OK.into_response(),
        Method::POST => match state.relay.trigger().await {
            Ok(result) => (
                StatusCode::OK,
                Json(TriggerReply::Completed {
                    success: true,
                    message: "Scheduled sync completed",
                    result,
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "trigger: scheduled sync failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(TriggerReply::Failed {
                        success: false,
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
        },
        other => {
            tracing::debug!(method = %other, "trigger: method not allowed");
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(TriggerReply::Rejected {
                    error: "Method not allowed",
                }),
            )
                .into_response()
        }
    };
    with_cors(response)
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{app_for, json_body};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: Method) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(TRIGGER_PATH)
            .body(Body::empty())
            .unwrap()
    }

    fn assert_cors(response: &Response) {
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.headers()["access-control-allow-headers"],
            "authorization, x-client-info, apikey, content-type"
        );
    }

    #[tokio::test]
    async fn options_returns_empty_cors_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(request(Method::OPTIONS))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn post_relays_scheduled_job() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/magento-sync"))
            .and(header_is("authorization", "Bearer service-key"))
            .and(body_json(json!({ "source": "scheduled_job" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "synced": 3 })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(request(Method::POST))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": true,
                "message": "Scheduled sync completed",
                "result": { "synced": 3 }
            })
        );
    }

    #[tokio::test]
    async fn post_failure_returns_500_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/magento-sync"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(request(Method::POST))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(request(Method::GET))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
        assert_eq!(json_body(response).await, json!({ "error": "Method not allowed" }));
    }
}
