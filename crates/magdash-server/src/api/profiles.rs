use axum::{
    extract::{Path, State},
    Extension, Json,
};

use magdash_core::{Profile, ProfileUpdate};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = magdash_db::fetch_user_profile(&state.client, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(profile, req_id.0))
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = magdash_db::update_user_profile(&state.client, &user_id, &update)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(profile, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, get, json_body};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn patch(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_profile_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(get("/api/v1/profiles/u404"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn patch_sends_only_given_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(body_json(json!({ "timezone": "Europe/Copenhagen" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "u1", "timezone": "Europe/Copenhagen" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server.uri())
            .oneshot(patch(
                "/api/v1/profiles/u1",
                &json!({ "timezone": "Europe/Copenhagen" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["timezone"], "Europe/Copenhagen");
    }

    #[tokio::test]
    async fn empty_patch_is_validation_error() {
        let server = MockServer::start().await;
        let response = app_for(&server.uri())
            .oneshot(patch("/api/v1/profiles/u1", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
