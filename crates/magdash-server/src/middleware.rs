use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

const API_KEYS_VAR: &str = "MAGDASH_API_KEYS";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("keys", &self.api_keys.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Builds auth config from `MAGDASH_API_KEYS` (comma-separated bearer tokens).
    ///
    /// # Errors
    ///
    /// Fails outside development when no key is configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_raw(&raw, is_development)
    }

    /// Same as [`AuthState::from_env`] with the variable's value passed in.
    ///
    /// In development, no keys disables auth for local iteration.
    ///
    /// # Errors
    ///
    /// Fails outside development when `raw` holds no key.
    pub fn from_raw(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: HashSet<String> = magdash_core::split_list(raw).into_iter().collect();

        if keys.is_empty() {
            if is_development {
                tracing::warn!("{API_KEYS_VAR} not set; bearer auth disabled in development environment");
                return Ok(Self {
                    api_keys: Arc::new(HashSet::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "{API_KEYS_VAR} is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(false, |found, key| {
                found | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
            })
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused, otherwise a `UUIDv4` is
/// generated. The ID is stored as a [`RequestId`] extension and echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => {
            tracing::debug!(path = %req.uri().path(), "rejected request without valid bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(MiddlewareErrorBody {
                    error: MiddlewareError {
                        code: "unauthorized",
                        message: "missing or invalid bearer token",
                    },
                }),
            )
                .into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_raw("", true).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_raw(" , ", false).is_err());
    }

    #[test]
    fn allows_only_configured_keys() {
        let state = AuthState::from_raw("alpha, beta", false).unwrap();
        assert!(state.enabled);
        assert!(state.allows("beta"));
        assert!(!state.allows("gamma"));
        assert!(!state.allows("alph"));
    }

    #[test]
    fn repeated_keys_are_stored_once() {
        let state = AuthState::from_raw("alpha, beta, alpha, beta, alpha", false).unwrap();
        assert_eq!(state.api_keys.len(), 2);
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
    }

    #[test]
    fn debug_hides_keys() {
        let state = AuthState::from_raw("secret-key", false).unwrap();
        assert!(!format!("{state:?}").contains("secret-key"));
    }
}
