use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::{Choice, ConstantTimeEq};
use uuid::Uuid;

use crate::api::ApiError;

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Key accepted in development when `IGCOACH_API_KEYS` is unset.
const DEVELOPMENT_API_KEY: &str = "BOT_LOCAL";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
}

impl AuthState {
    /// Builds auth settings from the configured key list.
    ///
    /// In development an empty list falls back to the shared local key
    /// `BOT_LOCAL`. Outside development an empty list fails startup.
    pub fn from_keys(keys: &[String], is_development: bool) -> anyhow::Result<Self> {
        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "IGCOACH_API_KEYS not set; accepting the local development key only"
                );
                return Ok(Self::new(vec![DEVELOPMENT_API_KEY.to_owned()]));
            }

            anyhow::bail!(
                "IGCOACH_API_KEYS is required outside development; provide comma-separated keys"
            );
        }

        Ok(Self::new(keys.to_vec()))
    }

    #[must_use]
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
        }
    }

    /// Compares `token` against every key in constant time per key.
    fn allows(&self, token: &str) -> bool {
        let matched = self
            .api_keys
            .iter()
            .fold(Choice::from(0), |acc, key| {
                acc | key.as_bytes().ct_eq(token.as_bytes())
            });
        matched.into()
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
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

/// Middleware rejecting requests without a valid `x-api-key` header.
pub async fn require_api_key(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let presented = extract_api_key(req.headers().get(API_KEY_HEADER));

    match presented {
        Some(key) if auth.allows(key) => next.run(req).await,
        _ => {
            let rid = req
                .extensions()
                .get::<RequestId>()
                .map(|r| r.0.clone())
                .unwrap_or_default();
            tracing::debug!(request_id = %rid, "rejected request with missing or invalid API key");
            ApiError::new(rid, "unauthorized", "invalid API key").into_response()
        }
    }
}

fn extract_api_key(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
