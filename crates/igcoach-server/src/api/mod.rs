mod analyze;
mod privacy;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use igcoach_core::AppConfig;
use igcoach_llm::ChatClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{request_id, require_api_key, AuthState, API_KEY_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub llm: ChatClient,
    pub report_language: Arc<str>,
    pub privacy_page: Arc<str>,
}

impl AppState {
    pub fn new(llm: ChatClient, config: &AppConfig) -> Self {
        Self {
            llm,
            report_language: Arc::from(config.report_language.as_str()),
            privacy_page: Arc::from(
                config
                    .privacy_page
                    .as_deref()
                    .unwrap_or(privacy::DEFAULT_PRIVACY_PAGE),
            ),
        }
    }
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
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
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
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Builds the CORS layer from the configured origins.
///
/// A literal `*` entry allows any origin but then credentials are not
/// allowed; browsers reject that combination anyway.
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static("x-request-id"),
        ]);

    if allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze::analyze))
        .layer(axum::middleware::from_fn_with_state(auth, require_api_key))
}

pub fn build_app(state: AppState, auth: AuthState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/privacy", get(privacy::privacy_page));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(allowed_origins))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
