use axum::{extract::State, response::Html};

use super::AppState;

/// Built-in page served when no override file is configured.
pub(super) const DEFAULT_PRIVACY_PAGE: &str = include_str!("../../static/privacy.html");

/// GET /privacy — static privacy policy.
pub(super) async fn privacy_page(State(state): State<AppState>) -> Html<String> {
    Html(state.privacy_page.to_string())
}
