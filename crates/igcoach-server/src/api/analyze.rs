//! `POST /analyze`: summarize posts, ask the model for a report, split it.

use axum::{extract::State, Extension, Json};
use igcoach_core::{
    render_user_prompt, sectionize, summarize, system_instruction, AnalysisRequest,
    AnalysisResult, PromptPayload,
};
use igcoach_llm::LlmError;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

fn map_llm_error(request_id: &str, error: &LlmError) -> ApiError {
    tracing::error!(error = %error, "report generation failed");
    ApiError::new(request_id, "upstream_error", "report generation failed")
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let rid = &req_id.0;

    let summary = summarize(body.posts(), body.follower_count());
    tracing::info!(
        request_id = %rid,
        posts = summary.n,
        goals = body.goals().len(),
        "analyzing account"
    );

    let payload = PromptPayload::new(&body, &summary);
    let prompt = render_user_prompt(&payload, &state.report_language).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize prompt payload");
        ApiError::new(rid, "internal_error", "failed to build prompt")
    })?;

    let text = state
        .llm
        .complete(&system_instruction(&state.report_language), &prompt)
        .await
        .map_err(|e| map_llm_error(rid, &e))?;

    let sections = sectionize(&text);
    tracing::debug!(
        request_id = %rid,
        plan_items = sections.plan_30d.len(),
        diagnostics_empty = sections.diagnostics.raw.is_empty(),
        "report sectionized"
    );

    Ok(Json(AnalysisResult {
        account_url: body.account_url().to_owned(),
        sections,
    }))
}
