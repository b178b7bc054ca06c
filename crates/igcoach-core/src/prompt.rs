//! Prompt construction for the report generator.

use serde::Serialize;

use crate::metrics::MetricsSummary;
use crate::posts::{AnalysisRequest, Post};

/// Number of posts echoed verbatim into the prompt.
pub const SAMPLE_POST_LIMIT: usize = 6;

/// Captions in the sample are cut to this many characters.
pub const CAPTION_CHAR_LIMIT: usize = 160;

/// The model-facing view of a post. Reach and hashtags are left out; they
/// only feed the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplePost {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub saves: u64,
    pub duration_sec: u64,
    pub caption: String,
}

impl From<&Post> for SamplePost {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id().to_owned(),
            kind: post.type_name().to_owned(),
            likes: post.likes(),
            comments: post.comments(),
            views: post.views(),
            saves: post.saves(),
            duration_sec: post.duration_sec(),
            caption: post.caption().chars().take(CAPTION_CHAR_LIMIT).collect(),
        }
    }
}

/// Everything the model sees about the account, serialized as JSON into
/// the user prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPayload {
    pub account_url: String,
    pub follower_count: u64,
    pub goals: Vec<String>,
    pub summary_metrics: MetricsSummary,
    pub sample_posts: Vec<SamplePost>,
}

impl PromptPayload {
    #[must_use]
    pub fn new(request: &AnalysisRequest, summary: &MetricsSummary) -> Self {
        Self {
            account_url: request.account_url().to_owned(),
            follower_count: request.follower_count(),
            goals: request.goals().to_vec(),
            summary_metrics: summary.clone(),
            sample_posts: request
                .posts()
                .iter()
                .take(SAMPLE_POST_LIMIT)
                .map(SamplePost::from)
                .collect(),
        }
    }
}

/// System message sent with every report request.
#[must_use]
pub fn system_instruction(language: &str) -> String {
    format!(
        "You are an Instagram content strategist writing in {language}. \
         Be concrete and data-driven. Keep it short and actionable."
    )
}

/// Renders the user message: the payload as compact JSON followed by the
/// numbered section outline the sectionizer relies on.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the payload cannot be serialized.
pub fn render_user_prompt(
    payload: &PromptPayload,
    language: &str,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(format!(
        "Write feedback in {language} based on the data below.\n\
         Input (JSON): {json}\n\
         Output sections, each starting on its own line with the number shown:\n\
         1) Scorecard (out of 10) - hook, retention, format mix, caption/hashtags, cadence, overall\n\
         2) Diagnostics - 3 to 5 key problems\n\
         3) Recommendations - 2 formats to push (with reasons), 2 formats to fix (3 concrete edits each), 5 new ideas (title/hook/structure)\n\
         4) 30-day plan - weekly missions with KPI targets, one item per line"
    ))
}
