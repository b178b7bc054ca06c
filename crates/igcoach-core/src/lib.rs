//! Domain types and pure logic for the IG content coach.
//!
//! Everything here is synchronous and free of I/O apart from configuration
//! loading: the metrics summarizer, the prompt builder, and the sectionizer
//! that splits a generated report back into its parts.

pub mod app_config;
pub mod config;
pub mod metrics;
pub mod posts;
pub mod prompt;
pub mod sections;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use metrics::{summarize, MetricsSummary, PostMix};
pub use posts::{AnalysisRequest, Post, PostKind};
pub use prompt::{render_user_prompt, system_instruction, PromptPayload, SamplePost};
pub use sections::{sectionize, AnalysisResult, RawSection, ReportSections};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
