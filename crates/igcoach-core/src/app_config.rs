use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, loaded once at startup and never mutated.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Accepted `x-api-key` values. Empty means the caller decides the
    /// fallback (see the server's auth setup).
    pub api_keys: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub report_language: String,
    /// Replacement HTML for `GET /privacy`, read from
    /// `IGCOACH_PRIVACY_PAGE_PATH` at load time.
    pub privacy_page: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("allowed_origins", &self.allowed_origins)
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("report_language", &self.report_language)
            .field(
                "privacy_page",
                &self.privacy_page.as_ref().map(|p| format!("{} bytes", p.len())),
            )
            .finish()
    }
}
