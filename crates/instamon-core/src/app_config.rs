use std::path::PathBuf;

/// Process-level settings read from the environment.
///
/// Per-run parameters (token, account, keywords) live in
/// [`crate::RunConfig`] instead.
#[derive(Clone)]
pub struct AppConfig {
    pub graph_base_url: String,
    pub graph_api_version: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub inter_post_delay_ms: u64,
    pub output_dir: PathBuf,
    pub log_level: String,
    /// Fallback token when none is passed on the command line.
    pub access_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("graph_base_url", &self.graph_base_url)
            .field("graph_api_version", &self.graph_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("inter_post_delay_ms", &self.inter_post_delay_ms)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
