//! Shared domain types for instamon.
//!
//! Holds the process configuration loaded from the environment, the
//! immutable per-run configuration, the calendar-month key used for
//! bucketing posts, and the run-log sink abstraction.

pub mod app_config;
pub mod config;
pub mod log;
pub mod month;
pub mod run_config;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use log::{ConsoleSink, LineKind, LogLine, LogSink, RunLog};
pub use month::MonthKey;
pub use run_config::{
    normalize_keywords, AnalysisKind, CountPolicy, PostSelection, RunConfig, RunRequest, SelectionMode,
    MAX_POST_COUNT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Input rejected before a run is allowed to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("an access token is required")]
    MissingCredential,

    #[error("an Instagram account id is required")]
    MissingAccountId,

    #[error("post count must be between 1 and {MAX_POST_COUNT}, got {0}")]
    PostCountOutOfRange(u32),

    #[error("invalid month \"{0}\": expected MM/YYYY")]
    InvalidMonth(String),

    #[error("month selection is empty")]
    NoMonthsSelected,

    #[error("keyword monitoring needs at least one keyword")]
    NoKeywords,
}
