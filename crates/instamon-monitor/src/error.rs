use std::path::PathBuf;

use instamon_core::RunLog;
use thiserror::Error;

use crate::orchestrator::RunState;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Graph API error: {0}")]
    Graph(#[from] instamon_graph::GraphError),

    #[error("invalid keyword pattern \"{keyword}\": {source}")]
    Pattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build document: {0}")]
    Docx(String),

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A run that stopped before producing a report.
#[derive(Debug, Error)]
#[error("run aborted while {state}: {error}")]
pub struct RunAborted {
    pub state: RunState,
    #[source]
    pub error: MonitorError,
    /// Run log up to and including the failure line.
    pub log: RunLog,
    /// States visited, ending with [`RunState::Aborted`].
    pub states: Vec<RunState>,
}
