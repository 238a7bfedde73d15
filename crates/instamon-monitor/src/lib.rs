//! Keyword monitoring and monthly indicators for an Instagram account.
//!
//! Collects posts through the Graph API paginator, counts keywords across
//! comments and replies, or sums engagement per calendar month, and turns
//! the run into a `.docx` report.

pub mod comments;
pub mod error;
pub mod matcher;
pub mod monthly;
pub mod orchestrator;
pub mod report;

pub use comments::{CollectStats, CommentCollector};
pub use error::{MonitorError, ReportError, RunAborted};
pub use matcher::{count_occurrences, KeywordCount, KeywordMatcher, KeywordTally};
pub use monthly::{aggregate, attach_insights, MonthlyBuckets, MonthlyTotals};
pub use orchestrator::{Orchestrator, RunOutput, RunSettings, RunState, RunSummary};
pub use report::{Block, Report, ReportBuilder, MONTHLY_REPORT_FILE_NAME};
