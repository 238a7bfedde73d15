//! Run state machine.
//!
//! `CollectingPosts -> (KeywordMode | MonthlyMode) -> BuildingReport -> Done`,
//! with `Aborted` reachable on a fatal error. The analysis kind and post
//! filter are fixed by the [`RunConfig`] before the first request and are
//! independent of each other.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use instamon_core::{AnalysisKind, AppConfig, LogLine, LogSink, RunConfig, RunLog};
use instamon_graph::{Account, GraphClient, GraphError, Post};

use crate::comments::{error_payload, CommentCollector};
use crate::error::{MonitorError, RunAborted};
use crate::matcher::{KeywordMatcher, KeywordTally};
use crate::monthly::{aggregate, attach_insights, MonthlyBuckets};
use crate::report::{Report, ReportBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    CollectingPosts,
    KeywordMode,
    MonthlyMode,
    BuildingReport,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CollectingPosts => "collecting posts",
            Self::KeywordMode => "monitoring keywords",
            Self::MonthlyMode => "aggregating monthly indicators",
            Self::BuildingReport => "building report",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Process-level knobs for a run, usually taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub page_size: u32,
    pub inter_post_delay: Duration,
    pub output_dir: PathBuf,
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            inter_post_delay: Duration::from_millis(config.inter_post_delay_ms),
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub posts_collected: usize,
    pub comments_processed: usize,
    pub replies_processed: usize,
    pub posts_skipped: usize,
    pub insights_failures: usize,
}

#[derive(Debug)]
pub struct RunOutput {
    /// Where the report was written.
    pub path: PathBuf,
    pub bytes: usize,
    pub report: Report,
    pub log: RunLog,
    pub summary: RunSummary,
    /// Keyword runs only.
    pub tally: Option<KeywordTally>,
    /// Monthly runs only.
    pub buckets: Option<MonthlyBuckets>,
    /// States visited, in order.
    pub states: Vec<RunState>,
}

/// Forwards every line to the caller's sink and keeps the run's own copy.
struct Recorder<'s> {
    log: RunLog,
    sink: &'s mut dyn LogSink,
}

impl LogSink for Recorder<'_> {
    fn append(&mut self, line: &LogLine) {
        self.log.append(line);
        self.sink.append(line);
    }
}

/// Analysis branch, resolved before the listing starts. Monthly runs carry
/// the account they were resolved against.
enum Mode {
    Keywords,
    Monthly(Account),
}

enum Analysis {
    Keywords(KeywordTally),
    Monthly(MonthlyBuckets),
}

pub struct Orchestrator<'a> {
    client: &'a GraphClient,
    config: &'a RunConfig,
    settings: RunSettings,
    states: Vec<RunState>,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(client: &'a GraphClient, config: &'a RunConfig, settings: RunSettings) -> Self {
        Self {
            client,
            config,
            settings,
            states: Vec::new(),
        }
    }

    /// Runs the whole pipeline, streaming run-log lines into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`RunAborted`] when the account lookup (monthly runs) or the
    /// post listing fails, or when the report cannot be built or written.
    /// No report file exists after an abort.
    pub async fn run(mut self, sink: &mut dyn LogSink) -> Result<RunOutput, RunAborted> {
        let mut rec = Recorder {
            log: RunLog::new(),
            sink,
        };
        let mut summary = RunSummary::default();

        self.enter(RunState::CollectingPosts);
        let mode = match self.config.analysis {
            AnalysisKind::MonthlyIndicators => match self.client.fetch_account(&self.config.account_id).await {
                Ok(account) => Mode::Monthly(account),
                Err(e) => {
                    rec.append(&LogLine::warning(format!(
                        "Error fetching account {}: {}",
                        self.config.account_id,
                        error_payload(&e)
                    )));
                    return Err(self.abort(rec, e.into()));
                }
            },
            AnalysisKind::KeywordMonitoring => Mode::Keywords,
        };

        let posts = match self.collect_posts(&mut rec).await {
            Ok(posts) => posts,
            Err(e) => {
                rec.append(&LogLine::warning(format!(
                    "Error listing posts: {}",
                    error_payload(&e)
                )));
                return Err(self.abort(rec, e.into()));
            }
        };
        summary.posts_collected = posts.len();
        rec.append(&LogLine::info(format!("Total of {} posts collected!", posts.len())));

        let (analysis, report) = match mode {
            Mode::Monthly(account) => {
                self.enter(RunState::MonthlyMode);
                let buckets = self.monthly(posts, &account, &mut rec, &mut summary).await;
                self.enter(RunState::BuildingReport);
                let report = ReportBuilder::monthly_report(&account, &buckets);
                (Analysis::Monthly(buckets), report)
            }
            Mode::Keywords => {
                self.enter(RunState::KeywordMode);
                let tally = match self.keywords(&posts, &mut rec, &mut summary).await {
                    Ok(tally) => tally,
                    Err(e) => return Err(self.abort(rec, e)),
                };
                self.enter(RunState::BuildingReport);
                // The summary block is rendered from the tally, so the log
                // snapshot is taken before the results lines are appended.
                let report = ReportBuilder::keyword_report(&rec.log, &tally);
                rec.append(&LogLine::section("Final results:"));
                for entry in tally.entries() {
                    rec.append(&LogLine::info(tally.summary_line(entry)));
                }
                (Analysis::Keywords(tally), report)
            }
        };

        let (path, bytes) = match report.write_to(&self.settings.output_dir) {
            Ok(written) => written,
            Err(e) => {
                rec.append(&LogLine::warning(format!("Error saving report: {e}")));
                return Err(self.abort(rec, e.into()));
            }
        };
        rec.append(&LogLine::info(format!("Report saved as {}", report.file_name)));
        self.enter(RunState::Done);

        tracing::info!(
            posts = summary.posts_collected,
            comments = summary.comments_processed,
            replies = summary.replies_processed,
            skipped = summary.posts_skipped,
            insights_failures = summary.insights_failures,
            "run finished"
        );

        let (tally, buckets) = match analysis {
            Analysis::Keywords(tally) => (Some(tally), None),
            Analysis::Monthly(buckets) => (None, Some(buckets)),
        };
        Ok(RunOutput {
            path,
            bytes,
            report,
            log: rec.log,
            summary,
            tally,
            buckets,
            states: self.states,
        })
    }

    /// Lists posts through the paginator, applying the month filter as
    /// they stream in.
    async fn collect_posts(&self, rec: &mut Recorder<'_>) -> Result<Vec<Post>, GraphError> {
        let selection = &self.config.selection;
        self.client
            .list_posts(
                &self.config.account_id,
                self.settings.page_size,
                selection.target(),
                |post| {
                    if !selection.accepts(post.month()) {
                        return false;
                    }
                    rec.append(&LogLine::info(format!("Post found: {}", post.permalink)));
                    true
                },
            )
            .await
    }

    async fn keywords(
        &self,
        posts: &[Post],
        rec: &mut Recorder<'_>,
        summary: &mut RunSummary,
    ) -> Result<KeywordTally, MonitorError> {
        let matcher = KeywordMatcher::new(
            &self.config.keywords,
            self.config.count_policy,
            self.config.accumulate_likes,
        )?;
        let mut tally = matcher.empty_tally();
        let collector = CommentCollector::new(
            self.client,
            &matcher,
            self.config.include_replies,
            self.settings.inter_post_delay,
        );

        let stats = collector.collect(posts, &mut tally, rec).await;
        summary.comments_processed = stats.comments;
        summary.replies_processed = stats.replies;
        summary.posts_skipped = stats.posts_skipped;
        Ok(tally)
    }

    async fn monthly(
        &self,
        posts: Vec<Post>,
        account: &Account,
        rec: &mut Recorder<'_>,
        summary: &mut RunSummary,
    ) -> MonthlyBuckets {
        let posts = if self.config.fetch_insights {
            let (posts, failures) = attach_insights(self.client, posts, rec).await;
            summary.insights_failures = failures;
            posts
        } else {
            posts
        };

        let buckets = aggregate(&posts);
        rec.append(&LogLine::section(format!(
            "Monthly indicators for {} ({} followers):",
            account.username.as_deref().unwrap_or(&account.id),
            account.followers_count
        )));
        for (month, totals) in buckets.iter() {
            rec.append(&LogLine::info(MonthlyBuckets::describe(month, totals)));
        }
        buckets
    }

    fn enter(&mut self, state: RunState) {
        tracing::debug!(%state, "run state");
        self.states.push(state);
    }

    fn abort(mut self, rec: Recorder<'_>, error: MonitorError) -> RunAborted {
        let state = self.states.last().copied().unwrap_or(RunState::CollectingPosts);
        tracing::error!(%state, error = %error, "run aborted");
        self.enter(RunState::Aborted);
        RunAborted {
            state,
            error,
            log: rec.log,
            states: self.states,
        }
    }
}
