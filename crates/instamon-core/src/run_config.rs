//! Per-run parameters.
//!
//! A [`RunRequest`] carries the raw values collected from the operator.
//! [`RunRequest::validate`] turns it into a [`RunConfig`], which is built
//! once before any network call and then only ever borrowed.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::month::MonthKey;
use crate::ValidationError;

/// Upper bound for the most-recent-N post selection.
pub const MAX_POST_COUNT: u32 = 500;

/// Which report the run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    KeywordMonitoring,
    MonthlyIndicators,
}

/// How keyword hits inside one comment are counted.
///
/// `Occurrences` adds every non-overlapping hit; `PerComment` adds at most
/// one per comment. Likes follow the same unit: one `like_count` per hit,
/// or one per matching comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    #[default]
    Occurrences,
    PerComment,
}

/// Raw selection mode as chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    ByCount,
    ByMonthList,
}

/// Validated post filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSelection {
    /// The `n` most recent posts, no month filter.
    MostRecent(usize),
    /// Every post whose month is in the set, no count bound.
    Months(BTreeSet<MonthKey>),
}

impl PostSelection {
    /// Pagination target: `Some(n)` for the count filter, `None` for months.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        match self {
            Self::MostRecent(n) => Some(*n),
            Self::Months(_) => None,
        }
    }

    /// Whether a post from `month` passes the filter.
    #[must_use]
    pub fn accepts(&self, month: MonthKey) -> bool {
        match self {
            Self::MostRecent(_) => true,
            Self::Months(months) => months.contains(&month),
        }
    }
}

/// Unvalidated run parameters, as entered by the operator.
#[derive(Clone)]
pub struct RunRequest {
    pub access_token: String,
    pub account_id: String,
    pub selection_mode: SelectionMode,
    pub post_count: u32,
    pub months: Vec<String>,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub analysis: AnalysisKind,
    pub include_replies: bool,
    pub count_policy: CountPolicy,
    pub accumulate_likes: bool,
    pub fetch_insights: bool,
}

impl RunRequest {
    /// Checks the request and builds the immutable run context.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking credential,
    /// account, post selection and keywords in that order.
    pub fn validate(self) -> Result<RunConfig, ValidationError> {
        let access_token = self.access_token.trim().to_string();
        if access_token.is_empty() {
            return Err(ValidationError::MissingCredential);
        }
        let account_id = self.account_id.trim().to_string();
        if account_id.is_empty() {
            return Err(ValidationError::MissingAccountId);
        }

        let selection = match self.selection_mode {
            SelectionMode::ByCount => {
                if self.post_count == 0 || self.post_count > MAX_POST_COUNT {
                    return Err(ValidationError::PostCountOutOfRange(self.post_count));
                }
                PostSelection::MostRecent(self.post_count as usize)
            }
            SelectionMode::ByMonthList => {
                let months = self
                    .months
                    .iter()
                    .filter(|m| !m.trim().is_empty())
                    .map(|m| m.parse::<MonthKey>())
                    .collect::<Result<BTreeSet<_>, _>>()?;
                if months.is_empty() {
                    return Err(ValidationError::NoMonthsSelected);
                }
                PostSelection::Months(months)
            }
        };

        let keywords = normalize_keywords(&self.keywords);
        if self.analysis == AnalysisKind::KeywordMonitoring && keywords.is_empty() {
            return Err(ValidationError::NoKeywords);
        }

        Ok(RunConfig {
            access_token,
            account_id,
            selection,
            keywords,
            analysis: self.analysis,
            include_replies: self.include_replies,
            count_policy: self.count_policy,
            accumulate_likes: self.accumulate_likes,
            fetch_insights: self.fetch_insights,
        })
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("access_token", &"[redacted]")
            .field("account_id", &self.account_id)
            .field("selection_mode", &self.selection_mode)
            .field("post_count", &self.post_count)
            .field("months", &self.months)
            .field("keywords", &self.keywords)
            .field("analysis", &self.analysis)
            .field("include_replies", &self.include_replies)
            .field("count_policy", &self.count_policy)
            .field("accumulate_likes", &self.accumulate_likes)
            .field("fetch_insights", &self.fetch_insights)
            .finish()
    }
}

/// Immutable context for one run.
#[derive(Clone)]
pub struct RunConfig {
    pub access_token: String,
    pub account_id: String,
    pub selection: PostSelection,
    /// Lower-cased, trimmed, de-duplicated; input order preserved.
    pub keywords: Vec<String>,
    pub analysis: AnalysisKind,
    pub include_replies: bool,
    pub count_policy: CountPolicy,
    pub accumulate_likes: bool,
    pub fetch_insights: bool,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("access_token", &"[redacted]")
            .field("account_id", &self.account_id)
            .field("selection", &self.selection)
            .field("keywords", &self.keywords)
            .field("analysis", &self.analysis)
            .field("include_replies", &self.include_replies)
            .field("count_policy", &self.count_policy)
            .field("accumulate_likes", &self.accumulate_likes)
            .field("fetch_insights", &self.fetch_insights)
            .finish()
    }
}

/// Splits a comma-separated keyword list into lower-cased, trimmed tokens.
///
/// Empty tokens are dropped and duplicates keep their first position.
#[must_use]
pub fn normalize_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in raw.split(',') {
        let token = token.trim().to_lowercase();
        if token.is_empty() || keywords.contains(&token) {
            continue;
        }
        keywords.push(token);
    }
    keywords
}

#[cfg(test)]
#[path = "run_config_test.rs"]
mod tests;
