//! Comment and reply collection for keyword monitoring.
//!
//! Per-post failures are logged and skipped rather than propagated, so one
//! post whose comments cannot be read does not abort the run. This is the
//! opposite of the post listing, where the first failing page is fatal.

use std::time::Duration;

use instamon_core::{LogLine, LogSink};
use instamon_graph::{Comment, GraphClient, GraphError, Post};

use crate::matcher::{KeywordMatcher, KeywordTally};

/// Counters for one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub posts_processed: usize,
    pub posts_skipped: usize,
    pub comments: usize,
    pub replies: usize,
    pub reply_failures: usize,
}

/// Walks the comments (and optionally replies) of each post, feeding every
/// text body to the [`KeywordMatcher`].
pub struct CommentCollector<'a> {
    client: &'a GraphClient,
    matcher: &'a KeywordMatcher,
    include_replies: bool,
    inter_post_delay: Duration,
}

impl<'a> CommentCollector<'a> {
    #[must_use]
    pub fn new(
        client: &'a GraphClient,
        matcher: &'a KeywordMatcher,
        include_replies: bool,
        inter_post_delay: Duration,
    ) -> Self {
        Self {
            client,
            matcher,
            include_replies,
            inter_post_delay,
        }
    }

    /// Processes `posts` in order, adding keyword hits to `tally` and
    /// writing one line per comment to `log`.
    ///
    /// Only the first page of comments and replies is read. The fixed
    /// inter-post delay is applied between posts.
    pub async fn collect(
        &self,
        posts: &[Post],
        tally: &mut KeywordTally,
        log: &mut dyn LogSink,
    ) -> CollectStats {
        let mut stats = CollectStats::default();
        let total = posts.len();

        for (index, post) in posts.iter().enumerate() {
            if index > 0 && !self.inter_post_delay.is_zero() {
                tokio::time::sleep(self.inter_post_delay).await;
            }

            log.append(&LogLine::section(format!(
                "Analyzing post {}/{total} - {}",
                index + 1,
                post.permalink
            )));
            // Captions are shown for context but never counted.
            if let Some(caption) = post.caption.as_deref().filter(|c| !c.trim().is_empty()) {
                log.append(&LogLine::info(format!("Caption: {caption}")));
            }

            let comments = match self.client.fetch_comments(&post.id).await {
                Ok(comments) => comments,
                Err(e) => {
                    tracing::warn!(post_id = %post.id, error = %e, "comment fetch failed, skipping post");
                    log.append(&LogLine::warning(format!(
                        "Error fetching comments for post {}: {}",
                        post.id,
                        error_payload(&e)
                    )));
                    stats.posts_skipped += 1;
                    continue;
                }
            };
            stats.posts_processed += 1;

            if comments.is_empty() {
                log.append(&LogLine::info("No comments found."));
                continue;
            }
            log.append(&LogLine::info(format!("{} comments found!", comments.len())));

            for comment in &comments {
                self.analyze(comment, tally, log);
                stats.comments += 1;

                if self.include_replies {
                    self.collect_replies(comment, tally, log, &mut stats).await;
                }
            }
        }

        stats
    }

    async fn collect_replies(
        &self,
        comment: &Comment,
        tally: &mut KeywordTally,
        log: &mut dyn LogSink,
        stats: &mut CollectStats,
    ) {
        match self.client.fetch_replies(&comment.id).await {
            Ok(replies) => {
                if replies.is_empty() {
                    return;
                }
                log.append(&LogLine::info(format!(
                    "   {} replies found for the comment by {}:",
                    replies.len(),
                    comment.author()
                )));
                for reply in &replies {
                    self.analyze(reply, tally, log);
                    stats.replies += 1;
                }
            }
            Err(e) => {
                tracing::warn!(comment_id = %comment.id, error = %e, "reply fetch failed");
                log.append(&LogLine::warning(format!(
                    "   Error fetching replies for comment {}: {}",
                    comment.id,
                    error_payload(&e)
                )));
                stats.reply_failures += 1;
            }
        }
    }

    /// Logs a non-empty comment and counts its keywords. Empty bodies are
    /// neither logged nor counted.
    fn analyze(&self, comment: &Comment, tally: &mut KeywordTally, log: &mut dyn LogSink) {
        let text = comment.text();
        if text.is_empty() {
            return;
        }
        log.append(&LogLine::info(format!("   {}: {text}", comment.author())));
        self.matcher.record(text, comment.like_count, tally);
    }
}

/// The raw API payload when there is one, otherwise the error message.
pub(crate) fn error_payload(error: &GraphError) -> String {
    error
        .api_body()
        .map_or_else(|| error.to_string(), str::to_owned)
}
