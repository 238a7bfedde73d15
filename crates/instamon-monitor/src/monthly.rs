//! Monthly engagement indicators.

use std::collections::BTreeMap;

use instamon_core::{LogLine, LogSink, MonthKey};
use instamon_graph::{GraphClient, Post};

use crate::comments::error_payload;

/// Summed metrics of one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub likes: u64,
    pub comments: u64,
    pub impressions: u64,
    pub reach: u64,
}

impl MonthlyTotals {
    fn add(&mut self, post: &Post) {
        self.likes = self.likes.saturating_add(post.like_count);
        self.comments = self.comments.saturating_add(post.comment_count);
        self.impressions = self.impressions.saturating_add(post.impressions);
        self.reach = self.reach.saturating_add(post.reach);
    }
}

/// Month buckets, iterated oldest first. A bucket exists only once a post
/// has landed in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyBuckets {
    buckets: BTreeMap<MonthKey, MonthlyTotals>,
}

impl MonthlyBuckets {
    pub fn add(&mut self, post: &Post) {
        self.buckets.entry(post.month()).or_default().add(post);
    }

    #[must_use]
    pub fn get(&self, month: MonthKey) -> Option<&MonthlyTotals> {
        self.buckets.get(&month)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonthKey, &MonthlyTotals)> {
        self.buckets.iter().map(|(k, v)| (*k, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `MM/YYYY: ...` line for one bucket.
    #[must_use]
    pub fn describe(month: MonthKey, totals: &MonthlyTotals) -> String {
        format!(
            "{month}: {} likes, {} comments, {} impressions, {} reach",
            totals.likes, totals.comments, totals.impressions, totals.reach
        )
    }
}

/// Folds posts into month buckets. Input order does not affect the sums.
pub fn aggregate<'a, I>(posts: I) -> MonthlyBuckets
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .fold(MonthlyBuckets::default(), |mut buckets, post| {
            buckets.add(post);
            buckets
        })
}

/// Fills impressions and reach for each post with one insights call per
/// post.
///
/// A failed call leaves that post's metrics at `0`, logs a warning and moves
/// on. Returns the enriched posts and the number of failed calls.
pub async fn attach_insights(
    client: &GraphClient,
    posts: Vec<Post>,
    log: &mut dyn LogSink,
) -> (Vec<Post>, usize) {
    let mut failures = 0usize;
    let mut enriched = Vec::with_capacity(posts.len());

    for post in posts {
        match client.fetch_insights(&post.id).await {
            Ok(insights) => enriched.push(post.with_insights(insights)),
            Err(e) => {
                tracing::warn!(post_id = %post.id, error = %e, "insights fetch failed");
                log.append(&LogLine::warning(format!(
                    "Error fetching insights for post {}: {}",
                    post.id,
                    error_payload(&e)
                )));
                failures += 1;
                enriched.push(post);
            }
        }
    }

    (enriched, failures)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn post(id: &str, timestamp: &str, likes: u64, comments: u64, impressions: u64, reach: u64) -> Post {
        Post {
            id: id.to_string(),
            caption: None,
            media_type: None,
            permalink: format!("https://www.instagram.com/p/{id}/"),
            timestamp: DateTime::parse_from_rfc3339(timestamp).unwrap(),
            like_count: likes,
            comment_count: comments,
            impressions,
            reach,
        }
    }

    fn sample_posts() -> Vec<Post> {
        vec![
            post("1", "2024-03-30T10:00:00+00:00", 10, 2, 100, 80),
            post("2", "2024-03-01T00:00:00+00:00", 5, 1, 50, 40),
            post("3", "2024-02-14T18:00:00+00:00", 7, 0, 0, 0),
            post("4", "2023-12-31T23:59:59+00:00", 1, 4, 10, 9),
            post("5", "2024-02-01T08:00:00+00:00", 3, 3, 30, 20),
        ]
    }

    #[test]
    fn sums_per_month() {
        let buckets = aggregate(&sample_posts());

        assert_eq!(buckets.len(), 3);
        assert_eq!(
            buckets.get(MonthKey::new(2024, 3).unwrap()),
            Some(&MonthlyTotals {
                likes: 15,
                comments: 3,
                impressions: 150,
                reach: 120
            })
        );
        assert_eq!(buckets.get(MonthKey::new(2024, 2).unwrap()).unwrap().likes, 10);
        assert!(buckets.get(MonthKey::new(2024, 1).unwrap()).is_none());
    }

    #[test]
    fn iterates_chronologically() {
        let buckets = aggregate(&sample_posts());
        let months: Vec<String> = buckets.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(months, vec!["12/2023", "02/2024", "03/2024"]);
    }

    #[test]
    fn order_does_not_change_sums() {
        let posts = sample_posts();
        let expected = aggregate(&posts);

        // Every rotation and the reverse of each.
        for shift in 0..posts.len() {
            let mut rotated = posts.clone();
            rotated.rotate_left(shift);
            assert_eq!(aggregate(&rotated), expected, "rotation {shift}");
            rotated.reverse();
            assert_eq!(aggregate(&rotated), expected, "reversed rotation {shift}");
        }
    }

    #[test]
    fn split_and_merge_matches_single_fold() {
        let posts = sample_posts();
        let (left, right) = posts.split_at(2);
        let mut merged = aggregate(left);
        for p in right {
            merged.add(p);
        }
        assert_eq!(merged, aggregate(&posts));
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(aggregate(&Vec::<Post>::new()).is_empty());
    }

    #[test]
    fn describe_lists_all_four_metrics() {
        let totals = MonthlyTotals {
            likes: 1,
            comments: 2,
            impressions: 3,
            reach: 4,
        };
        assert_eq!(
            MonthlyBuckets::describe(MonthKey::new(2024, 5).unwrap(), &totals),
            "05/2024: 1 likes, 2 comments, 3 impressions, 4 reach"
        );
    }
}
