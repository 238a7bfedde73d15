//! Graph API response types.

use chrono::{DateTime, FixedOffset};
use instamon_core::MonthKey;
use serde::{Deserialize, Deserializer};

/// Author shown when a comment arrives without a username.
pub const UNKNOWN_AUTHOR: &str = "unknown user";

/// One page of a Graph API edge listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> Page<T> {
    /// The next-link, if the listing has more pages.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// A media item from the account listing.
///
/// `impressions` and `reach` are not part of the listing; they stay `0`
/// unless filled from a separate insights call via [`Post::with_insights`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(deserialize_with = "deserialize_graph_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default, rename = "comments_count")]
    pub comment_count: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub reach: u64,
}

impl Post {
    /// Calendar month of the post, in the offset the API reported.
    #[must_use]
    pub fn month(&self) -> MonthKey {
        MonthKey::from_timestamp(&self.timestamp)
    }

    /// Copy of the post carrying the given insight metrics.
    #[must_use]
    pub fn with_insights(self, insights: PostInsights) -> Self {
        Self {
            impressions: insights.impressions,
            reach: insights.reach,
            ..self
        }
    }
}

/// A comment or a reply. Both edges share the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub like_count: u64,
}

impl Comment {
    #[must_use]
    pub fn author(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Impressions and reach of one post. Missing metrics are `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostInsights {
    pub impressions: u64,
    pub reach: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightsResponse {
    #[serde(default)]
    pub(crate) data: Vec<InsightMetric>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightMetric {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) values: Vec<InsightValue>,
    #[serde(default)]
    pub(crate) total_value: Option<InsightValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightValue {
    #[serde(default)]
    pub(crate) value: Option<u64>,
}

impl InsightMetric {
    /// Lifetime value: first entry of `values`, else `total_value`.
    pub(crate) fn value(&self) -> Option<u64> {
        self.values
            .first()
            .and_then(|v| v.value)
            .or_else(|| self.total_value.as_ref().and_then(|v| v.value))
    }
}

impl From<InsightsResponse> for PostInsights {
    fn from(response: InsightsResponse) -> Self {
        let mut insights = PostInsights::default();
        for metric in &response.data {
            let value = metric.value().unwrap_or(0);
            match metric.name.as_str() {
                "impressions" => insights.impressions = value,
                "reach" => insights.reach = value,
                _ => {}
            }
        }
        insights
    }
}

/// Instagram business account summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
}

/// Graph timestamps look like `2024-03-15T12:34:56+0000`; RFC 3339 is
/// accepted as well.
fn deserialize_graph_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_graph_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised timestamp \"{raw}\""))
    })
}

pub(crate) fn parse_graph_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_graph_offset_without_colon() {
        let ts = parse_graph_timestamp("2024-03-15T12:34:56+0000").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-15T12:34:56+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        assert!(parse_graph_timestamp("2024-03-15T12:34:56-03:00").is_some());
        assert!(parse_graph_timestamp("15/03/2024").is_none());
    }

    #[test]
    fn post_defaults_missing_metrics_to_zero() {
        let post: Post = serde_json::from_value(json!({
            "id": "1",
            "permalink": "https://www.instagram.com/p/abc/",
            "timestamp": "2024-03-15T12:34:56+0000"
        }))
        .unwrap();
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.impressions, 0);
        assert_eq!(post.reach, 0);
        assert_eq!(post.month().to_string(), "03/2024");
    }

    #[test]
    fn post_reads_comments_count_field() {
        let post: Post = serde_json::from_value(json!({
            "id": "1",
            "timestamp": "2024-03-15T12:34:56+0000",
            "like_count": 7,
            "comments_count": 3
        }))
        .unwrap();
        assert_eq!(post.like_count, 7);
        assert_eq!(post.comment_count, 3);
    }

    #[test]
    fn with_insights_keeps_other_fields() {
        let post: Post = serde_json::from_value(json!({
            "id": "9",
            "timestamp": "2024-03-15T12:34:56+0000",
            "like_count": 4
        }))
        .unwrap();
        let post = post.with_insights(PostInsights {
            impressions: 100,
            reach: 80,
        });
        assert_eq!(post.id, "9");
        assert_eq!(post.like_count, 4);
        assert_eq!((post.impressions, post.reach), (100, 80));
    }

    #[test]
    fn comment_author_falls_back_to_placeholder() {
        let comment: Comment = serde_json::from_value(json!({"id": "c1", "text": "hi"})).unwrap();
        assert_eq!(comment.author(), UNKNOWN_AUTHOR);
        let comment: Comment =
            serde_json::from_value(json!({"id": "c2", "username": "maria"})).unwrap();
        assert_eq!(comment.author(), "maria");
        assert_eq!(comment.text(), "");
    }

    #[test]
    fn insights_read_values_and_total_value() {
        let response: InsightsResponse = serde_json::from_value(json!({
            "data": [
                {"name": "impressions", "values": [{"value": 120}]},
                {"name": "reach", "total_value": {"value": 95}}
            ]
        }))
        .unwrap();
        assert_eq!(
            PostInsights::from(response),
            PostInsights {
                impressions: 120,
                reach: 95
            }
        );
    }

    #[test]
    fn insights_missing_metric_defaults_to_zero() {
        let response: InsightsResponse = serde_json::from_value(json!({
            "data": [{"name": "reach", "values": [{"value": 40}]}]
        }))
        .unwrap();
        assert_eq!(
            PostInsights::from(response),
            PostInsights {
                impressions: 0,
                reach: 40
            }
        );
    }

    #[test]
    fn page_next_link_ignores_empty_string() {
        let page: Page<Comment> =
            serde_json::from_value(json!({"data": [], "paging": {"next": ""}})).unwrap();
        assert!(page.next_link().is_none());
    }
}
