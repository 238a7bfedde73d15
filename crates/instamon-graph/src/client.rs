//! HTTP client for the Instagram Graph API.
//!
//! Wraps `reqwest` with Graph-specific URL building, credential handling and
//! typed response deserialization. Every non-success status is surfaced as
//! [`GraphError::Api`] carrying the raw response body.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GraphError;
use crate::redact::redact_url;
use crate::types::{Account, Comment, InsightsResponse, Page, PostInsights};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/";
pub const DEFAULT_API_VERSION: &str = "v18.0";

const MEDIA_FIELDS: &str = "id,caption,media_type,permalink,timestamp,like_count,comments_count";
const COMMENT_FIELDS: &str = "id,text,username,like_count";
const ACCOUNT_FIELDS: &str = "id,username,followers_count";
const INSIGHT_METRICS: &str = "impressions,reach";

/// Client for the Instagram Graph API.
///
/// Use [`GraphClient::new`] for production or [`GraphClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GraphClient {
    client: Client,
    access_token: String,
    base_url: Url,
    api_version: String,
}

impl GraphClient {
    /// Creates a client pointed at the production Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GraphError> {
        Self::with_base_url(
            access_token,
            timeout_secs,
            user_agent,
            DEFAULT_BASE_URL,
            DEFAULT_API_VERSION,
        )
    }

    /// Creates a client with a custom base URL and API version.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GraphError::InvalidUrl`] if `base_url` is not a usable base.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
        api_version: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GraphError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GraphError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
            api_version: api_version.trim_matches('/').to_owned(),
        })
    }

    /// First page URL of the account's media listing.
    #[must_use]
    pub fn media_url(&self, account_id: &str, page_size: u32) -> Url {
        self.endpoint(
            &[account_id, "media"],
            &[("fields", MEDIA_FIELDS), ("limit", &page_size.to_string())],
        )
    }

    #[must_use]
    pub fn comments_url(&self, post_id: &str) -> Url {
        self.endpoint(&[post_id, "comments"], &[("fields", COMMENT_FIELDS)])
    }

    #[must_use]
    pub fn replies_url(&self, comment_id: &str) -> Url {
        self.endpoint(&[comment_id, "replies"], &[("fields", COMMENT_FIELDS)])
    }

    #[must_use]
    pub fn insights_url(&self, post_id: &str) -> Url {
        self.endpoint(&[post_id, "insights"], &[("metric", INSIGHT_METRICS)])
    }

    #[must_use]
    pub fn account_url(&self, account_id: &str) -> Url {
        self.endpoint(&[account_id], &[("fields", ACCOUNT_FIELDS)])
    }

    /// Fetches the first page of comments on a post.
    ///
    /// Deeper pages are not followed.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Api`] on a non-success status.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::Deserialize`] if the body is not a comment listing.
    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>, GraphError> {
        let url = self.comments_url(post_id);
        let page: Page<Comment> = self.get_json(&url, &format!("comments({post_id})")).await?;
        if page.next_link().is_some() {
            tracing::debug!(post_id, "comment listing has more pages; only the first is read");
        }
        Ok(page.data)
    }

    /// Fetches the first page of replies to a comment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_comments`].
    pub async fn fetch_replies(&self, comment_id: &str) -> Result<Vec<Comment>, GraphError> {
        let url = self.replies_url(comment_id);
        let page: Page<Comment> = self
            .get_json(&url, &format!("replies({comment_id})"))
            .await?;
        if page.next_link().is_some() {
            tracing::debug!(comment_id, "reply listing has more pages; only the first is read");
        }
        Ok(page.data)
    }

    /// Fetches impressions and reach for one post.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_comments`].
    pub async fn fetch_insights(&self, post_id: &str) -> Result<PostInsights, GraphError> {
        let url = self.insights_url(post_id);
        let response: InsightsResponse = self
            .get_json(&url, &format!("insights({post_id})"))
            .await?;
        Ok(response.into())
    }

    /// Resolves the account id to its username and follower count.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_comments`].
    pub async fn fetch_account(&self, account_id: &str) -> Result<Account, GraphError> {
        let url = self.account_url(account_id);
        self.get_json(&url, &format!("account({account_id})")).await
    }

    /// Builds `{base}/{version}/{segments..}?{query..}&access_token=..`.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(&self.api_version);
            for segment in segments {
                path.push(segment);
            }
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("access_token", &self.access_token);
        }
        url
    }

    /// Sends a GET, turns non-success statuses into [`GraphError::Api`] and
    /// parses the body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, GraphError> {
        // reqwest errors embed the request URL, token included.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(GraphError::Api {
                status: status.as_u16(),
                url: redact_url(url.as_str()),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| GraphError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
