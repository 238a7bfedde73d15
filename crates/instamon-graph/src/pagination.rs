//! Cursor pagination over Graph API edge listings.
//!
//! Each page body carries its items under `data` and, when more items exist,
//! an absolute URL under `paging.next`. The next-link already embeds the
//! query parameters of the first request (credential included), so it is
//! followed verbatim.

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::redact::redact_url;
use crate::types::{Page, Post};

/// Maximum number of pages followed before giving up.
/// Protects against listings whose next-links cycle. With the default page
/// size of 25 this caps an unbounded (month-list) listing at 25,000 posts;
/// larger accounts need a bigger `INSTAMON_PAGE_SIZE`.
pub const MAX_PAGES: usize = 1_000;

impl GraphClient {
    /// Follows next-links from `start_url`, collecting the items `accept`
    /// keeps, until `target` items are kept or the listing is exhausted.
    ///
    /// Items come back in listing order. With a target, no page beyond the
    /// one holding the target-th accepted item is requested. With `None`,
    /// every page is read.
    ///
    /// **Fail-fast**: the first failing page aborts the whole walk and its
    /// error is returned; no retry is attempted.
    ///
    /// # Errors
    ///
    /// Propagates any page error from the client, returns
    /// [`GraphError::InvalidUrl`] for an unparseable next-link and
    /// [`GraphError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn paginate<T, F>(
        &self,
        start_url: Url,
        target: Option<usize>,
        mut accept: F,
    ) -> Result<Vec<T>, GraphError>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let mut items: Vec<T> = Vec::new();
        if target == Some(0) {
            return Ok(items);
        }

        let origin = redact_url(start_url.as_str());
        let mut next: Option<Url> = Some(start_url);
        let mut page_count = 0usize;

        while let Some(url) = next.take() {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(GraphError::PaginationLimit {
                    url: origin,
                    max_pages: MAX_PAGES,
                });
            }

            let page: Page<T> = self
                .get_json(&url, &format!("page {page_count} of {origin}"))
                .await?;
            let next_link = page.next_link().map(str::to_owned);

            for item in page.data {
                if !accept(&item) {
                    continue;
                }
                items.push(item);
                if target.is_some_and(|t| items.len() >= t) {
                    tracing::debug!(pages = page_count, items = items.len(), "pagination target reached");
                    return Ok(items);
                }
            }

            next = match next_link {
                Some(link) => Some(Url::parse(&link).map_err(|e| GraphError::InvalidUrl {
                    url: redact_url(&link),
                    reason: e.to_string(),
                })?),
                None => None,
            };
        }

        tracing::debug!(pages = page_count, items = items.len(), "pagination exhausted");
        Ok(items)
    }

    /// Lists the account's posts, newest first, through [`Self::paginate`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::paginate`].
    pub async fn list_posts<F>(
        &self,
        account_id: &str,
        page_size: u32,
        target: Option<usize>,
        accept: F,
    ) -> Result<Vec<Post>, GraphError>
    where
        F: FnMut(&Post) -> bool,
    {
        let url = self.media_url(account_id, page_size);
        self.paginate(url, target, accept).await
    }
}
