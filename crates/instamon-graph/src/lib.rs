//! Client for the Instagram Graph API endpoints used by instamon.
//!
//! Covers the account media listing (cursor-paginated), first-page comment
//! and reply listings, per-post insights and the account follower lookup.
//! The access token travels as a query parameter on every call and is
//! scrubbed from any URL that ends up in an error or a log field.

pub mod client;
pub mod error;
pub mod pagination;
pub mod redact;
pub mod types;

pub use client::{GraphClient, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use error::GraphError;
pub use pagination::MAX_PAGES;
pub use redact::redact_url;
pub use types::{Account, Comment, Page, Paging, Post, PostInsights, UNKNOWN_AUTHOR};
