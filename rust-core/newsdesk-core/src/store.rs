//! # Store Interface
//!
//! The data access contract the API layer consumes. Implementations own all
//! persistent state; the API layer holds none between requests.

use crate::error::Result;
use crate::models::{Article, Topic};
use async_trait::async_trait;

/// Outcome of a vote increment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteUpdate {
    /// The increment was applied; carries the updated row
    Applied(Article),
    /// No article has this id
    NotFound,
    /// The new tally would leave `MIN_VOTES..=MAX_VOTES`; nothing was written
    OutOfRange,
}

/// Data access layer for topics and articles
///
/// `Ok(None)` and [`VoteUpdate::NotFound`] mean "no such row"; `Err` is
/// reserved for the store itself failing.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// All topics, ordered by slug
    async fn list_topics(&self) -> Result<Vec<Topic>>;

    /// The article with this id, if any
    async fn article_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Add `delta` to an article's votes in one atomic step
    ///
    /// The tally never leaves `MIN_VOTES..=MAX_VOTES`: an increment that
    /// would push it out is refused as a whole.
    async fn increment_article_votes(&self, id: i64, delta: i64) -> Result<VoteUpdate>;
}
