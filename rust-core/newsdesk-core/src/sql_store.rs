//! # SQL Store
//!
//! [`NewsStore`] backed by a SQLx pool. A vote update is a single guarded
//! statement, so concurrent updates on one article cannot lose writes and an
//! update that would leave the tally range writes nothing.

use crate::database::{with_pool, DatabasePool};
use crate::error::Result;
use crate::models::{Article, Topic, MAX_VOTES, MIN_VOTES};
use crate::store::{NewsStore, VoteUpdate};
use async_trait::async_trait;
use tracing::debug;

const SELECT_TOPICS: &str = "SELECT slug, description FROM topics ORDER BY slug";

const SELECT_ARTICLE: &str = "SELECT author, title, article_id, body, topic, created_at, votes \
     FROM articles WHERE article_id = $1";

const INCREMENT_VOTES: &str = "UPDATE articles SET votes = votes + $1 \
     WHERE article_id = $2 AND votes + $1 BETWEEN $3 AND $4 \
     RETURNING author, title, article_id, body, topic, created_at, votes";

const COUNT_ARTICLE: &str = "SELECT COUNT(*) FROM articles WHERE article_id = $1";

/// Store that runs queries against a [`DatabasePool`]
#[derive(Clone, Debug)]
pub struct SqlNewsStore {
    db: DatabasePool,
}

impl SqlNewsStore {
    /// Wrap an open pool
    #[must_use]
    pub const fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NewsStore for SqlNewsStore {
    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let topics = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, Topic>(SELECT_TOPICS).fetch_all(pool).await?
        });
        Ok(topics)
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let article = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, Article>(SELECT_ARTICLE)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });
        Ok(article)
    }

    async fn increment_article_votes(&self, id: i64, delta: i64) -> Result<VoteUpdate> {
        let article = with_pool!(&self.db, pool => {
            sqlx::query_as::<_, Article>(INCREMENT_VOTES)
                .bind(delta)
                .bind(id)
                .bind(MIN_VOTES)
                .bind(MAX_VOTES)
                .fetch_optional(pool)
                .await?
        });
        if let Some(article) = article {
            debug!(article_id = id, delta, votes = article.votes, "Votes incremented");
            return Ok(VoteUpdate::Applied(article));
        }

        let count: i64 = with_pool!(&self.db, pool => {
            sqlx::query_scalar(COUNT_ARTICLE).bind(id).fetch_one(pool).await?
        });
        if count == 0 {
            Ok(VoteUpdate::NotFound)
        } else {
            debug!(article_id = id, delta, "Vote increment refused, tally out of range");
            Ok(VoteUpdate::OutOfRange)
        }
    }
}
