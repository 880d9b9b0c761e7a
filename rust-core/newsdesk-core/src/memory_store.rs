//! # In-Memory Store
//!
//! A [`NewsStore`] kept in process memory. Used as a test fake and for
//! running the server without a database.

use crate::error::Result;
use crate::models::{Article, Topic, MAX_VOTES, MIN_VOTES};
use crate::seed::Fixtures;
use crate::store::{NewsStore, VoteUpdate};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    topics: Vec<Topic>,
    articles: BTreeMap<i64, Article>,
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryNewsStore {
    tables: RwLock<Tables>,
}

impl InMemoryNewsStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `fixtures`, with article ids assigned from 1
    #[must_use]
    pub fn from_fixtures(fixtures: &Fixtures) -> Self {
        let mut topics = fixtures.topics.clone();
        topics.sort_by(|a, b| a.slug.cmp(&b.slug));

        let articles = fixtures
            .stored_articles()
            .into_iter()
            .map(|a| (a.article_id, a))
            .collect();

        Self {
            tables: RwLock::new(Tables { topics, articles }),
        }
    }
}

#[async_trait]
impl NewsStore for InMemoryNewsStore {
    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.topics.clone())
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.articles.get(&id).cloned())
    }

    async fn increment_article_votes(&self, id: i64, delta: i64) -> Result<VoteUpdate> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let Some(article) = tables.articles.get_mut(&id) else {
            return Ok(VoteUpdate::NotFound);
        };
        match article.votes.checked_add(delta) {
            Some(votes) if (MIN_VOTES..=MAX_VOTES).contains(&votes) => {
                article.votes = votes;
                Ok(VoteUpdate::Applied(article.clone()))
            }
            _ => Ok(VoteUpdate::OutOfRange),
        }
    }
}
