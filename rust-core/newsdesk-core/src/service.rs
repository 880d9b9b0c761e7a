//! # News Service
//!
//! Validation and mapping between route handlers and the store. Inputs are
//! validated before the store is called; store results are translated into
//! [`ApiError`] outcomes, so a missing row never reaches the client as a
//! bare `null`.

use crate::api_error::{ApiError, ApiResult, Entity};
use crate::models::{Article, Topic};
use crate::store::{NewsStore, VoteUpdate};
use crate::types::ParamValue;
use crate::validation::{ArticleId, VoteIncrement};
use std::sync::Arc;
use tracing::debug;

/// Operations exposed over HTTP
#[derive(Clone)]
pub struct NewsService {
    store: Arc<dyn NewsStore>,
}

impl std::fmt::Debug for NewsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsService").finish_non_exhaustive()
    }
}

impl NewsService {
    /// Create a service over an injected store
    #[must_use]
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    /// Every topic; an empty list is a valid answer
    ///
    /// # Errors
    ///
    /// `ApiError::Internal` if the store fails.
    pub async fn list_topics(&self) -> ApiResult<Vec<Topic>> {
        Ok(self.store.list_topics().await?)
    }

    /// Look up one article by its path parameter
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a bad id, `NotFound` for an unknown one,
    /// `Internal` if the store fails.
    pub async fn article_by_id(&self, raw_id: Option<&ParamValue>) -> ApiResult<Article> {
        let id = ArticleId::from_param(raw_id)?;

        self.store
            .article_by_id(id.get())
            .await?
            .ok_or(ApiError::NotFound(Entity::Article))
    }

    /// Apply a vote delta taken from a request body
    ///
    /// The id is checked before the body. Nothing is written unless both
    /// are valid and the new tally stays in range.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a bad id, `BadRequest` for a bad body or a tally
    /// that would leave its range, `NotFound` for an unknown id, `Internal`
    /// if the store fails.
    pub async fn increment_article_votes(
        &self,
        raw_id: Option<&ParamValue>,
        body: Option<&[u8]>,
    ) -> ApiResult<Article> {
        let id = ArticleId::from_param(raw_id)?;
        let inc = VoteIncrement::from_body(body)?;

        debug!(article_id = %id, inc_votes = inc.get(), "Applying vote increment");

        match self.store.increment_article_votes(id.get(), inc.get()).await? {
            VoteUpdate::Applied(article) => Ok(article),
            VoteUpdate::NotFound => Err(ApiError::NotFound(Entity::Article)),
            VoteUpdate::OutOfRange => Err(ApiError::BadRequest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::memory_store::InMemoryNewsStore;
    use crate::seed::Fixtures;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every call and counts how often it was reached
    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl BrokenStore {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Database {
                message: "connection reset".into(),
            })
        }
    }

    #[async_trait]
    impl NewsStore for BrokenStore {
        async fn list_topics(&self) -> Result<Vec<Topic>> {
            self.fail()
        }
        async fn article_by_id(&self, _id: i64) -> Result<Option<Article>> {
            self.fail()
        }
        async fn increment_article_votes(&self, _id: i64, _delta: i64) -> Result<VoteUpdate> {
            self.fail()
        }
    }

    fn service() -> NewsService {
        NewsService::new(Arc::new(InMemoryNewsStore::from_fixtures(&Fixtures::standard())))
    }

    fn id(raw: &str) -> ParamValue {
        raw.parse::<i64>()
            .map_or_else(|_| ParamValue::String(raw.to_string()), ParamValue::Int)
    }

    #[tokio::test]
    async fn test_list_topics() {
        let topics = service().list_topics().await.unwrap();
        assert_eq!(topics.len(), 3);
        assert!(topics
            .iter()
            .all(|t| !t.slug.is_empty() && !t.description.is_empty()));
    }

    #[tokio::test]
    async fn test_article_by_id() {
        let svc = service();
        assert_eq!(svc.article_by_id(Some(&id("1"))).await.unwrap().article_id, 1);
        assert_eq!(
            svc.article_by_id(Some(&id("999"))).await,
            Err(ApiError::NotFound(Entity::Article))
        );
        assert_eq!(
            svc.article_by_id(Some(&id("invalidId"))).await,
            Err(ApiError::InvalidInput)
        );
    }

    #[tokio::test]
    async fn test_increment_keeps_other_fields() {
        let svc = service();
        let before = svc.article_by_id(Some(&id("1"))).await.unwrap();

        let after = svc
            .increment_article_votes(Some(&id("1")), Some(&br#"{"inc_votes": 10}"#[..]))
            .await
            .unwrap();

        assert_eq!(after.votes, before.votes + 10);
        assert_eq!(Article { votes: before.votes, ..after }, before);
    }

    #[tokio::test]
    async fn test_failed_body_validation_writes_nothing() {
        let svc = service();

        for body in [&b"{}"[..], &br#"{"inc_votes": "A string"}"#[..]] {
            assert_eq!(
                svc.increment_article_votes(Some(&id("1")), Some(body)).await,
                Err(ApiError::BadRequest)
            );
        }

        let article = svc.article_by_id(Some(&id("1"))).await.unwrap();
        assert_eq!(article.votes, 100);
    }

    #[tokio::test]
    async fn test_id_checked_before_body() {
        assert_eq!(
            service()
                .increment_article_votes(Some(&id("abc")), None)
                .await,
            Err(ApiError::InvalidInput)
        );
    }

    #[tokio::test]
    async fn test_increment_unknown_article() {
        assert_eq!(
            service()
                .increment_article_votes(Some(&id("999")), Some(&br#"{"inc_votes": 1}"#[..]))
                .await,
            Err(ApiError::NotFound(Entity::Article))
        );
    }

    #[tokio::test]
    async fn test_increment_past_tally_range_is_bad_request() {
        let svc = service();

        assert_eq!(
            svc.increment_article_votes(Some(&id("1")), Some(&br#"{"inc_votes": 2147483647}"#[..]))
                .await,
            Err(ApiError::BadRequest)
        );
        assert_eq!(svc.article_by_id(Some(&id("1"))).await.unwrap().votes, 100);
    }

    #[tokio::test]
    async fn test_validation_never_reaches_store() {
        let store = Arc::new(BrokenStore::default());
        let svc = NewsService::new(store.clone());

        assert_eq!(
            svc.article_by_id(Some(&id("0"))).await,
            Err(ApiError::InvalidInput)
        );
        assert_eq!(
            svc.increment_article_votes(Some(&id("1")), Some(&b"{}"[..])).await,
            Err(ApiError::BadRequest)
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let svc = NewsService::new(Arc::new(BrokenStore::default()));

        let err = svc.list_topics().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Internal("Database error: connection reset".into())
        );
        assert!(matches!(
            svc.article_by_id(Some(&id("1"))).await,
            Err(ApiError::Internal(_))
        ));
    }
}
