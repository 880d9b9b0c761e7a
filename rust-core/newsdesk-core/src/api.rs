//! # API Routes
//!
//! Binds each endpoint to a [`NewsService`] operation and serializes the
//! outcome.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/api/topics` | `{ "results": [Topic] }` |
//! | GET | `/api/articles/{article_id}` | `{ "articleObj": Article }` |
//! | PATCH | `/api/articles/{article_id}` | `{ "articleObj": Article }` |
//!
//! Everything else gets the fallback: 404 `Path not found`.

use crate::api_error::{ApiError, ApiResult};
use crate::error::Result;
use crate::middleware::{LoggingMiddleware, TimingMiddleware};
use crate::models::{Article, ArticleEnvelope, TopicList};
use crate::response::ApiResponse;
use crate::router::Method;
use crate::server::{handler, Handler, Server, ServerConfig};
use crate::service::NewsService;

/// Path parameter naming the article
pub const ARTICLE_ID_PARAM: &str = "article_id";

const TOPICS_PATH: &str = "/api/topics";
const ARTICLE_PATH: &str = "/api/articles/{article_id:int}";

fn article_response(outcome: ApiResult<Article>) -> ApiResponse {
    outcome
        .and_then(|article| Ok(ApiResponse::json_value(&ArticleEnvelope { article: &article })?))
        .unwrap_or_else(ApiError::into_response)
}

fn list_topics(service: NewsService) -> Handler {
    handler(move |_req, _m| {
        let service = service.clone();
        Box::pin(async move {
            service
                .list_topics()
                .await
                .and_then(|topics| Ok(ApiResponse::json_value(&TopicList { results: &topics })?))
                .unwrap_or_else(ApiError::into_response)
        })
    })
}

fn get_article(service: NewsService) -> Handler {
    handler(move |_req, m| {
        let service = service.clone();
        let id = m.get_typed(ARTICLE_ID_PARAM).cloned();
        Box::pin(async move { article_response(service.article_by_id(id.as_ref()).await) })
    })
}

fn patch_article_votes(service: NewsService) -> Handler {
    handler(move |req, m| {
        let service = service.clone();
        let id = m.get_typed(ARTICLE_ID_PARAM).cloned();
        let body = req.body_bytes().map(<[u8]>::to_vec);
        Box::pin(async move {
            article_response(
                service
                    .increment_article_votes(id.as_ref(), body.as_deref())
                    .await,
            )
        })
    })
}

/// Build a server with every route and the standard middleware
///
/// # Errors
///
/// Returns `Error::InvalidRoutePattern` if a route fails to register.
pub fn build_server(service: NewsService, config: ServerConfig) -> Result<Server> {
    let mut server = Server::new(config);
    server.add_middleware(LoggingMiddleware::new());
    server.add_middleware(TimingMiddleware::new());

    server.add_route(Method::Get, TOPICS_PATH, list_topics(service.clone()))?;
    server.add_route(Method::Get, ARTICLE_PATH, get_article(service.clone()))?;
    server.add_route(Method::Patch, ARTICLE_PATH, patch_article_votes(service))?;

    Ok(server)
}
