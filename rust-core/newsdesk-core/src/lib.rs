//! # newsdesk Core
//!
//! Core library for the newsdesk API: a small REST service over topics and
//! articles stored in SQLite or PostgreSQL.
//!
//! ## Architecture
//!
//! Requests flow `server` -> `router` -> `api` handler -> `service`
//! (validation and mapping) -> `store` (data access). Failures travel back as
//! [`ApiError`] and are turned into a status and plain-text body in one place.
//!
//! ## Modules
//!
//! - `server` - HTTP server built on Hyper
//! - `router` - Routing using matchit (radix trie)
//! - `route` - Route metadata
//! - `types` - Path parameter types and conversion
//! - `request` / `response` - Transport-neutral request and response
//! - `middleware` - Request/response middleware (logging, timing)
//! - `json` - JSON parsing with simd-json
//! - `api` - Endpoint wiring
//! - `service` - Validation and result mapping
//! - `validation` - Path and body checks
//! - `api_error` - Client-facing failures and their status codes
//! - `store` - Data access trait
//! - `sql_store` / `memory_store` - Store implementations
//! - `database` - SQLx connection pools (SQLite, PostgreSQL)
//! - `seed` - Schema creation and fixture data
//! - `models` - Topic and article rows
//! - `error` - Infrastructure error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod api;
pub mod api_error;
pub mod database;
pub mod error;
pub mod json;
pub mod memory_store;
pub mod middleware;
pub mod models;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod seed;
pub mod server;
pub mod service;
pub mod sql_store;
pub mod store;
pub mod types;
pub mod validation;

pub use api::build_server;
pub use api_error::{ApiError, ApiResult, Entity};
pub use database::DatabasePool;
pub use error::{Error, Result};
pub use memory_store::InMemoryNewsStore;
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, TimingMiddleware};
pub use models::{Article, Topic};
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use router::{Method, Router};
pub use seed::{seed, Fixtures};
pub use server::{Server, ServerConfig};
pub use service::NewsService;
pub use sql_store::SqlNewsStore;
pub use store::{NewsStore, VoteUpdate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
