//! newsdesk API server binary.

mod config;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use config::Config;
use newsdesk_core::{
    build_server, seed, DatabasePool, Fixtures, InMemoryNewsStore, NewsService, NewsStore,
    SqlNewsStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(config.log_json);

    info!(version = newsdesk_core::VERSION, "Starting newsdesk");

    let (store, pool): (Arc<dyn NewsStore>, Option<DatabasePool>) = if config.in_memory {
        info!("Serving fixture data from memory");
        let store: Arc<dyn NewsStore> =
            Arc::new(InMemoryNewsStore::from_fixtures(&Fixtures::standard()));
        (store, None)
    } else {
        let pool = DatabasePool::connect(&config.database_url, Some(config.max_connections))
            .await
            .context("connecting to database")?;
        info!(backend = pool.backend(), "Database connected");

        if config.seed {
            seed(&pool, &Fixtures::standard())
                .await
                .context("seeding database")?;
        }
        let store: Arc<dyn NewsStore> = Arc::new(SqlNewsStore::new(pool.clone()));
        (store, Some(pool))
    };

    let server = build_server(NewsService::new(store), config.server_config())
        .context("registering routes")?;
    server.serve().await.context("serving")?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("Server stopped");
    Ok(())
}
