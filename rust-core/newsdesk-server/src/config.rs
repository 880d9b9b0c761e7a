//! Command line and environment configuration.

use clap::Parser;
use newsdesk_core::ServerConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// newsdesk API server
#[derive(Debug, Clone, Parser)]
#[command(name = "newsdesk", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "NEWSDESK_ADDR", default_value = "127.0.0.1:9090")]
    pub addr: SocketAddr,

    /// Database URL; `postgres://` selects PostgreSQL, anything else SQLite
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:newsdesk.db?mode=rwc")]
    pub database_url: String,

    /// Maximum database pool size
    #[arg(long, env = "NEWSDESK_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Drop, recreate and load fixture data before serving
    #[arg(long, env = "NEWSDESK_SEED")]
    pub seed: bool,

    /// Serve fixture data from memory instead of a database
    #[arg(long, env = "NEWSDESK_IN_MEMORY", conflicts_with = "seed")]
    pub in_memory: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "NEWSDESK_LOG_JSON")]
    pub log_json: bool,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "NEWSDESK_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Seconds to wait for open connections on shutdown
    #[arg(long, env = "NEWSDESK_SHUTDOWN_TIMEOUT_SECS", default_value_t = 30)]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// HTTP server settings
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            address: self.addr,
            max_body_size: self.max_body_bytes,
            shutdown_timeout: Duration::from_secs(self.shutdown_timeout_secs),
            ..ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["newsdesk"]).unwrap();
        let server = config.server_config();
        assert_eq!(server.address.port(), 9090);
        assert_eq!(server.max_body_size, 1024 * 1024);
        assert_eq!(config.max_connections, 10);
        assert!(!config.in_memory);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "newsdesk",
            "--addr",
            "0.0.0.0:8080",
            "--database-url",
            "postgres://localhost/nc_news",
            "--seed",
            "--shutdown-timeout-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert!(config.seed);
        assert_eq!(
            config.server_config().shutdown_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_seed_conflicts_with_in_memory() {
        assert!(Config::try_parse_from(["newsdesk", "--seed", "--in-memory"]).is_err());
    }
}
