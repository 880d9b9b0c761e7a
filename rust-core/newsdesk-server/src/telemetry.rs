//! Logging setup.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "newsdesk=info,newsdesk_core=info";

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default directives. Calling this twice is a
/// no-op.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
