//! Tracing setup for the server.
//!
//! Console status lines (startup, fatal errors) go through the `info!` /
//! `success!` / `warning!` / `error!` macros; everything that happens while
//! serving requests is emitted as `tracing` events.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{AppError, Res};

pub const DEFAULT_FILTER: &str = "playlist_bridge=info,tower_http=info,warn";

/// Installs the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_logging() -> Res<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| AppError::Config(format!("logging already initialised: {e}")))
}
