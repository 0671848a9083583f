//! `marketdesk-web` binary.
//!
//! Config comes from the file named by `$MARKETDESK_CONFIG` (defaults when
//! unset) with `MARKETDESK_BIND_ADDR` / `MARKETDESK_DATA_DIR` overrides.
//! Log verbosity follows `RUST_LOG`, default `info`.

use anyhow::Result;
use marketdesk_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load(None)?;
    tracing::info!(
        bind = %config.server.bind_addr,
        data_dir = %config.server.data_dir.display(),
        "configuration loaded"
    );

    marketdesk_web::run_server(config).await
}
