//! Altimeter Service - HTTP API for elevation queries.
//!
//! ## Usage
//!
//! ```text
//! altimeter-service [CONFIG]
//! ```
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ALTIMETER_CONFIG` | Path of the INI configuration | `conf/altimeter.cfg` |
//! | `ALTIMETER__<SECTION>__<KEY>` | Override one configuration value | None |
//! | `RUST_LOG` | Log filter (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET|POST /altitude?lat=X&lng=Y` - Elevation at coordinates
//! - `OPTIONS /altitude` - CORS preflight, empty body

use std::path::PathBuf;

use altimeter::{ConfigResolver, PluginRegistry, ResolvedConfig};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "altimeter-service", version, about = "Serve elevations over HTTP")]
struct Cli {
    /// Path of the INI configuration file
    #[arg(env = "ALTIMETER_CONFIG", default_value = "conf/altimeter.cfg")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "altimeter=info,altimeter_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration is resolved once, before any worker exists
    let registry = PluginRegistry::builtin();
    let config = ConfigResolver::new(&registry)
        .resolve_path(&cli.config)
        .with_context(|| format!("Invalid configuration in {}", cli.config.display()))?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(pool_size) = config.server.pool_size {
        runtime.worker_threads(pool_size);
    }
    let runtime = runtime.build().context("Failed to start the async runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: ResolvedConfig) -> anyhow::Result<()> {
    let addr = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        handler = %config.server.handler,
        pool_size = ?config.server.pool_size,
        cors = ?config.server.cors,
        "Starting altimeter service"
    );

    let app = altimeter_service::app(&config);
    axum::serve(listener, app).await?;

    Ok(())
}
