//! Blood pressure monitor HTTP server.
//!
//! Loads the configuration, builds the application state with the SVG chart
//! renderer and the HTML document renderer, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin bp-monitor-server
//!
//! # Explicit config file and port
//! BP_MONITOR_CONFIG=./report.toml PORT=9000 cargo run --bin bp-monitor-server
//! ```
//!
//! # Environment Variables
//!
//! - `BP_MONITOR_CONFIG`: config file (default: search for `report.toml`)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RENDER_TIMEOUT_SECS`: rendering timeout (default: 30)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bp_monitor::config::ReportConfig;
use bp_monitor::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting blood pressure monitor server");

    let config = ReportConfig::load()?;
    info!(
        length_policy = ?config.report.length_policy,
        gap_policy = ?config.charts.gap_policy,
        render_timeout_secs = config.report.render_timeout_secs,
        "Configuration loaded"
    );

    let addr: SocketAddr = config.bind_address().parse()?;
    let app = create_router(AppState::with_defaults(config));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
