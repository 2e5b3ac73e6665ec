// P&L Report - Web Server
// Upload page + report API with Axum

use anyhow::{Context, Result};
use pnl_report::server::{create_router, AppState};
use pnl_report::upstream::UpstreamClient;
use pnl_report::ServerConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pnl_report=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    println!("🌐 P&L Report - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = ServerConfig::from_env();
    info!(upstream = %config.upstream_url, max_upload_mb = config.max_upload_mb, "configuration loaded");

    let state = AppState::new(UpstreamClient::new(config.upstream_url.clone()));
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   Upstream: {}", config.upstream_url);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
