//! FIR API server
//!
//! Runs either the token-protected (`--mode secured`) or the open
//! (`--mode open`) variant of the service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fir_api::config::{Args, Command};
use fir_api::{app, AppConfig, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = args.command {
        println!("{}", fir_auth::password::hash_password(&password)?);
        return Ok(());
    }

    // Initialize tracing
    let level = if args.serve.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("fir_api={}", level).parse()?)
                .add_directive(format!("fir_pdf={}", level).parse()?)
                .add_directive(format!("fir_auth={}", level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_args(args.serve)?;
    info!(
        "Initializing FIR API in {:?} mode ({:?} layout)...",
        config.mode, config.layout
    );

    let state = Arc::new(AppState::new(&config).await?);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Generated PDFs: {}", config.output_dir.display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
