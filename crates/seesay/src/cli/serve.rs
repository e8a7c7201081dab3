//! The `seesay serve` command.

use std::sync::Arc;

use clap::Args;
use seesay_core::{Config, Narrator};

use crate::web::{self, AppState};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.ensure_dirs()?;

    let narrator = Narrator::from_config(&config, None)?;
    if !narrator.describer().is_available().await {
        tracing::warn!(
            "Vision provider '{}' is not reachable yet; requests will fail until it is",
            narrator.describer().provider_name()
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(narrator), &config)?;
    let app = web::router(state, &config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    eprintln!("Web interface available at: http://localhost:{}", config.server.port);
    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
    }
}
