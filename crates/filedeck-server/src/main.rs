//! FileDeck - a browser file manager confined to one root directory.

mod auth;
mod cli;
mod config;
mod dispatch;
mod error;
mod output;
mod router;
mod ui;

use anyhow::Context;
use anyhow::Result;
use auth::AuthGate;
use clap::Parser;
use config::ServerConfig;
use dispatch::AppState;
use filedeck_core::FileDeck;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = ServerConfig::from_cli(cli::Cli::parse())?;
    let auth = AuthGate::new(config.password.as_deref(), config.session_ttl)?;
    let body_limit = config.body_limit();

    info!(
        root = %config.deck.root.as_path().display(),
        scratch = %config.deck.scratch_dir.display(),
        max_upload = config.max_upload,
        login = auth.is_enabled(),
        "starting FileDeck"
    );

    let state = Arc::new(AppState {
        deck: FileDeck::new(config.deck),
        auth,
    });
    let app = router::build_router(state, body_limit);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("cannot listen on {}", config.bind))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "filedeck_server=info,filedeck_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("received termination signal, shutting down");
}
