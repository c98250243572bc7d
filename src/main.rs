//! Chat Relay - Binary Entry Point
//!
//! Startup order:
//! 1. Load `.env` and parse configuration.
//! 2. Initialise tracing.
//! 3. Open the document store and wire the service.
//! 4. Serve HTTP until Ctrl-C or SIGTERM.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chat_relay::api::{create_router, AccessGate, AppState};
use chat_relay::models::CannedCompletion;
use chat_relay::publisher::EventGridPublisher;
use chat_relay::{ChatEvents, ChatService, Config, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let default_level = if config.environment.is_development() { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!(
        version = chat_relay::VERSION,
        environment = %config.environment,
        "chat-relay starting"
    );

    let store = MemoryStore::from_path(config.store_path.as_deref()).await?;
    match store.file_path() {
        Some(path) => info!(path = %path.display(), "Document store ready"),
        None => warn!("CHAT_STORE_PATH not set - documents are kept in memory only"),
    }

    let mut service = ChatService::new(Arc::new(store), ChatEvents::new())
        .with_environment(config.environment);
    match &config.event_grid {
        Some(grid) => {
            info!(endpoint = %grid.endpoint, "Publishing chat events to Event Grid");
            service = service.with_publisher(Arc::new(EventGridPublisher::new(
                grid.endpoint.clone(),
                grid.key.clone(),
            )));
        }
        None => info!("Event Grid not configured - cloud events disabled"),
    }
    if config.assistant_replies {
        info!("Assistant replies enabled");
        service = service.with_completion(Arc::new(CannedCompletion::default()));
    }

    let gate = AccessGate::from_config(&config);
    info!(enforced = gate.is_enforced(), "Access gate ready");
    let state = Arc::new(AppState::new(Arc::new(service), gate));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chat-relay stopped");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
