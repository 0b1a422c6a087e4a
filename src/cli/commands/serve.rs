use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::app::app;
use crate::auth::TokenStore;
use crate::config;
use crate::database::{DatabaseManager, PgIssueStore};
use crate::is_production;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Listen address (overrides INCHI_WS_APP_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides INCHI_WS_APP_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Token allow-list file (overrides INCHI_TOKENS_FILE)")]
    pub tokens_file: Option<PathBuf>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting InChI issue service in {:?} mode", config.environment);

    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
    let tokens_file = args
        .tokens_file
        .unwrap_or_else(|| config.auth.tokens_file.clone());

    let pool = DatabaseManager::connect_lazy(&config.database)
        .context("failed to configure database pool")?;
    let store = PgIssueStore::new(pool);

    // Keep serving when the database is down; /db_check reports it.
    if let Err(e) = store.ensure_schema().await {
        warn!("Could not ensure issues table at startup: {}", e);
    }

    let tokens = TokenStore::new(tokens_file);
    if !tokens.path().exists() {
        warn!(
            "Token file {} does not exist; every protected request will be rejected",
            tokens.path().display()
        );
    }

    let state = AppState::new(Arc::new(store.clone()), tokens);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", server.host, server.port))?;

    let result = match server.tls_files() {
        Some((cert, key)) => serve_tls(router, addr, cert, key).await,
        None => {
            if is_production!() {
                warn!("Serving plain HTTP in production; set INCHI_TLS_CERT_FILE and INCHI_TLS_KEY_FILE");
            }
            serve_plain(router, addr).await
        }
    };

    store.pool().close().await;
    info!("Database pool closed");
    result
}

async fn serve_plain(router: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn serve_tls(
    router: axum::Router,
    addr: SocketAddr,
    cert: PathBuf,
    key: PathBuf,
) -> anyhow::Result<()> {
    let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert, &key)
        .await
        .with_context(|| {
            format!("failed to load TLS certificate {} / key {}", cert.display(), key.display())
        })?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("Listening on https://{}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

