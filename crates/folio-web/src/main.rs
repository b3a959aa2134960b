mod api;
mod auth;
mod config;
mod dto;
mod error;
mod limiter;
mod middleware;
mod services;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use folio_core::{ContentStore, MemoryStore};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::services::mailer::Mailer;
use crate::services::media::MediaHost;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_web=debug,folio_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();
    let tls_enabled = config.tls_enabled();
    let sweep_every = Duration::from_secs(config.rate_limit.sweep_interval_secs);
    let body_limit = config.max_upload_bytes() + 64 * 1024;

    let store: Arc<dyn ContentStore> = match &config.storage.data_file {
        Some(path) => Arc::new(MemoryStore::open(path).await?),
        None => {
            tracing::warn!("No data file configured; content will be lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let mailer: Arc<dyn Mailer> = Arc::from(services::mailer::from_config(&config.mail));
    let media: Arc<dyn MediaHost> = Arc::from(services::media::from_config(&config.media));
    let cors = cors_layer(&config.cors.allowed_origins);

    let state = AppState::new(config, store, mailer, media);

    let shutdown = CancellationToken::new();
    let sweeper = state
        .limiter
        .clone()
        .spawn_sweeper(sweep_every, shutdown.clone());

    let base_router = api::router(&state);

    let app = if tls_enabled {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers_with_hsts))
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    } else {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers))
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    };

    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;

        let handle = axum_server::Handle::new();
        let on_shutdown = handle.clone();
        let token = shutdown.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            on_shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        tracing::info!("folio-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("folio-web listening on http://{}", bind_addr);
        let token = shutdown.clone();
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;
    }

    shutdown.cancel();
    sweeper.await?;
    tracing::info!("folio-web stopped");
    Ok(())
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {e}"),
    }
    shutdown.cancel();
}

/// Same-origin only unless origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            header::HeaderName::from_static("x-ratelimit-limit"),
            header::HeaderName::from_static("x-ratelimit-remaining"),
            header::HeaderName::from_static("x-ratelimit-reset"),
        ])
}
