//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Bind server to listener, plain or TLS
//! - Apply configuration reloads between requests
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{InjectorConfig, TlsConfig};
use crate::http::handlers;
use crate::http::middleware::record_metrics;
use crate::http::request::MakeRequestUuidV4;
use crate::http::tls::load_tls_config;
use crate::observability::metrics;

/// How long in-flight TLS requests may take to finish after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<InjectorConfig>>,
}

impl AppState {
    pub fn new(config: InjectorConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }
}

/// HTTP server for the injection API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: InjectorConfig) -> Self {
        let state = AppState::new(config.clone());
        let router = Self::build_router(&config).with_state(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Timeout and body limit are fixed at startup; a reload does not change them.
    #[allow(deprecated)]
    fn build_router(config: &InjectorConfig) -> Router<AppState> {
        Router::new()
            .route("/v1/inject", post(handlers::inject))
            .route("/v1/select", post(handlers::select))
            .route("/healthz", get(handlers::healthz))
            .route_layer(middleware::from_fn(record_metrics))
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Shared state, for applying config updates from outside.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// The router, for serving or testing without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<InjectorConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_config_updates(self.state.clone(), config_updates);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        config_updates: mpsc::UnboundedReceiver<InjectorConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls = load_tls_config(tls).await?;
        tracing::info!(address = %addr, cert = %tls.cert_path, "HTTPS server starting");

        spawn_config_updates(self.state.clone(), config_updates);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server draining");
            drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Swap each received config into `state` until the sender is dropped.
pub fn spawn_config_updates(state: AppState, mut updates: mpsc::UnboundedReceiver<InjectorConfig>) {
    tokio::spawn(async move {
        while let Some(new_config) = updates.recv().await {
            let current = state.config.load_full();
            if current.listener != new_config.listener || current.timeouts != new_config.timeouts {
                tracing::warn!("Listener and timeout changes take effect after restart");
            }
            if current.observability != new_config.observability {
                tracing::warn!("Observability changes take effect after restart");
            }
            drop(current);

            tracing::info!(
                image = %new_config.sidecar.image_reference(),
                cpu_limit = %new_config.sidecar.cpu_limit,
                memory_limit = %new_config.sidecar.memory_limit,
                "Configuration reloaded"
            );
            state.config.store(Arc::new(new_config));
            metrics::record_reload();
        }
    });
}
