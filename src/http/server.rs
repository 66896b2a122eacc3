//! HTTP server setup for the gateway relay.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay and health handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener with graceful shutdown
//! - Forward `/stream/{id}` to the backend and relay the response

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, RelayConfig};
use crate::http::request::{self, Forwarding, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::relay::{self, RelayError, UpstreamClient};

/// Application state injected into relay handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

/// HTTP server for the gateway relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new relay server. Fails if the backend address is unusable.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let upstream = UpstreamClient::from_config(&config.upstream)?;
        let router = Self::build_router(AppState { upstream });
        Ok(Self { router, config })
    }

    fn build_router(state: AppState) -> Router {
        let router = Router::new()
            .route("/stream/{resource_id}", get(stream_handler))
            .route("/health", get(|| health("media-relay")))
            .with_state(state);
        with_middleware(router)
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        serve(listener, self.router, shutdown).await
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Relay one resource from the backend to the caller.
async fn stream_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(resource_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let forwarding = Forwarding::capture(peer, &uri, &headers);
    let request_id = request::request_id(&headers).unwrap_or("unknown");

    tracing::info!(
        request_id = %request_id,
        resource_id = %resource_id,
        client_ip = %forwarding.client_ip,
        "Relaying resource"
    );

    match state.upstream.fetch(&resource_id, &forwarding).await {
        Ok(upstream) => {
            metrics::record_request("streaming", upstream.status().as_u16(), start_time);
            relay::forward(&resource_id, upstream).into_response()
        }
        Err(err) => {
            match &err {
                RelayError::UpstreamRejected { status, .. } => tracing::warn!(
                    request_id = %request_id,
                    resource_id = %resource_id,
                    status = %status,
                    "Backend rejected request"
                ),
                RelayError::UpstreamUnreachable { cause } => tracing::error!(
                    request_id = %request_id,
                    resource_id = %resource_id,
                    error = %cause,
                    "Relay failed to reach backend"
                ),
            }
            metrics::record_request(err.outcome(), err.status().as_u16(), start_time);
            err.into_response()
        }
    }
}

/// Liveness probe shared by both components.
pub async fn health(service: &'static str) -> Json<Value> {
    Json(json!({ "status": "ok", "service": service }))
}

/// Request ID and tracing layers common to both components.
pub fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone())),
    )
}

/// Serve a router on a listener with connect info and graceful shutdown.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    let app = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
