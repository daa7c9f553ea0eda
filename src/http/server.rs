//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and stop on the shutdown signal
//!
//! # Routes
//! ```text
//! POST /api/voice-demo   one bridge call
//! GET  /api/voice-demo   voice service health diagnostics
//! GET  /healthz          liveness of this process
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::bridge::{Bridge, BridgeError, BridgeReply, Connector, InputError, WsConnector};
use crate::config::ServiceConfig;
use crate::health::{HealthDiagnostics, HealthProbe};
use crate::http::request::{request_id, UuidRequestId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
    pub probe: Arc<HealthProbe>,
}

impl AppState {
    /// Build the bridge and the probe over a shared connector.
    pub fn from_config(
        config: &ServiceConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, url::ParseError> {
        let bridge = Bridge::from_config(config, connector.clone())?;
        let probe = HealthProbe::from_config(config, reqwest::Client::new(), connector)?;

        Ok(Self {
            bridge: Arc::new(bridge),
            probe: Arc::new(probe),
        })
    }
}

/// HTTP server for the voice bridge.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server talking to the voice service over WebSockets.
    pub fn new(config: ServiceConfig) -> Result<Self, url::ParseError> {
        let state = AppState::from_config(&config, Arc::new(WsConnector))?;
        Ok(Self::with_state(config, state))
    }

    pub fn with_state(config: ServiceConfig, state: AppState) -> Self {
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .route("/api/voice-demo", get(voice_service_health).post(ask_persona))
        .route("/healthz", get(liveness))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
}

/// Inbound bridge call body. Fields are optional so missing ones surface as
/// validation errors rather than extractor rejections.
#[derive(Debug, Deserialize)]
struct AskPayload {
    persona: Option<String>,
    message: Option<String>,
}

async fn ask_persona(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AskPayload>, JsonRejection>,
) -> Result<Json<BridgeReply>, BridgeError> {
    let request_id = request_id(&headers);

    let Json(payload) = payload.map_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected request body");
        InputError::MalformedBody(e.body_text())
    })?;
    let persona = payload.persona.ok_or(InputError::MissingField("persona"))?;
    let message = payload.message.ok_or(InputError::MissingField("message"))?;

    tracing::debug!(request_id = %request_id, persona = %persona, "Voice demo request");

    state.bridge.ask(&persona, &message).await.map(Json)
}

async fn voice_service_health(State(state): State<AppState>) -> (StatusCode, Json<HealthDiagnostics>) {
    let diagnostics = state.probe.check().await;
    let status = if diagnostics.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(diagnostics))
}

async fn liveness() -> &'static str {
    "ok"
}
