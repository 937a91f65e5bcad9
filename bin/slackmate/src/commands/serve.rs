use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use slackmate_agent::EventHandler;
use slackmate_channels::{EventEnvelope, RequestVerifier, SlackEvent};
use slackmate_providers::{create_main_provider, Provider};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::load_config;

/// Receives verified `event_callback` events. Runs after the HTTP response is sent.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: SlackEvent);
}

#[async_trait]
impl EventSink for EventHandler {
    async fn deliver(&self, event: SlackEvent) {
        self.dispatch(&event).await;
    }
}

#[derive(Clone)]
struct GatewayState {
    verifier: Arc<RequestVerifier>,
    sink: Arc<dyn EventSink>,
}

fn invalid_request() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid request").into_response()
}

/// POST /api/events
async fn handle_events(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.verifier.check(&headers, &body) {
        warn!(error = %e, "Rejected unauthenticated request");
        return invalid_request();
    }

    let envelope = match EventEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Rejected malformed event body");
            return invalid_request();
        }
    };

    if envelope.is_url_verification() {
        info!("Answering url_verification challenge");
        return (StatusCode::OK, envelope.challenge.unwrap_or_default()).into_response();
    }

    if !envelope.is_event_callback() {
        debug!(envelope_type = %envelope.envelope_type, "Ignoring non-callback envelope");
        return invalid_request();
    }

    if let Some(event) = envelope.event {
        debug!(event_id = ?envelope.event_id, event_type = %event.event_type, "Accepted event");
        let sink = state.sink.clone();
        tokio::spawn(async move {
            sink.deliver(event).await;
        });
    }

    (StatusCode::OK, "Success!").into_response()
}

/// GET /health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/events", post(handle_events))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(cli_host: Option<String>, cli_port: Option<u16>) -> anyhow::Result<()> {
    let (_paths, config) = load_config()?;

    let missing = config.missing_gateway_settings();
    if !missing.is_empty() {
        return Err(anyhow::anyhow!(
            "Missing required settings: {}. Run `slackmate config init` or set them via environment.",
            missing.join(", ")
        ));
    }

    let provider: Arc<dyn Provider> = Arc::from(create_main_provider(&config)?);
    let handler = EventHandler::from_config(&config, provider);
    let verifier = RequestVerifier::new(&config.slack.signing_secret)
        .with_tolerance(config.slack.timestamp_tolerance_secs);

    let state = GatewayState {
        verifier: Arc::new(verifier),
        sink: Arc::new(handler),
    };

    let host = cli_host.unwrap_or_else(|| config.gateway.host.clone());
    let port = cli_port.unwrap_or(config.gateway.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!(addr = %bind_addr, model = %config.agent.model, "Gateway listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
