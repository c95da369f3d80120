//! Turnkit Gateway: serves the demo skill over HTTP at 127.0.0.1:8000
//! POST /invoke takes a platform request envelope and returns the response envelope.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnkit_core::{InvocationContext, RequestDispatcher, RequestEvent, ResponseEnvelope, SkillConfig};

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<RequestDispatcher>,
    config: Arc<SkillConfig>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = SkillConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.verbosity.filter_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dispatcher = match turnkit_skill::build_skill(&config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("[SYSTEM] Failed to build skill: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr =
        std::env::var("TURNKIT_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        config: Arc::new(config),
    };

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("[SYSTEM] Cannot bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("[SYSTEM] Turnkit gateway listening on http://{}", bind_addr);
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("[SYSTEM] Server error: {}", e);
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_traffic))
}

async fn log_traffic(request: Request<Body>, next: Next) -> Response {
    tracing::info!("[GATEWAY] {} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

/// One platform turn. Malformed envelopes are rejected before dispatch; everything
/// after that is answered by the skill, failures included.
async fn invoke(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let event = match RequestEvent::from_value(body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("[GATEWAY] Rejected envelope: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    let defaults = InvocationContext::new(
        uuid::Uuid::new_v4().to_string(),
        state.config.function_name.clone(),
        state.config.log_stream_name.clone(),
    );
    let invocation = InvocationContext::from_event(&event, &defaults);
    let response = state.dispatcher.dispatch(event, invocation).await;
    Json(ResponseEnvelope::from(response)).into_response()
}
