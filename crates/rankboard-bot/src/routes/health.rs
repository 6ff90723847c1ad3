//! Keep-alive and health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub bot_user: Option<String>,
}

/// State shared between the gateway handler and the HTTP server
#[derive(Clone)]
pub struct HealthState {
    started: Instant,
    bot_user: Arc<RwLock<Option<String>>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            bot_user: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_bot_user(&self, name: impl Into<String>) {
        *self.bot_user.write().await = Some(name.into());
    }

    pub async fn snapshot(&self) -> HealthCheck {
        HealthCheck {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            bot_user: self.bot_user.read().await.clone(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

async fn root() -> &'static str {
    "bot is running"
}

async fn health_check(State(state): State<HealthState>) -> Json<HealthCheck> {
    Json(state.snapshot().await)
}

/// Create the keep-alive router
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router until the process exits
pub async fn serve(state: HealthState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌍 HTTP server listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
