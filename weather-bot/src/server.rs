use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use weather_core::{Acknowledgment, Dispatcher, Update};

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", post(webhook))
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(dispatcher)
}

pub async fn serve(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, enabled = dispatcher.is_enabled(), "Webhook listening");

    axum::serve(listener, router(dispatcher)).await.context("Webhook server failed")
}

/// Always answers with the fixed acknowledgment so Telegram never redelivers.
async fn webhook(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> (StatusCode, &'static str) {
    let ack = if !dispatcher.is_enabled() {
        Acknowledgment::OK
    } else {
        match serde_json::from_slice::<Update>(&body) {
            Ok(update) => dispatcher.handle(update).await,
            Err(err) => {
                warn!(error = %err, "Discarding undecodable update");
                Acknowledgment::OK
            }
        }
    };

    let status = StatusCode::from_u16(ack.status_code).unwrap_or(StatusCode::OK);
    (status, ack.body)
}

async fn health() -> &'static str {
    "ok"
}
