use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use chrono::Utc;
use codexbot_core::types::{JobPayload, WebhookPayload};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{webhook, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hooks/automa", post(automa_hook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Webhook entry point. Verifies the signature over the raw body, then
/// enqueues exactly one job and returns immediately; the task itself runs
/// in the background consumer, so its outcome is never reflected here.
async fn automa_hook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let id = header(&headers, "webhook-id");
    let signature = header(&headers, "webhook-signature");

    if !webhook::verify(&state.config.webhook_secret, signature, &body) {
        warn!(
            webhook_id = %id,
            webhook_signature = %signature,
            "invalid signature"
        );
        return StatusCode::UNAUTHORIZED;
    }

    info!(
        webhook_id = %id,
        webhook_signature = %signature,
        "webhook verified"
    );

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(webhook_id = %id, "malformed webhook payload: {e}");
            return StatusCode::BAD_REQUEST;
        }
    };

    let base_url = header(&headers, "x-automa-server-host").to_string();
    let key = format!(
        "{}-{}",
        payload.data.task.id,
        Utc::now().timestamp_millis()
    );

    if let Err(e) = state.queue.publish(
        key,
        JobPayload {
            base_url,
            data: payload.data,
        },
    ) {
        state.telemetry.capture(&e, "POST /hooks/automa");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    StatusCode::OK
}
