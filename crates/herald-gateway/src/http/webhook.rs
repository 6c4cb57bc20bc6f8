//! Telegram webhook ingress — POST /webhooks/telegram.
//!
//! Telegram echoes the secret configured at `setWebhook` time back in the
//! `X-Telegram-Bot-Api-Secret-Token` header; when `[telegram].webhook_secret`
//! is set, requests without the matching value are rejected before the body
//! is even parsed.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppState;

/// POST /webhooks/telegram
///
/// Verifies the secret token, decodes the update, runs the command handler
/// and replies into the originating chat. Always answers 200 to Telegram
/// once the request is authenticated and decodable, whatever the command
/// outcome — retries are for transport problems, not for bad commands.
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(ref secret) = state.config.telegram.webhook_secret {
        let provided = headers
            .get("x-telegram-bot-api-secret-token")
            .and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_str()) {
            warn!("webhook rejected: secret token mismatch");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "authentication failed"})),
            ));
        }
    }

    let update: teloxide::types::Update = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "undecodable webhook body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid JSON body"})),
        )
    })?;

    debug!(update_id = update.id.0, "webhook update arrived");

    if let Some((chat_id, reply)) = state.handler.handle_update(&update, Utc::now()) {
        herald_telegram::send::send_text(&state.bot, chat_id, &reply).await;
    }

    Ok(Json(json!({"ok": true})))
}
