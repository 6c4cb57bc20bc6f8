//! Sweep trigger endpoint — GET/POST /sweep.
//!
//! The periodic caller (external cron, uptime pinger, or the in-process
//! dev timer's HTTP sibling) hits this route; each request runs exactly
//! one sweep. Partial failure is still a completed sweep and answers 200;
//! only a failed candidate fetch produces a server error.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;

/// GET/POST /sweep
///
/// Optionally gated by a shared secret in `X-API-Key`. Responds with the
/// sweep summary: `{"success", "remindersSent", "totalProcessed", "errors"}`.
pub async fn sweep_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if !key_matches(state.config.sweep.api_key.as_deref(), provided) {
        warn!("sweep trigger rejected: bad or missing X-API-Key");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "error": "invalid API key"})),
        );
    }

    match state.runner.run(Utc::now()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "remindersSent": report.reminders_sent,
                "totalProcessed": report.total_processed,
                "errors": report.failures,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": e.to_string()})),
        ),
    }
}

/// `true` when the endpoint is open (no key configured) or the provided
/// key matches.
fn key_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(key) => provided == Some(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_endpoint_accepts_anything() {
        assert!(key_matches(None, None));
        assert!(key_matches(None, Some("whatever")));
    }

    #[test]
    fn gated_endpoint_requires_exact_key() {
        assert!(key_matches(Some("s3cret"), Some("s3cret")));
        assert!(!key_matches(Some("s3cret"), Some("wrong")));
        assert!(!key_matches(Some("s3cret"), None));
    }
}
