use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// Liveness plus a storage round-trip
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.ledger.store();
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "Storage ping failed");
            false
        }
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if connected { "healthy" } else { "degraded" },
            "version": agora_common::VERSION,
            "storage": {
                "backend": store.backend_name(),
                "connected": connected,
            },
            "timestamp": Utc::now(),
        })),
    )
}
