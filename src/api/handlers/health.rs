//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The reaper missed more than three cycles
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "12 entries, default ttl 3600s" },
///     "reaper": { "status": "ok", "message": "41 cycles, 7 entries reaped" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state);
    let reaper_check = check_reaper(&state);

    let all_healthy = store_check.status == "ok" && reaper_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            reaper: reaper_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Reports entry count and default TTL.
fn check_store(state: &AppState) -> CheckStatus {
    let store = state.store();
    CheckStatus {
        status: "ok".to_string(),
        message: Some(format!(
            "{} entries, default ttl {}s",
            store.len(),
            store.default_ttl().num_seconds()
        )),
    }
}

/// Checks that the reaper completed a cycle recently.
fn check_reaper(state: &AppState) -> CheckStatus {
    let stats = &state.reaper_stats;
    let message = Some(format!(
        "{} cycles, {} entries reaped",
        stats.cycles(),
        stats.reaped()
    ));

    if stats.is_stalled_at(Utc::now()) {
        CheckStatus {
            status: "error".to_string(),
            message,
        }
    } else {
        CheckStatus {
            status: "ok".to_string(),
            message,
        }
    }
}
