//! Operator REST API handlers for runtime simulation control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the tick loop |
//! | `POST` | `/api/operator/resume` | Resume the tick loop |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current simulation status |
//! | `POST` | `/api/operator/stop` | Trigger clean shutdown |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use conquest_core::OperatorState;
use conquest_core::operator::MIN_TICK_INTERVAL_MS;
use conquest_db::StateStore;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds.
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn operator<S>(state: &AppState<S>) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or_else(|| ObserverError::Internal("operator state not available".to_owned()))
}

// ---------------------------------------------------------------------------
// POST /api/operator/pause
// ---------------------------------------------------------------------------

/// Pause the simulation tick loop.
///
/// A tick already running finishes first.
pub async fn pause<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.pause();
    info!("Operator paused simulation");

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation paused".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/resume
// ---------------------------------------------------------------------------

/// Resume the simulation tick loop after a pause.
pub async fn resume<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.resume();
    info!("Operator resumed simulation");

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation resumed".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
///
/// The new interval applies from the next sleep.
pub async fn set_speed<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;

    operator.set_tick_interval_ms(body.tick_interval_ms).map_or_else(
        || {
            Err(ObserverError::BadRequest(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            )))
        },
        |prev| {
            info!(
                previous_ms = prev,
                new_ms = body.tick_interval_ms,
                "Operator changed tick interval"
            );
            Ok(Json(serde_json::json!({
                "ok": true,
                "message": format!("Tick interval changed from {}ms to {}ms", prev, body.tick_interval_ms),
                "previous_interval_ms": prev,
                "new_interval_ms": body.tick_interval_ms,
            })))
        },
    )
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return the current tick, pause state, and interval.
pub async fn status<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    let status = operator(&state)?.status();
    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop
// ---------------------------------------------------------------------------

/// Trigger a clean simulation stop.
///
/// The tick loop finishes its current tick and exits. The HTTP server keeps
/// serving until the process ends.
pub async fn stop<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();
    info!("Operator requested stop");

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- simulation will end after current tick".to_owned(),
    }))
}
