//! REST API endpoint handlers for the Observer server.
//!
//! Reads go to the store on every request. The two write endpoints go
//! through [`conquest_core::ingress`], so they can only create players and
//! append to queues.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/grid` | Current grid |
//! | `GET` | `/api/players/{id}` | Single player record |
//! | `POST` | `/api/players` | Join (create-if-absent) |
//! | `POST` | `/api/players/{id}/actions` | Enqueue one action |
//! | `GET` | `/api/factions/{name}` | Single faction record |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conquest_core::{join_player, parse_action, submit_action};
use conquest_db::StateStore;
use conquest_types::{FactionName, PlayerId};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/players`.
#[derive(Debug, serde::Deserialize)]
pub struct JoinRequest {
    /// Identifier chosen by the identity layer.
    pub id: String,
    /// Faction to join.
    pub faction: FactionName,
}

/// Response body for `POST /api/players/{id}/actions`.
#[derive(Debug, serde::Serialize)]
struct QueuedResponse {
    ok: bool,
    /// Queue length after the append.
    queued: u64,
}

// ---------------------------------------------------------------------------
// GET /api/grid
// ---------------------------------------------------------------------------

/// Return the stored grid as rows of cells.
pub async fn get_grid<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    let grid = state
        .store
        .get_grid()
        .await?
        .ok_or_else(|| ObserverError::NotFound(String::from("grid")))?;
    Ok(Json(grid))
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Return one player record.
pub async fn get_player<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = PlayerId::new(id);
    let player = state
        .store
        .get_player(&id)
        .await?
        .ok_or_else(|| ObserverError::NotFound(format!("player {id}")))?;
    Ok(Json(player))
}

/// Join a faction.
///
/// Responds `201 Created` with the new record, or `200 OK` with the
/// existing one if the id was already taken. An existing player keeps its
/// faction and AP.
pub async fn join<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
    body: String,
) -> Result<impl IntoResponse, ObserverError> {
    let request: JoinRequest =
        serde_json::from_str(&body).map_err(|e| ObserverError::BadRequest(e.to_string()))?;
    let outcome = join_player(
        &state.store,
        PlayerId::new(request.id),
        request.faction,
        state.starting_ap,
    )
    .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.player)))
}

/// Enqueue one action for the player in the path.
///
/// The body is an action object such as
/// `{"type":"attack","payload":{"x":1,"y":2}}`. Responds `202 Accepted`:
/// legality is decided at the next tick.
pub async fn enqueue_action<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: String,
) -> Result<impl IntoResponse, ObserverError> {
    let params = parse_action(&body)?;
    let (_, queued) = submit_action(&state.store, &PlayerId::new(id), params).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse { ok: true, queued }),
    ))
}

// ---------------------------------------------------------------------------
// GET /api/factions/{name}
// ---------------------------------------------------------------------------

/// Return one faction record.
pub async fn get_faction<S: StateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let name: FactionName = name
        .parse()
        .map_err(|e: conquest_types::UnknownFaction| ObserverError::NotFound(e.to_string()))?;
    let faction = state
        .store
        .get_faction(name)
        .await?
        .ok_or_else(|| ObserverError::NotFound(format!("faction {name}")))?;
    Ok(Json(faction))
}
