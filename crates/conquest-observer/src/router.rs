//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin client access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use conquest_db::StateStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /ws?player_id=<id>` -- `WebSocket` grid stream and action input
/// - `GET /api/grid` -- current grid
/// - `POST /api/players` -- join
/// - `GET /api/players/{id}` -- single player
/// - `POST /api/players/{id}/actions` -- enqueue an action
/// - `GET /api/factions/{name}` -- single faction
/// - `/api/operator/*` -- runtime control
///
/// CORS allows any origin.
pub fn build_router<S: StateStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_connect::<S>))
        // REST API
        .route("/api/grid", get(handlers::get_grid::<S>))
        .route("/api/players", post(handlers::join::<S>))
        .route("/api/players/{id}", get(handlers::get_player::<S>))
        .route(
            "/api/players/{id}/actions",
            post(handlers::enqueue_action::<S>),
        )
        .route("/api/factions/{name}", get(handlers::get_faction::<S>))
        // Operator API
        .route("/api/operator/status", get(operator::status::<S>))
        .route("/api/operator/pause", post(operator::pause::<S>))
        .route("/api/operator/resume", post(operator::resume::<S>))
        .route("/api/operator/speed", post(operator::set_speed::<S>))
        .route("/api/operator/stop", post(operator::stop::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
