//! `WebSocket` handler for live grid updates and action submission.
//!
//! Clients connect to `GET /ws?player_id=<id>` and receive a JSON-encoded
//! [`GridUpdate`](conquest_types::GridUpdate) each time a tick changes the
//! grid. Every text frame the client sends is treated as one action for
//! that player and goes through the same ingress path as
//! `POST /api/players/{id}/actions`. The reply is a small JSON frame,
//! either `{"queued": n}` or `{"error": "..."}`.
//!
//! If a client falls behind, lagged updates are skipped and the client
//! resumes from the most recent tick.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use conquest_core::{IngressError, parse_action, submit_action};
use conquest_db::StateStore;
use conquest_types::PlayerId;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::AppState;

/// Query parameters for the `WebSocket` upgrade.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Player the connection acts for.
    pub player_id: Option<String>,
}

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws?player_id=<id>`
pub async fn ws_connect<S: StateStore>(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ObserverError> {
    let player_id = query
        .player_id
        .filter(|id| !id.trim().is_empty())
        .map(PlayerId::new)
        .ok_or_else(|| ObserverError::BadRequest(String::from("player_id is required")))?;
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, player_id)))
}

async fn handle_ws<S: StateStore>(socket: WebSocket, state: Arc<AppState<S>>, player: PlayerId) {
    debug!(%player, "WebSocket client connected");

    let mut rx = state.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        let json = match serde_json::to_string(&update) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize grid update: {e}");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            debug!(%player, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(%player, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = submit_frame(&state.store, &player, text.as_str()).await;
                        if sink.send(Message::Text(reply.to_string().into())).await.is_err() {
                            debug!(%player, "WebSocket client disconnected (reply failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            debug!(%player, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%player, "WebSocket client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!(%player, "WebSocket error: {e}");
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Enqueue one action frame and build the reply.
async fn submit_frame<S: StateStore>(
    store: &S,
    player: &PlayerId,
    text: &str,
) -> serde_json::Value {
    let result = match parse_action(text) {
        Ok(params) => submit_action(store, player, params).await,
        Err(e) => Err(e),
    };
    match result {
        Ok((_, queued)) => serde_json::json!({ "queued": queued }),
        Err(e) => {
            if matches!(e, IngressError::Store(_)) {
                warn!(%player, error = %e, "Action frame failed");
            }
            serde_json::json!({ "error": e.to_string() })
        }
    }
}
