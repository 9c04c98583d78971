//! Action ingress: shape checks and queue appends.
//!
//! Ingress never looks at the grid or at AP. It only makes sure an action is
//! well formed and belongs to a known player, stamps it, and appends it to
//! the player's queue. Whether the action is legal is decided later by the
//! tick engine.

use conquest_db::keys::KEY_SEPARATOR;
use conquest_db::{DbError, StateStore};
use conquest_types::{ActionParameters, FactionName, Player, PlayerId, QueuedAction};
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

/// Reasons ingress refuses a request.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// The body is not a recognised action (unknown type, missing or
    /// mistyped fields).
    #[error("malformed action: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The action parsed but a field is out of shape.
    #[error("invalid action: {0}")]
    Invalid(#[from] ValidationErrors),

    /// No player record exists for the id.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// Player ids must be non-empty.
    #[error("player id must not be empty")]
    EmptyPlayerId,

    /// Player ids must not contain the store's key separator.
    #[error("player id must not contain ':': {0}")]
    InvalidPlayerId(PlayerId),

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

/// Parse and shape-check a raw JSON action.
pub fn parse_action(raw: &str) -> Result<ActionParameters, IngressError> {
    let params: ActionParameters = serde_json::from_str(raw)?;
    params.validate()?;
    Ok(params)
}

/// Enqueue `params` for `player_id`.
///
/// Returns the stamped action and the queue length after the append.
pub async fn submit_action<S: StateStore>(
    store: &S,
    player_id: &PlayerId,
    params: ActionParameters,
) -> Result<(QueuedAction, u64), IngressError> {
    params.validate()?;
    if store.get_player(player_id).await?.is_none() {
        return Err(IngressError::UnknownPlayer(player_id.clone()));
    }
    let action = QueuedAction::now(params);
    let queued = store.push_action(player_id, &action).await?;
    debug!(
        player = %player_id,
        action = ?action.parameters.action_type(),
        queued,
        "Action enqueued"
    );
    Ok((action, queued))
}

/// Result of a join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The player record now in the store.
    pub player: Player,
    /// Whether this request created it.
    pub created: bool,
}

/// Create a player in `faction` with `starting_ap`, unless one exists.
///
/// An existing player keeps its faction and AP. Ids that are blank or
/// contain `:` are refused.
pub async fn join_player<S: StateStore>(
    store: &S,
    player_id: PlayerId,
    faction: FactionName,
    starting_ap: u64,
) -> Result<JoinOutcome, IngressError> {
    if player_id.as_str().trim().is_empty() {
        return Err(IngressError::EmptyPlayerId);
    }
    if player_id.as_str().contains(KEY_SEPARATOR) {
        return Err(IngressError::InvalidPlayerId(player_id));
    }
    let candidate = Player::new(player_id, faction, starting_ap);
    if store.register_player(&candidate).await? {
        info!(player = %candidate.id, %faction, "Player joined");
        return Ok(JoinOutcome {
            player: candidate,
            created: true,
        });
    }
    let existing = store
        .get_player(&candidate.id)
        .await?
        .ok_or_else(|| IngressError::UnknownPlayer(candidate.id.clone()))?;
    Ok(JoinOutcome {
        player: existing,
        created: false,
    })
}
