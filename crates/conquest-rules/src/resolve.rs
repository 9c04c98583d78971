//! Single entry point used by the tick engine.

use conquest_types::{ActionParameters, Faction, Grid, Player, RejectionReason};
use tracing::debug;

use crate::costs::ActionCosts;
use crate::handlers::{StateDelta, execute_action};
use crate::validation::validate_action;

/// The verdict on one queued action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Apply and persist the delta.
    Accepted(Box<StateDelta>),
    /// Drop the action; nothing changes.
    Rejected(RejectionReason),
}

impl Resolution {
    /// Whether the action was accepted.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Validate `params` and, if it passes, compute its effect.
///
/// A handler failure after validation (an overflowing counter) is reported
/// as a rejection so one bad action never aborts a tick.
pub fn resolve_action(
    params: &ActionParameters,
    player: &Player,
    faction: Option<&Faction>,
    grid: &Grid,
    costs: &ActionCosts,
) -> Resolution {
    if let Err(reason) = validate_action(params, player, faction, grid, costs) {
        return Resolution::Rejected(reason);
    }
    let Some(faction) = faction else {
        return Resolution::Rejected(RejectionReason::FactionNotFound);
    };
    match execute_action(params, player, faction, grid, costs) {
        Ok(delta) => Resolution::Accepted(Box::new(delta)),
        Err(err) => {
            debug!(player = %player.id, error = %err, "Action failed after validation");
            Resolution::Rejected(err.rejection())
        }
    }
}
