//! Precondition checks for queued actions.
//!
//! Runs against the state loaded by the tick engine and never mutates it.
//! Stages, in order:
//! 1. Faction -- the actor's faction record must exist.
//! 2. Target -- for cell actions, bounds, ownership, and adjacency.
//! 3. Cost -- the player (or the faction pool) can pay.
//!
//! The first failing stage decides the [`RejectionReason`].

use conquest_types::{
    ActionParameters, ActionType, CellPos, Faction, FactionName, Grid, Player, RejectionReason,
};

use crate::costs::ActionCosts;

/// Check whether `params` can be applied for `player`.
pub fn validate_action(
    params: &ActionParameters,
    player: &Player,
    faction: Option<&Faction>,
    grid: &Grid,
    costs: &ActionCosts,
) -> Result<(), RejectionReason> {
    let faction = faction.ok_or(RejectionReason::FactionNotFound)?;

    match params {
        ActionParameters::Attack(target) => {
            let pos = grid
                .locate(target.x, target.y)
                .ok_or(RejectionReason::OutOfBounds)?;
            validate_attack_target(grid, pos, player.faction)?;
            validate_player_ap(player, costs.player_cost(ActionType::Attack))
        }
        ActionParameters::Fortify(target) => {
            let pos = grid
                .locate(target.x, target.y)
                .ok_or(RejectionReason::OutOfBounds)?;
            let owned = grid
                .get(pos)
                .is_some_and(|cell| cell.is_owned_by(player.faction));
            if !owned {
                return Err(RejectionReason::NotOwned);
            }
            validate_player_ap(player, costs.player_cost(ActionType::Fortify))
        }
        ActionParameters::DonateAp(donation) => {
            let amount =
                u64::try_from(donation.amount).map_err(|_e| RejectionReason::NonPositiveAmount)?;
            if amount == 0 {
                return Err(RejectionReason::NonPositiveAmount);
            }
            validate_player_ap(player, amount)
        }
        ActionParameters::UpgradeRequest(_) => {
            if faction.ap_pool < costs.pool_cost(ActionType::UpgradeRequest) {
                Err(RejectionReason::InsufficientPool)
            } else {
                Ok(())
            }
        }
    }
}

/// The attack target must belong to someone else and border the attacker.
fn validate_attack_target(
    grid: &Grid,
    pos: CellPos,
    faction: FactionName,
) -> Result<(), RejectionReason> {
    let already_owned = grid.get(pos).is_some_and(|cell| cell.is_owned_by(faction));
    if already_owned {
        return Err(RejectionReason::AlreadyOwned);
    }
    if !borders_territory(grid, pos, faction) {
        return Err(RejectionReason::NotAdjacent);
    }
    Ok(())
}

/// Whether any orthogonal neighbour of `pos` is owned by `faction`.
pub fn borders_territory(grid: &Grid, pos: CellPos, faction: FactionName) -> bool {
    grid.neighbors(pos)
        .filter_map(|n| grid.get(n))
        .any(|cell| cell.is_owned_by(faction))
}

const fn validate_player_ap(player: &Player, cost: u64) -> Result<(), RejectionReason> {
    if player.ap < cost {
        Err(RejectionReason::InsufficientAp)
    } else {
        Ok(())
    }
}
