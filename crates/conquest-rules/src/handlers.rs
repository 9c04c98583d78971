//! Execution handlers for validated actions.
//!
//! Each handler assumes [`validate_action`](crate::validation::validate_action)
//! already passed. Nothing is mutated in place: a handler returns the
//! post-action player, faction, and (for cell actions) replacement cell as a
//! [`StateDelta`] for the caller to apply and persist. All AP arithmetic is
//! checked.

use conquest_types::{
    ActionOutcome, ActionParameters, ActionType, Cell, CellPos, Faction, Grid, Player,
};

use crate::costs::ActionCosts;
use crate::error::RulesError;

/// Everything an accepted action changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDelta {
    /// The acting player after paying for the action.
    pub player: Player,
    /// The actor's faction after the action.
    pub faction: Faction,
    /// Replacement for the target cell, if the action touched the grid.
    pub cell: Option<Cell>,
    /// What happened.
    pub outcome: ActionOutcome,
}

/// Wear down or capture the cell at `pos`.
///
/// A fortified cell loses one level and keeps its owner. An unfortified
/// cell changes hands and stays at fortification zero.
pub fn execute_attack(
    player: &Player,
    faction: &Faction,
    grid: &Grid,
    pos: CellPos,
    costs: &ActionCosts,
) -> Result<StateDelta, RulesError> {
    let mut cell = target_cell(grid, pos)?;
    let mut actor = player.clone();
    actor.ap = spend(actor.ap, costs.player_cost(ActionType::Attack), "attack cost")?;

    let outcome = if cell.fortification_level > 0 {
        cell.fortification_level = cell
            .fortification_level
            .checked_sub(1)
            .ok_or_else(|| RulesError::overflow("fortification decrement"))?;
        cell.last_attacked_by = Some(player.id.clone());
        ActionOutcome::Weakened {
            pos,
            remaining: cell.fortification_level,
        }
    } else {
        cell.owner_faction = Some(player.faction);
        cell.last_captured_by = Some(player.id.clone());
        ActionOutcome::Captured { pos }
    };

    Ok(StateDelta {
        player: actor,
        faction: faction.clone(),
        cell: Some(cell),
        outcome,
    })
}

/// Add one level of fortification to an owned cell.
pub fn execute_fortify(
    player: &Player,
    faction: &Faction,
    grid: &Grid,
    pos: CellPos,
    costs: &ActionCosts,
) -> Result<StateDelta, RulesError> {
    let mut cell = target_cell(grid, pos)?;
    let mut actor = player.clone();
    actor.ap = spend(actor.ap, costs.player_cost(ActionType::Fortify), "fortify cost")?;

    cell.fortification_level = cell
        .fortification_level
        .checked_add(1)
        .ok_or_else(|| RulesError::overflow("fortification increment"))?;
    cell.last_fortified_by = Some(player.id.clone());
    let level = cell.fortification_level;

    Ok(StateDelta {
        player: actor,
        faction: faction.clone(),
        cell: Some(cell),
        outcome: ActionOutcome::Fortified { pos, level },
    })
}

/// Move `amount` AP from the player into the faction pool.
///
/// `player.ap + faction.ap_pool` is the same before and after.
pub fn execute_donate(
    player: &Player,
    faction: &Faction,
    amount: u64,
) -> Result<StateDelta, RulesError> {
    let mut actor = player.clone();
    let mut pool = faction.clone();
    actor.ap = spend(actor.ap, amount, "donation")?;
    pool.ap_pool = pool
        .ap_pool
        .checked_add(amount)
        .ok_or_else(|| RulesError::overflow("faction pool"))?;
    let total = pool.ap_pool;

    Ok(StateDelta {
        player: actor,
        faction: pool,
        cell: None,
        outcome: ActionOutcome::Donated {
            amount,
            pool: total,
        },
    })
}

/// Spend pool AP on one more of `upgrade`.
pub fn execute_upgrade(
    player: &Player,
    faction: &Faction,
    upgrade: &str,
    costs: &ActionCosts,
) -> Result<StateDelta, RulesError> {
    let mut buyer = faction.clone();
    buyer.ap_pool = spend(
        buyer.ap_pool,
        costs.pool_cost(ActionType::UpgradeRequest),
        "upgrade cost",
    )?;
    let count = buyer
        .upgrade_count(upgrade)
        .checked_add(1)
        .ok_or_else(|| RulesError::overflow("upgrade count"))?;
    buyer.upgrades.insert(upgrade.to_owned(), count);

    Ok(StateDelta {
        player: player.clone(),
        faction: buyer,
        cell: None,
        outcome: ActionOutcome::Upgraded {
            upgrade: upgrade.to_owned(),
            count,
        },
    })
}

/// Dispatch a validated action to its handler.
pub fn execute_action(
    params: &ActionParameters,
    player: &Player,
    faction: &Faction,
    grid: &Grid,
    costs: &ActionCosts,
) -> Result<StateDelta, RulesError> {
    match params {
        ActionParameters::Attack(target) => {
            let pos = locate(grid, target.x, target.y)?;
            execute_attack(player, faction, grid, pos, costs)
        }
        ActionParameters::Fortify(target) => {
            let pos = locate(grid, target.x, target.y)?;
            execute_fortify(player, faction, grid, pos, costs)
        }
        ActionParameters::DonateAp(donation) => {
            let amount = u64::try_from(donation.amount)
                .map_err(|_e| RulesError::overflow("negative donation"))?;
            execute_donate(player, faction, amount)
        }
        ActionParameters::UpgradeRequest(order) => {
            execute_upgrade(player, faction, &order.upgrade, costs)
        }
    }
}

fn locate(grid: &Grid, x: i64, y: i64) -> Result<CellPos, RulesError> {
    grid.locate(x, y).ok_or_else(|| RulesError::MissingCell {
        pos: CellPos {
            x: u32::try_from(x).unwrap_or(u32::MAX),
            y: u32::try_from(y).unwrap_or(u32::MAX),
        },
    })
}

fn target_cell(grid: &Grid, pos: CellPos) -> Result<Cell, RulesError> {
    grid.get(pos).cloned().ok_or(RulesError::MissingCell { pos })
}

fn spend(balance: u64, cost: u64, context: &str) -> Result<u64, RulesError> {
    balance
        .checked_sub(cost)
        .ok_or_else(|| RulesError::overflow(context))
}
