//! AP costs per action type.
//!
//! | Action            | Paid from    | Default |
//! |-------------------|--------------|---------|
//! | `attack`          | player AP    | 10      |
//! | `fortify`         | player AP    | 5       |
//! | `donate_ap`       | player AP    | amount  |
//! | `upgrade_request` | faction pool | 100     |
//!
//! All values are `u64` -- AP is never fractional or negative.

use conquest_types::ActionType;
use serde::{Deserialize, Serialize};

/// Default player AP cost of an attack.
pub const ATTACK_COST: u64 = 10;

/// Default player AP cost of a fortify.
pub const FORTIFY_COST: u64 = 5;

/// Default faction pool cost of one upgrade.
pub const UPGRADE_COST: u64 = 100;

/// The cost table in effect for a match.
///
/// Loaded from the `economy` section of the config file; any field left out
/// keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    /// Player AP spent per attack.
    pub attack: u64,
    /// Player AP spent per fortify.
    pub fortify: u64,
    /// Faction pool AP spent per upgrade.
    pub upgrade: u64,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            attack: ATTACK_COST,
            fortify: FORTIFY_COST,
            upgrade: UPGRADE_COST,
        }
    }
}

impl ActionCosts {
    /// Fixed player AP cost of `action`.
    ///
    /// Donations cost whatever amount is donated, so they report zero here.
    #[allow(clippy::match_same_arms)]
    pub const fn player_cost(&self, action: ActionType) -> u64 {
        match action {
            ActionType::Attack => self.attack,
            ActionType::Fortify => self.fortify,
            ActionType::DonateAp => 0,
            ActionType::UpgradeRequest => 0,
        }
    }

    /// Faction pool cost of `action`.
    pub const fn pool_cost(&self, action: ActionType) -> u64 {
        match action {
            ActionType::UpgradeRequest => self.upgrade,
            ActionType::Attack | ActionType::Fortify | ActionType::DonateAp => 0,
        }
    }
}
