//! Action payloads, queued actions, and action outcomes.
//!
//! On the wire an action is `{"type": "...", "payload": {...}}`. The queue
//! stores the same object with an extra `timestamp` stamped at enqueue
//! time. Shape rules (types, label length) are enforced at ingress through
//! [`validator::Validate`]; game rules (bounds, AP, adjacency) belong to the
//! applier and never reject at this layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationErrors};

use crate::enums::ActionType;
use crate::grid::CellPos;

/// Target coordinates for `attack` and `fortify`.
///
/// Coordinates are signed so that a negative value is a well-formed
/// request the applier rejects as out of bounds, not a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct CellTarget {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

/// Payload of `donate_ap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct Donation {
    /// AP to move into the faction pool. Must be positive to be accepted.
    pub amount: i64,
}

/// Payload of `upgrade_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeOrder {
    /// Opaque upgrade label; any label of 1 to 64 characters is tracked.
    #[validate(length(min = 1, max = 64))]
    pub upgrade: String,
}

/// What a player asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionParameters {
    /// Attack the cell at the target.
    Attack(CellTarget),
    /// Fortify the cell at the target.
    Fortify(CellTarget),
    /// Donate AP to the faction pool.
    DonateAp(Donation),
    /// Spend faction pool AP on an upgrade.
    UpgradeRequest(UpgradeOrder),
}

impl ActionParameters {
    /// The discriminant of this action.
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Attack(_) => ActionType::Attack,
            Self::Fortify(_) => ActionType::Fortify,
            Self::DonateAp(_) => ActionType::DonateAp,
            Self::UpgradeRequest(_) => ActionType::UpgradeRequest,
        }
    }
}

impl Validate for ActionParameters {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Attack(target) | Self::Fortify(target) => target.validate(),
            Self::DonateAp(donation) => donation.validate(),
            Self::UpgradeRequest(order) => order.validate(),
        }
    }
}

/// An action sitting in a player's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    /// The requested action.
    #[serde(flatten)]
    pub parameters: ActionParameters,
    /// When ingress accepted the action. Informational only.
    pub timestamp: DateTime<Utc>,
}

impl QueuedAction {
    /// Stamp `parameters` with the current time.
    pub fn now(parameters: ActionParameters) -> Self {
        Self {
            parameters,
            timestamp: Utc::now(),
        }
    }
}

/// The observable effect of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionOutcome {
    /// The attack took the cell.
    Captured {
        /// The captured cell.
        pos: CellPos,
    },
    /// The attack stripped one level of fortification.
    Weakened {
        /// The attacked cell.
        pos: CellPos,
        /// Fortification left after the attack.
        remaining: u32,
    },
    /// The cell gained a level of fortification.
    Fortified {
        /// The fortified cell.
        pos: CellPos,
        /// Fortification after the action.
        level: u32,
    },
    /// AP moved from the player to the faction pool.
    Donated {
        /// AP moved.
        amount: u64,
        /// Faction pool after the donation.
        pool: u64,
    },
    /// The faction bought an upgrade.
    Upgraded {
        /// Upgrade label.
        upgrade: String,
        /// Count after the purchase.
        count: u64,
    },
}
