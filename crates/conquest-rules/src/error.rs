//! Error types for the `conquest-rules` crate.
//!
//! Game-rule failures are not errors: they come back as
//! [`RejectionReason`] values. The variants here cover the few ways a
//! handler can still fail after validation passed.

use conquest_types::{CellPos, RejectionReason};

/// Errors raised while computing a state delta.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A counter would overflow or go below zero.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },

    /// The target cell vanished between validation and execution.
    #[error("no cell at ({}, {})", pos.x, pos.y)]
    MissingCell {
        /// The requested position.
        pos: CellPos,
    },
}

impl RulesError {
    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }

    /// The rejection reported to the tick engine for this failure.
    pub const fn rejection(&self) -> RejectionReason {
        match self {
            Self::ArithmeticOverflow { .. } => RejectionReason::Overflow,
            Self::MissingCell { .. } => RejectionReason::OutOfBounds,
        }
    }
}
