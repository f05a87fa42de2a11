//! Engine errors.
//!
//! Every error here is recoverable at the action boundary: a rejected action
//! leaves state unchanged and carries enough detail for the caller to
//! re-prompt. Engine-internal invariant breaches (a tile pool going
//! negative, a dangling entity reference in configuration) are bugs, not
//! player errors, and panic instead.

use thiserror::Error;

use super::action::ActionKind;
use super::entity::Actor;

/// Errors surfaced while validating or applying an action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The action's kind is not offered by the current step for this actor.
    #[error("illegal action: {kind:?} not available to {actor} at step {step}")]
    IllegalAction {
        /// The rejected action kind.
        kind: ActionKind,
        /// Who attempted it.
        actor: Actor,
        /// Name of the step that rejected it.
        step: &'static str,
    },

    /// The actor cannot pay for the attempted purchase or cost.
    #[error("insufficient funds: {actor} has {available}, needs {required}")]
    InsufficientFunds {
        /// Who attempted the payment.
        actor: Actor,
        /// Cash on hand.
        available: i64,
        /// Cost of the attempted action.
        required: i64,
    },

    /// A tile lay violated connectivity, terrain, color, or supply rules.
    #[error("invalid tile placement: {reason}")]
    InvalidTilePlacement {
        /// Human-readable violation description.
        reason: String,
    },

    /// No legal route exists for a train.
    ///
    /// Not fatal during revenue runs (the train contributes zero); returned
    /// only when a caller asks for a specific train's route explicitly.
    #[error("no legal route for train")]
    NoLegalRoute,

    /// A variant-specific constraint was violated (loan limit, terminus
    /// pass-through, certificate limit, ...).
    #[error("rule violation: {reason}")]
    RuleViolation {
        /// Human-readable violation description.
        reason: String,
    },
}

impl EngineError {
    /// Shorthand for a rule violation with a formatted reason.
    #[must_use]
    pub fn rule(reason: impl Into<String>) -> Self {
        EngineError::RuleViolation {
            reason: reason.into(),
        }
    }

    /// Shorthand for an invalid tile placement with a formatted reason.
    #[must_use]
    pub fn placement(reason: impl Into<String>) -> Self {
        EngineError::InvalidTilePlacement {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{CorporationId, PlayerId};

    #[test]
    fn test_display_messages() {
        let err = EngineError::InsufficientFunds {
            actor: Actor::Corporation(CorporationId::new(0)),
            available: 50,
            required: 80,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: Corp(0) has 50, needs 80"
        );

        let err = EngineError::IllegalAction {
            kind: ActionKind::Pass,
            actor: Actor::Player(PlayerId::new(1)),
            step: "track",
        };
        assert!(err.to_string().contains("Pass"));
        assert!(err.to_string().contains("track"));
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(
            EngineError::rule("loan limit exceeded"),
            EngineError::RuleViolation {
                reason: "loan limit exceeded".into()
            }
        );
        assert!(matches!(
            EngineError::placement("no supply"),
            EngineError::InvalidTilePlacement { .. }
        ));
    }
}
