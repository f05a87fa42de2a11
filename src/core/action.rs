//! Action representation.
//!
//! An action is the "verb" of the engine: a kind plus its parameters,
//! submitted on behalf of an actor. The engine validates the action against
//! the current step before applying it; every accepted action yields exactly
//! one log entry.
//!
//! Actions carry only IDs and scalars so the full log serializes compactly
//! and replays without any reference fixup.

use serde::{Deserialize, Serialize};

use super::entity::{CompanyId, CorporationId, HexId, TrainId};

/// How a corporation distributes its route revenue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DividendKind {
    /// Pay revenue out to shareholders.
    Payout,
    /// Withhold revenue into the treasury.
    Withhold,
}

/// A complete game action: kind plus parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Decline to act in the current step.
    Pass,

    /// Lay or upgrade a tile on a hex.
    LayTile {
        /// Target hex.
        hex: HexId,
        /// Tile name from the manifest ("57", "X10").
        tile: String,
        /// Rotation in sixths, 0..6.
        rotation: u8,
    },

    /// Place a station token in a city.
    PlaceToken {
        /// Target hex.
        hex: HexId,
        /// City index within the hex's tile.
        city: u8,
    },

    /// Run the corporation's trains; routes are computed by the engine.
    RunRoutes,

    /// Distribute the revenue of the preceding run.
    Dividend {
        /// Payout or withhold.
        kind: DividendKind,
    },

    /// Buy a train from the depot or another corporation.
    BuyTrain {
        /// The train unit to buy.
        train: TrainId,
        /// Agreed price (depot trains sell at list price).
        price: i64,
    },

    /// Discard a train to the depot pool (over the train limit).
    DiscardTrain {
        /// The train to discard.
        train: TrainId,
    },

    /// Buy a private company into the corporation.
    BuyCompany {
        /// The company being bought.
        company: CompanyId,
        /// Agreed price.
        price: i64,
    },

    /// Take a loan from the bank.
    TakeLoan,

    /// Declare bankruptcy (president cannot fund a mandatory train buy).
    Bankrupt,

    /// Set a corporation's par price and take the president's certificate.
    Par {
        /// The corporation being started.
        corporation: CorporationId,
        /// Chosen par price; must be a par cell on the market.
        price: i64,
    },

    /// Buy one share (10%) from the bank pool or initial offering.
    BuyShares {
        /// The corporation whose share is bought.
        corporation: CorporationId,
    },

    /// Sell shares back to the bank pool.
    SellShares {
        /// The corporation whose shares are sold.
        corporation: CorporationId,
        /// Number of 10% shares to sell.
        shares: u8,
    },
}

impl Action {
    /// The discriminant kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Pass => ActionKind::Pass,
            Action::LayTile { .. } => ActionKind::LayTile,
            Action::PlaceToken { .. } => ActionKind::PlaceToken,
            Action::RunRoutes => ActionKind::RunRoutes,
            Action::Dividend { .. } => ActionKind::Dividend,
            Action::BuyTrain { .. } => ActionKind::BuyTrain,
            Action::DiscardTrain { .. } => ActionKind::DiscardTrain,
            Action::BuyCompany { .. } => ActionKind::BuyCompany,
            Action::TakeLoan => ActionKind::TakeLoan,
            Action::Bankrupt => ActionKind::Bankrupt,
            Action::Par { .. } => ActionKind::Par,
            Action::BuyShares { .. } => ActionKind::BuyShares,
            Action::SellShares { .. } => ActionKind::SellShares,
        }
    }
}

/// Action kind without parameters.
///
/// Steps advertise what they can currently process as a set of kinds; the
/// round manager rejects any submitted action whose kind is not advertised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// See [`Action::Pass`].
    Pass,
    /// See [`Action::LayTile`].
    LayTile,
    /// See [`Action::PlaceToken`].
    PlaceToken,
    /// See [`Action::RunRoutes`].
    RunRoutes,
    /// See [`Action::Dividend`].
    Dividend,
    /// See [`Action::BuyTrain`].
    BuyTrain,
    /// See [`Action::DiscardTrain`].
    DiscardTrain,
    /// See [`Action::BuyCompany`].
    BuyCompany,
    /// See [`Action::TakeLoan`].
    TakeLoan,
    /// See [`Action::Bankrupt`].
    Bankrupt,
    /// See [`Action::Par`].
    Par,
    /// See [`Action::BuyShares`].
    BuyShares,
    /// See [`Action::SellShares`].
    SellShares,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminants() {
        assert_eq!(Action::Pass.kind(), ActionKind::Pass);
        assert_eq!(
            Action::LayTile {
                hex: HexId::new(3),
                tile: "57".into(),
                rotation: 2
            }
            .kind(),
            ActionKind::LayTile
        );
        assert_eq!(
            Action::Dividend {
                kind: DividendKind::Payout
            }
            .kind(),
            ActionKind::Dividend
        );
        assert_eq!(
            Action::SellShares {
                corporation: CorporationId::new(0),
                shares: 2
            }
            .kind(),
            ActionKind::SellShares
        );
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::BuyTrain {
            train: TrainId::new(4),
            price: 300,
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
