//! Immutable game configuration.
//!
//! A [`GameDefinition`] is constructed once per game from static data — map
//! layout, tile manifest, train roster, phase table, market rows, entity
//! templates, and the named optional-rule set — and never mutated during
//! play. All mutable state lives in `GameState`; everything here is shared
//! read-only by the round pipeline and the route finder.

use serde::{Deserialize, Serialize};

use crate::ability::AbilitySet;
use crate::core::HexId;
use crate::map::{HexCoord, Tile, TileManifest};
use crate::market::StockMarket;
use crate::phase::PhaseTable;
use crate::train::TrainType;

/// One hex of the fixed map layout: coordinate, display name, and the
/// preprinted tile it opens with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapHex {
    /// Display name ("A4").
    pub name: String,
    /// Grid coordinate.
    pub coord: HexCoord,
    /// Preprinted tile (blank white terrain for plain hexes).
    pub tile: Tile,
}

/// Template for a corporation: the immutable half of its identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorporationTemplate {
    /// Corporation name ("L&N").
    pub name: String,
    /// Station tokens available, home token included.
    pub tokens: u8,
    /// Home hex.
    pub home: HexId,
    /// City index of the home station on that hex.
    pub home_city: u8,
    /// Abilities granted at setup.
    pub abilities: AbilitySet,
}

/// Template for a private company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyTemplate {
    /// Company name.
    pub name: String,
    /// Face value paid at setup.
    pub value: i64,
    /// Income paid to the owner at the start of each operating round.
    pub revenue: i64,
    /// Abilities the company carries.
    pub abilities: AbilitySet,
}

/// The optional-rule set, resolved once at setup.
///
/// Each field is an explicit named toggle with a documented effect; nothing
/// in the engine checks variant flags ad hoc.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Loan principal received per loan. Zero disables loans.
    pub loan_amount: i64,
    /// Maximum loans a corporation may carry.
    pub loan_limit: u32,
    /// Cost of placing a station token beyond the home token.
    pub token_cost: i64,
    /// A corporation's trains may share track segments on one turn.
    pub allow_shared_track: bool,
    /// Obsolescence triggers are treated as hard rust: the train is removed
    /// instead of flagged.
    pub hard_rust: bool,
    /// Train type with effectively unlimited supply: buying the last queued
    /// unit injects another.
    pub unlimited_diesels: Option<String>,
    /// Corporations may lay two yellow tiles on their first operating turn.
    pub double_yellow_first_or: bool,
    /// Share purchases pay into the corporation's treasury as it sells,
    /// instead of a full capitalization grant at float.
    pub incremental_capitalization: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            loan_amount: 0,
            loan_limit: 0,
            token_cost: 40,
            allow_shared_track: false,
            hard_rust: false,
            unlimited_diesels: None,
            double_yellow_first_or: false,
            incremental_capitalization: false,
        }
    }
}

/// The complete immutable configuration of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameDefinition {
    /// Title name.
    pub name: String,
    /// Map layout, indexed by [`HexId`].
    pub hexes: Vec<MapHex>,
    /// Tile catalog with supply counts.
    pub manifest: TileManifest,
    /// Train roster.
    pub roster: Vec<TrainType>,
    /// Ordered phase table.
    pub phases: PhaseTable,
    /// Stock-market price grid.
    pub market: StockMarket,
    /// Corporation templates, indexed by `CorporationId`.
    pub corporations: Vec<CorporationTemplate>,
    /// Private company templates, indexed by `CompanyId`.
    pub companies: Vec<CompanyTemplate>,
    /// Optional-rule toggles.
    pub rules: RuleOptions,
    /// Number of players.
    pub players: u8,
    /// Cash each player starts with.
    pub starting_cash: i64,
    /// Bank size.
    pub bank: i64,
}

impl GameDefinition {
    /// Hex coordinates in [`HexId`] order, for adjacency resolution.
    #[must_use]
    pub fn coords(&self) -> Vec<HexCoord> {
        self.hexes.iter().map(|h| h.coord).collect()
    }

    /// Find a hex by display name.
    #[must_use]
    pub fn hex_by_name(&self, name: &str) -> Option<HexId> {
        self.hexes
            .iter()
            .position(|h| h.name == name)
            .map(|i| HexId::new(i as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_defaults() {
        let rules = RuleOptions::default();
        assert_eq!(rules.loan_amount, 0);
        assert!(!rules.allow_shared_track);
        assert!(rules.unlimited_diesels.is_none());
    }
}
