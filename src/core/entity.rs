//! Entity identification.
//!
//! Every mutable game object (player, corporation, private company, train,
//! hex) has a typed identifier. IDs are indices into the corresponding
//! `GameDefinition` / `GameState` tables, allocated once at setup and stable
//! for the life of a game, so the action log can reference entities by ID.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player, 0-based seat order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a player ID from a seat index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a given player count.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// Unique identifier for a corporation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorporationId(pub u16);

impl CorporationId {
    /// Create a corporation ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CorporationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Corp({})", self.0)
    }
}

/// Unique identifier for a private company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub u16);

impl CompanyId {
    /// Create a company ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Company({})", self.0)
    }
}

/// Unique identifier for a train unit.
///
/// Train units are allocated from the roster at setup; variant rules that
/// inject extra units extend the same sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrainId(pub u16);

impl TrainId {
    /// Create a train ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TrainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Train({})", self.0)
    }
}

/// Unique identifier for a map hex, an index into the definition's hex list.
///
/// Hexes also carry a human-readable name ("A4", "Q2") in the map layout;
/// the ID is what routes and log entries reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexId(pub u16);

impl HexId {
    /// Create a hex ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for HexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hex({})", self.0)
    }
}

/// The acting entity behind an action.
///
/// Stock-round actions come from players; operating-round actions come from
/// corporations (acting through their president, which the engine does not
/// need to distinguish for validation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A player acting for themselves.
    Player(PlayerId),
    /// A corporation acting in an operating round.
    Corporation(CorporationId),
}

impl Actor {
    /// Get the corporation if this actor is one.
    #[must_use]
    pub fn corporation(self) -> Option<CorporationId> {
        match self {
            Actor::Corporation(c) => Some(c),
            Actor::Player(_) => None,
        }
    }

    /// Get the player if this actor is one.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Actor::Player(p) => Some(p),
            Actor::Corporation(_) => None,
        }
    }
}

/// The entity an ability is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityOwner {
    /// Ability attached to a corporation.
    Corporation(CorporationId),
    /// Ability attached to a private company.
    Company(CompanyId),
}

impl std::fmt::Display for AbilityOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbilityOwner::Corporation(c) => write!(f, "{c}"),
            AbilityOwner::Company(c) => write!(f, "{c}"),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Player(p) => write!(f, "{p}"),
            Actor::Corporation(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids() {
        let ids: Vec<_> = PlayerId::all(3).collect();
        assert_eq!(ids, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
        assert_eq!(PlayerId::new(2).index(), 2);
    }

    #[test]
    fn test_actor_accessors() {
        let p = Actor::Player(PlayerId::new(1));
        let c = Actor::Corporation(CorporationId::new(4));

        assert_eq!(p.player(), Some(PlayerId::new(1)));
        assert_eq!(p.corporation(), None);
        assert_eq!(c.corporation(), Some(CorporationId::new(4)));
        assert_eq!(c.player(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PlayerId::new(2)), "Player(2)");
        assert_eq!(format!("{}", CorporationId::new(1)), "Corp(1)");
        assert_eq!(format!("{}", TrainId::new(7)), "Train(7)");
        assert_eq!(format!("{}", HexId::new(12)), "Hex(12)");
    }

    #[test]
    fn test_serialization() {
        let actor = Actor::Corporation(CorporationId::new(3));
        let json = serde_json::to_string(&actor).unwrap();
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, back);
    }
}
