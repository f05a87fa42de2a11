//! The ordered phase table.
//!
//! Phases gate tile colors, train limits, and operating-round counts. The
//! game advances to a phase when its trigger train is first purchased from
//! the depot; advancement is monotonic and irreversible. Rust and
//! obsolescence events fire against the name of the purchased train, and
//! phase-named events (closing companies, stripping bonus tokens) run
//! through the variant hooks.

use serde::{Deserialize, Serialize};

use crate::map::TileColor;

/// A named event fired when a phase begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// All private companies close and leave play.
    CloseCompanies,
    /// Variant-placed bonus tokens are removed from the map.
    RemoveTokens,
}

/// One phase of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase name, conventionally the trigger train's name.
    pub name: String,
    /// Train whose first depot purchase starts this phase. `None` for the
    /// opening phase.
    pub on: Option<String>,
    /// Tile colors that may be laid in this phase.
    pub tiles: Vec<TileColor>,
    /// Trains a corporation may own (obsolete units exempt).
    pub train_limit: u8,
    /// Operating rounds between stock rounds.
    pub operating_rounds: u8,
    /// Events fired when the phase begins.
    pub events: Vec<PhaseEvent>,
}

impl Phase {
    /// Create a phase with no trigger or events.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        tiles: Vec<TileColor>,
        train_limit: u8,
        operating_rounds: u8,
    ) -> Self {
        Self {
            name: name.into(),
            on: None,
            tiles,
            train_limit,
            operating_rounds,
            events: Vec::new(),
        }
    }

    /// Set the trigger train (builder pattern).
    #[must_use]
    pub fn on(mut self, train: impl Into<String>) -> Self {
        self.on = Some(train.into());
        self
    }

    /// Add a begin-of-phase event (builder pattern).
    #[must_use]
    pub fn with_event(mut self, event: PhaseEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Highest tile color this phase permits.
    #[must_use]
    pub fn max_color(&self) -> TileColor {
        self.tiles
            .iter()
            .copied()
            .max()
            .unwrap_or(TileColor::Yellow)
    }
}

/// The ordered, immutable phase table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Build the table.
    ///
    /// # Panics
    /// Panics on an empty table: a game must open in some phase.
    #[must_use]
    pub fn new(phases: Vec<Phase>) -> Self {
        assert!(!phases.is_empty(), "phase table must not be empty");
        Self { phases }
    }

    /// Number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// True if the table is empty (never: construction forbids it).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// The phase at an index.
    #[must_use]
    pub fn get(&self, index: usize) -> &Phase {
        &self.phases[index]
    }

    /// The phase a depot purchase of `train_name` advances to, if it is
    /// later than `current`. Advancement never goes backwards.
    #[must_use]
    pub fn advance_target(&self, current: usize, train_name: &str) -> Option<usize> {
        self.phases
            .iter()
            .position(|p| p.on.as_deref() == Some(train_name))
            .filter(|&target| target > current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PhaseTable {
        PhaseTable::new(vec![
            Phase::new("2", vec![TileColor::Yellow], 4, 1),
            Phase::new("3", vec![TileColor::Yellow, TileColor::Green], 4, 2).on("3"),
            Phase::new("4", vec![TileColor::Yellow, TileColor::Green], 3, 2)
                .on("4")
                .with_event(PhaseEvent::CloseCompanies),
            Phase::new(
                "5",
                vec![TileColor::Yellow, TileColor::Green, TileColor::Brown],
                2,
                3,
            )
            .on("5"),
        ])
    }

    #[test]
    fn test_advance_target() {
        let table = table();
        assert_eq!(table.advance_target(0, "3"), Some(1));
        assert_eq!(table.advance_target(0, "5"), Some(3));
        // Already there or behind: no advance.
        assert_eq!(table.advance_target(1, "3"), None);
        assert_eq!(table.advance_target(2, "3"), None);
        // Unknown trains trigger nothing.
        assert_eq!(table.advance_target(0, "2"), None);
        assert_eq!(table.advance_target(0, "9"), None);
    }

    #[test]
    fn test_max_color() {
        let table = table();
        assert_eq!(table.get(0).max_color(), TileColor::Yellow);
        assert_eq!(table.get(3).max_color(), TileColor::Brown);
    }

    #[test]
    fn test_events() {
        let table = table();
        assert_eq!(table.get(2).events, vec![PhaseEvent::CloseCompanies]);
        assert!(table.get(1).events.is_empty());
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_empty_table_panics() {
        let _ = PhaseTable::new(vec![]);
    }
}
