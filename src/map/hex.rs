//! Hex coordinates and the mutable board.
//!
//! Hexes use the 18xx letter/number naming ("A4": row A, column 4) with the
//! parity convention that row + column is even. Edges are numbered 0..6;
//! edge `e` of a hex faces edge `(e + 3) % 6` of its neighbor.
//!
//! A hex starts with its preprinted tile (possibly blank white terrain) and
//! is re-covered by manifest tiles as track is laid. Tokens survive
//! upgrades, carried over by city index.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CorporationId, EngineError, HexId};

use super::part::{Part, PathEnd};
use super::tile::Tile;

/// Offsets (row, col) per edge, chosen so that `opposite` inverts them.
const EDGE_OFFSETS: [(i16, i16); 6] = [(1, -1), (0, -2), (-1, -1), (-1, 1), (0, 2), (1, 1)];

/// Fixed hex coordinates in the letter/number grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    /// Row index (letter A = 0).
    pub row: i16,
    /// Column number.
    pub col: i16,
}

impl HexCoord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Parse a map name like "A4" or "Q22".
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let letter = chars.next()?;
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let col: i16 = chars.as_str().parse().ok()?;
        Some(Self {
            row: (letter as i16) - ('A' as i16),
            col,
        })
    }

    /// Render the map name ("A4").
    #[must_use]
    pub fn name(&self) -> String {
        let letter = (b'A' + self.row as u8) as char;
        format!("{letter}{}", self.col)
    }

    /// The neighboring coordinate across an edge.
    #[must_use]
    pub fn neighbor(&self, edge: u8) -> Self {
        let (dr, dc) = EDGE_OFFSETS[edge as usize % 6];
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// The matching edge on the neighboring hex.
    #[must_use]
    pub const fn opposite(edge: u8) -> u8 {
        (edge + 3) % 6
    }
}

/// Rotate a path endpoint by a tile rotation. Nodes are unaffected.
#[must_use]
pub fn rotate_end(end: PathEnd, rotation: u8) -> PathEnd {
    match end {
        PathEnd::Edge(e) => PathEnd::Edge((e + rotation) % 6),
        PathEnd::Node(n) => PathEnd::Node(n),
    }
}

/// Mutable state of one hex: its current tile and placed tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexState {
    /// The tile currently covering the hex.
    pub tile: Tile,
    /// Tile rotation in sixths.
    pub rotation: u8,
    /// Name of the manifest tile laid here, `None` while preprinted.
    pub placed: Option<String>,
    /// Tokens per revenue-center node index.
    pub tokens: Vec<SmallVec<[CorporationId; 2]>>,
}

impl HexState {
    /// Create the initial state from a preprinted tile.
    #[must_use]
    pub fn preprinted(tile: Tile) -> Self {
        let nodes = tile.node_count();
        Self {
            tile,
            rotation: 0,
            placed: None,
            tokens: vec![SmallVec::new(); nodes],
        }
    }

    /// Paths with rotation applied, in board-absolute edge numbering.
    pub fn absolute_paths(&self) -> impl Iterator<Item = (PathEnd, PathEnd)> + '_ {
        self.tile
            .paths()
            .map(|(a, b)| (rotate_end(a, self.rotation), rotate_end(b, self.rotation)))
    }

    /// True if any path touches the given board-absolute edge.
    #[must_use]
    pub fn connects_edge(&self, edge: u8) -> bool {
        self.absolute_paths()
            .any(|(a, b)| a == PathEnd::Edge(edge) || b == PathEnd::Edge(edge))
    }

    /// True if the corporation has a token anywhere on this hex.
    #[must_use]
    pub fn has_token(&self, corporation: CorporationId) -> bool {
        self.tokens.iter().any(|slot| slot.contains(&corporation))
    }
}

/// The mutable board: per-hex state indexed by [`HexId`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    hexes: Vec<HexState>,
}

impl Board {
    /// Build a board from initial hex states.
    #[must_use]
    pub fn new(hexes: Vec<HexState>) -> Self {
        Self { hexes }
    }

    /// Number of hexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    /// True if the board has no hexes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    /// The state of a hex.
    ///
    /// # Panics
    /// Panics on an out-of-range ID: IDs are allocated by the definition, so
    /// a bad one is an engine bug, not a player error.
    #[must_use]
    pub fn hex(&self, id: HexId) -> &HexState {
        &self.hexes[id.index()]
    }

    /// Mutable state of a hex.
    pub fn hex_mut(&mut self, id: HexId) -> &mut HexState {
        &mut self.hexes[id.index()]
    }

    /// Iterate hex states with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (HexId, &HexState)> {
        self.hexes
            .iter()
            .enumerate()
            .map(|(i, h)| (HexId::new(i as u16), h))
    }

    /// Replace a hex's tile, preserving tokens by city index.
    ///
    /// Returns the name of the manifest tile that was replaced, if the hex
    /// was not preprinted, so the caller can return it to the pool.
    pub fn lay(&mut self, id: HexId, tile: Tile, rotation: u8) -> Option<String> {
        let hex = &mut self.hexes[id.index()];
        let replaced = hex.placed.take();

        let mut tokens = vec![SmallVec::new(); tile.node_count()];
        for (i, slot) in hex.tokens.iter().enumerate() {
            if i < tokens.len() {
                tokens[i] = slot.clone();
            }
        }

        hex.placed = Some(tile.name.clone());
        hex.tile = tile;
        hex.rotation = rotation;
        hex.tokens = tokens;
        replaced
    }

    /// Place a corporation token in a city.
    pub fn place_token(
        &mut self,
        id: HexId,
        city: u8,
        corporation: CorporationId,
    ) -> Result<(), EngineError> {
        let hex = &mut self.hexes[id.index()];

        if hex.has_token(corporation) {
            return Err(EngineError::rule(format!(
                "{corporation} already has a token on {id}"
            )));
        }

        let slots = match hex.tile.node(city) {
            Some(Part::City { slots, .. }) => *slots,
            _ => {
                return Err(EngineError::rule(format!(
                    "no city {city} on {id} to token"
                )))
            }
        };

        let slot = &mut hex.tokens[city as usize];
        if slot.len() >= slots as usize {
            return Err(EngineError::rule(format!("city {city} on {id} is full")));
        }
        slot.push(corporation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::part::{Revenue, TileColor};

    fn two_slot_city() -> Tile {
        Tile::from_code(
            "X10",
            TileColor::Green,
            "city=revenue:50,slots:2;path=a:0,b:_0;path=a:3,b:_0",
        )
        .unwrap()
    }

    #[test]
    fn test_coord_names() {
        let coord = HexCoord::from_name("A4").unwrap();
        assert_eq!(coord, HexCoord::new(0, 4));
        assert_eq!(coord.name(), "A4");
        assert_eq!(HexCoord::from_name("Q2").unwrap().name(), "Q2");
        assert!(HexCoord::from_name("4A").is_none());
    }

    #[test]
    fn test_neighbors_invert() {
        let coord = HexCoord::new(5, 9);
        for edge in 0..6 {
            let neighbor = coord.neighbor(edge);
            assert_eq!(neighbor.neighbor(HexCoord::opposite(edge)), coord);
        }
    }

    #[test]
    fn test_rotation_of_paths() {
        let tile = two_slot_city();
        let mut hex = HexState::preprinted(tile);
        hex.rotation = 2;

        let paths: Vec<_> = hex.absolute_paths().collect();
        assert!(paths.contains(&(PathEnd::Edge(2), PathEnd::Node(0))));
        assert!(paths.contains(&(PathEnd::Edge(5), PathEnd::Node(0))));
        assert!(hex.connects_edge(2));
        assert!(!hex.connects_edge(0));
    }

    #[test]
    fn test_token_capacity() {
        let mut board = Board::new(vec![HexState::preprinted(two_slot_city())]);
        let hex = HexId::new(0);

        board.place_token(hex, 0, CorporationId::new(0)).unwrap();
        board.place_token(hex, 0, CorporationId::new(1)).unwrap();
        let err = board.place_token(hex, 0, CorporationId::new(2));
        assert!(matches!(err, Err(EngineError::RuleViolation { .. })));
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut board = Board::new(vec![HexState::preprinted(two_slot_city())]);
        let hex = HexId::new(0);

        board.place_token(hex, 0, CorporationId::new(0)).unwrap();
        let err = board.place_token(hex, 0, CorporationId::new(0));
        assert!(matches!(err, Err(EngineError::RuleViolation { .. })));
    }

    #[test]
    fn test_lay_preserves_tokens_and_reports_replacement() {
        let blank = Tile::from_code("blank", TileColor::White, "city=revenue:0").unwrap();
        let mut board = Board::new(vec![HexState::preprinted(blank)]);
        let hex = HexId::new(0);

        board.place_token(hex, 0, CorporationId::new(0)).unwrap();

        // First lay covers the preprinted tile: nothing returns to the pool.
        let yellow = Tile::from_code(
            "57",
            TileColor::Yellow,
            "city=revenue:20;path=a:0,b:_0;path=a:3,b:_0",
        )
        .unwrap();
        assert_eq!(board.lay(hex, yellow, 0), None);
        assert!(board.hex(hex).has_token(CorporationId::new(0)));

        // Upgrading returns the replaced manifest tile.
        assert_eq!(board.lay(hex, two_slot_city(), 0), Some("57".to_string()));
        assert!(board.hex(hex).has_token(CorporationId::new(0)));
        assert_eq!(
            board.hex(hex).tile.node(0),
            Some(&Part::City {
                revenue: Revenue::Flat(50),
                slots: 2
            })
        );
    }
}
