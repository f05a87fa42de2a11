//! Tile definitions, the manifest, and the shared tile pool.
//!
//! The manifest is the immutable catalog (name, color, parsed code, supply
//! count); the pool is the mutable per-game remaining-supply state. Placing
//! a tile consumes one unit from the pool; an upgrade returns the replaced
//! tile for later reuse.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::EngineError;

use super::code::{self, TileCodeError};
use super::part::{Part, PathEnd, Terrain, TileColor};

/// How many copies of a tile exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileSupply {
    /// Finite supply.
    Limited(u32),
    /// Never runs out.
    Unlimited,
}

/// An immutable tile definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Manifest name ("57", "X10").
    pub name: String,
    /// Color band, gating which phases may lay it.
    pub color: TileColor,
    /// Parsed parts.
    pub parts: Vec<Part>,
}

impl Tile {
    /// Parse a tile from its code string.
    pub fn from_code(
        name: impl Into<String>,
        color: TileColor,
        code: &str,
    ) -> Result<Self, TileCodeError> {
        Ok(Self {
            name: name.into(),
            color,
            parts: code::parse(code)?,
        })
    }

    /// Re-encode the tile's parts to canonical code form.
    #[must_use]
    pub fn code(&self) -> String {
        code::encode(&self.parts)
    }

    /// Revenue-center nodes in `_K` index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_node())
    }

    /// Number of revenue-center nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// The node at `_K`, if present.
    #[must_use]
    pub fn node(&self, index: u8) -> Option<&Part> {
        self.nodes().nth(index as usize)
    }

    /// City parts with their node indices.
    pub fn cities(&self) -> impl Iterator<Item = (u8, &Part)> {
        self.nodes()
            .enumerate()
            .filter(|(_, p)| matches!(p, Part::City { .. }))
            .map(|(i, p)| (i as u8, p))
    }

    /// Path segments.
    pub fn paths(&self) -> impl Iterator<Item = (PathEnd, PathEnd)> + '_ {
        self.parts.iter().filter_map(|p| match p {
            Part::Path { a, b } => Some((*a, *b)),
            _ => None,
        })
    }

    /// The tile's label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            Part::Label(l) => Some(l.as_str()),
            _ => None,
        })
    }

    /// Terrain cost to build over this tile's hex.
    #[must_use]
    pub fn upgrade_cost(&self) -> i64 {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Upgrade { cost, .. } => *cost,
                _ => 0,
            })
            .sum()
    }

    /// Terrain types in the upgrade cost, if any.
    #[must_use]
    pub fn terrain(&self) -> Vec<Terrain> {
        self.parts
            .iter()
            .flat_map(|p| match p {
                Part::Upgrade { terrain, .. } => terrain.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Edges touched by at least one path.
    #[must_use]
    pub fn edges(&self) -> Vec<u8> {
        let mut edges: Vec<u8> = self
            .paths()
            .flat_map(|(a, b)| [a, b])
            .filter_map(|end| match end {
                PathEnd::Edge(e) => Some(e),
                PathEnd::Node(_) => None,
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

/// The immutable tile catalog for a game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileManifest {
    tiles: Vec<Tile>,
    supply: Vec<TileSupply>,
    index: FxHashMap<String, usize>,
}

impl TileManifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile with its supply count.
    ///
    /// # Panics
    /// Panics on duplicate tile names: that is a configuration bug.
    pub fn add(&mut self, tile: Tile, supply: TileSupply) {
        assert!(
            !self.index.contains_key(&tile.name),
            "duplicate tile {:?} in manifest",
            tile.name
        );
        self.index.insert(tile.name.clone(), self.tiles.len());
        self.tiles.push(tile);
        self.supply.push(supply);
    }

    /// Look up a tile by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tile> {
        self.index.get(name).map(|&i| &self.tiles[i])
    }

    /// Initial supply for a tile.
    #[must_use]
    pub fn supply(&self, name: &str) -> Option<TileSupply> {
        self.index.get(name).map(|&i| self.supply[i])
    }

    /// Iterate all tiles.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Build the initial pool state from the manifest.
    #[must_use]
    pub fn initial_pool(&self) -> TilePool {
        TilePool {
            remaining: self
                .tiles
                .iter()
                .zip(&self.supply)
                .map(|(t, s)| (t.name.clone(), *s))
                .collect(),
        }
    }
}

/// Mutable remaining-supply state of the shared tile pool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TilePool {
    remaining: FxHashMap<String, TileSupply>,
}

impl TilePool {
    /// Units remaining for a tile. `None` if the tile is not in the pool.
    #[must_use]
    pub fn remaining(&self, name: &str) -> Option<TileSupply> {
        self.remaining.get(name).copied()
    }

    /// Consume one unit of a tile's supply.
    ///
    /// Returns `InvalidTilePlacement` if the tile is unknown or exhausted.
    pub fn consume(&mut self, name: &str) -> Result<(), EngineError> {
        match self.remaining.get_mut(name) {
            None => Err(EngineError::placement(format!("tile {name:?} not in manifest"))),
            Some(TileSupply::Unlimited) => Ok(()),
            Some(TileSupply::Limited(0)) => {
                Err(EngineError::placement(format!("tile {name:?} supply exhausted")))
            }
            Some(TileSupply::Limited(n)) => {
                *n -= 1;
                Ok(())
            }
        }
    }

    /// Return a previously consumed unit (a replaced upgrade tile).
    ///
    /// # Panics
    /// Panics if the tile was never in the pool: the pool cannot hold more
    /// units than the manifest issued, so this indicates an engine bug.
    pub fn release(&mut self, name: &str) {
        match self.remaining.get_mut(name) {
            None => panic!("released tile {name:?} that is not in the manifest"),
            Some(TileSupply::Unlimited) => {}
            Some(TileSupply::Limited(n)) => *n += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::part::Revenue;

    fn city_tile() -> Tile {
        Tile::from_code(
            "57",
            TileColor::Yellow,
            "city=revenue:20;path=a:0,b:_0;path=a:3,b:_0",
        )
        .unwrap()
    }

    #[test]
    fn test_tile_accessors() {
        let tile = city_tile();
        assert_eq!(tile.node_count(), 1);
        assert_eq!(tile.cities().count(), 1);
        assert_eq!(tile.edges(), vec![0, 3]);
        assert_eq!(tile.label(), None);
        assert_eq!(tile.upgrade_cost(), 0);
        assert_eq!(
            tile.node(0),
            Some(&Part::City {
                revenue: Revenue::Flat(20),
                slots: 1
            })
        );
    }

    #[test]
    fn test_code_round_trip_through_tile() {
        let tile = city_tile();
        let reparsed = Tile::from_code("57", TileColor::Yellow, &tile.code()).unwrap();
        assert_eq!(tile, reparsed);
    }

    #[test]
    fn test_pool_consume_limited() {
        let mut manifest = TileManifest::new();
        manifest.add(city_tile(), TileSupply::Limited(2));
        let mut pool = manifest.initial_pool();

        assert!(pool.consume("57").is_ok());
        assert!(pool.consume("57").is_ok());
        assert!(matches!(
            pool.consume("57"),
            Err(EngineError::InvalidTilePlacement { .. })
        ));

        pool.release("57");
        assert!(pool.consume("57").is_ok());
    }

    #[test]
    fn test_pool_unlimited() {
        let mut manifest = TileManifest::new();
        manifest.add(city_tile(), TileSupply::Unlimited);
        let mut pool = manifest.initial_pool();

        for _ in 0..100 {
            assert!(pool.consume("57").is_ok());
        }
    }

    #[test]
    fn test_pool_unknown_tile() {
        let manifest = TileManifest::new();
        let mut pool = manifest.initial_pool();
        assert!(matches!(
            pool.consume("999"),
            Err(EngineError::InvalidTilePlacement { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "not in the manifest")]
    fn test_pool_release_unknown_panics() {
        let manifest = TileManifest::new();
        let mut pool = manifest.initial_pool();
        pool.release("999");
    }

    #[test]
    #[should_panic(expected = "duplicate tile")]
    fn test_manifest_duplicate_panics() {
        let mut manifest = TileManifest::new();
        manifest.add(city_tile(), TileSupply::Limited(1));
        manifest.add(city_tile(), TileSupply::Limited(1));
    }
}
