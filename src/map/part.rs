//! Tile parts: the pieces a tile's code string describes.
//!
//! A tile is a bag of parts. Revenue centers (cities, towns, offboards,
//! halts, junctions) are numbered in order of appearance and referenced from
//! paths as internal nodes (`_0`, `_1`, ...). Paths connect hex edges
//! (0..6) to each other or to internal nodes.

use serde::{Deserialize, Serialize};

/// Tile (and phase) color band, ordered by game progression.
///
/// White is unbuilt map terrain; red and blue are fixed offboard/water hexes
/// that never receive tile lays.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TileColor {
    /// Unbuilt map hex.
    White,
    /// First-level track.
    Yellow,
    /// Second-level track.
    Green,
    /// Third-level track.
    Brown,
    /// Final-level track.
    Gray,
    /// Fixed offboard hex.
    Red,
    /// Impassable water hex.
    Blue,
}

impl TileColor {
    /// Canonical lowercase name, as used in tile codes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TileColor::White => "white",
            TileColor::Yellow => "yellow",
            TileColor::Green => "green",
            TileColor::Brown => "brown",
            TileColor::Gray => "gray",
            TileColor::Red => "red",
            TileColor::Blue => "blue",
        }
    }

    /// Parse a canonical color name.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "white" => TileColor::White,
            "yellow" => TileColor::Yellow,
            "green" => TileColor::Green,
            "brown" => TileColor::Brown,
            "gray" => TileColor::Gray,
            "red" => TileColor::Red,
            "blue" => TileColor::Blue,
            _ => return None,
        })
    }
}

/// Revenue of a center: a flat value, or one value per phase color.
///
/// Offboards typically scale with the phase (`yellow_20|green_30|...`);
/// plain `20|30|40|50` lists are positional over yellow/green/brown/gray.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revenue {
    /// Same revenue in every phase.
    Flat(i64),
    /// Revenue keyed by phase color; the entry with the highest color not
    /// beyond the current phase applies.
    ByColor(Vec<(TileColor, i64)>),
}

impl Revenue {
    /// The revenue paid in a phase of the given color.
    #[must_use]
    pub fn at(&self, phase_color: TileColor) -> i64 {
        match self {
            Revenue::Flat(v) => *v,
            Revenue::ByColor(entries) => entries
                .iter()
                .filter(|(color, _)| *color <= phase_color)
                .max_by_key(|(color, _)| *color)
                .or_else(|| entries.first())
                .map_or(0, |(_, v)| *v),
        }
    }
}

/// Terrain type carried by an upgrade cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    /// Mountain crossing.
    Mountain,
    /// River/water crossing.
    Water,
    /// Lake crossing.
    Lake,
    /// Swamp crossing.
    Swamp,
}

impl Terrain {
    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Mountain => "mountain",
            Terrain::Water => "water",
            Terrain::Lake => "lake",
            Terrain::Swamp => "swamp",
        }
    }

    /// Parse a canonical terrain name.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "mountain" => Terrain::Mountain,
            "water" => Terrain::Water,
            "lake" => Terrain::Lake,
            "swamp" => Terrain::Swamp,
            _ => return None,
        })
    }
}

/// One endpoint of a path: a hex edge or an internal revenue-center node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathEnd {
    /// Hex edge, 0..6.
    Edge(u8),
    /// Internal node `_K`: the K-th revenue center on the tile.
    Node(u8),
}

/// A single part of a tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Part {
    /// A city with token slots.
    City {
        /// Revenue per visit.
        revenue: Revenue,
        /// Token slot capacity.
        slots: u8,
    },
    /// A town: a small revenue center without token slots.
    Town {
        /// Revenue per visit.
        revenue: Revenue,
    },
    /// A non-stop waypoint: adds bypass revenue without consuming a stop.
    Halt {
        /// Bypass revenue added when a route passes through.
        revenue: i64,
    },
    /// An offboard revenue area; routes terminate here.
    Offboard {
        /// Phase-scaled revenue.
        revenue: Revenue,
    },
    /// A plain track junction, connecting paths without revenue.
    Junction,
    /// A track segment between two endpoints.
    Path {
        /// First endpoint.
        a: PathEnd,
        /// Second endpoint.
        b: PathEnd,
    },
    /// Tile label restricting upgrades ("NY", "B").
    Label(String),
    /// Decorative/marker icon.
    Icon {
        /// Image path ("18_usa/mine").
        image: String,
    },
    /// Terrain cost paid when laying over this hex.
    Upgrade {
        /// Cost in cash.
        cost: i64,
        /// Terrain types crossed.
        terrain: Vec<Terrain>,
    },
}

impl Part {
    /// True if this part is a revenue center (occupies a node index).
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            Part::City { .. }
                | Part::Town { .. }
                | Part::Halt { .. }
                | Part::Offboard { .. }
                | Part::Junction
        )
    }

    /// True if a route may stop here for revenue.
    #[must_use]
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            Part::City { .. } | Part::Town { .. } | Part::Offboard { .. }
        )
    }

    /// Revenue paid when a route stops at (or passes, for halts) this part.
    #[must_use]
    pub fn revenue_at(&self, phase_color: TileColor) -> i64 {
        match self {
            Part::City { revenue, .. } | Part::Town { revenue } | Part::Offboard { revenue } => {
                revenue.at(phase_color)
            }
            Part::Halt { revenue } => *revenue,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_ordering() {
        assert!(TileColor::Yellow < TileColor::Green);
        assert!(TileColor::Green < TileColor::Brown);
        assert!(TileColor::Brown < TileColor::Gray);
    }

    #[test]
    fn test_flat_revenue_ignores_phase() {
        let r = Revenue::Flat(30);
        assert_eq!(r.at(TileColor::Yellow), 30);
        assert_eq!(r.at(TileColor::Gray), 30);
    }

    #[test]
    fn test_by_color_revenue_scales() {
        let r = Revenue::ByColor(vec![
            (TileColor::Yellow, 20),
            (TileColor::Green, 30),
            (TileColor::Brown, 40),
            (TileColor::Gray, 50),
        ]);
        assert_eq!(r.at(TileColor::Yellow), 20);
        assert_eq!(r.at(TileColor::Green), 30);
        assert_eq!(r.at(TileColor::Gray), 50);
    }

    #[test]
    fn test_by_color_before_first_entry() {
        // A brown-only entry still pays its value in earlier phases rather
        // than zeroing out the stop.
        let r = Revenue::ByColor(vec![(TileColor::Brown, 50)]);
        assert_eq!(r.at(TileColor::Yellow), 50);
        assert_eq!(r.at(TileColor::Brown), 50);
    }

    #[test]
    fn test_part_classification() {
        let city = Part::City {
            revenue: Revenue::Flat(30),
            slots: 2,
        };
        let halt = Part::Halt { revenue: 10 };
        let path = Part::Path {
            a: PathEnd::Edge(0),
            b: PathEnd::Node(0),
        };

        assert!(city.is_node());
        assert!(city.is_stop());
        assert!(halt.is_node());
        assert!(!halt.is_stop());
        assert!(!path.is_node());
        assert_eq!(city.revenue_at(TileColor::Yellow), 30);
        assert_eq!(halt.revenue_at(TileColor::Yellow), 10);
    }
}
