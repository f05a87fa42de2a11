//! Route finding: the track graph and the revenue maximizer.

pub mod finder;
pub mod graph;

pub use finder::{Route, RouteFinder};
pub use graph::{reachable_hexes, Connection, NodeRef, SegmentId, TrackGraph};
