//! Hex map: coordinates, tiles, parts, and the tile-code mini-language.

pub mod code;
pub mod hex;
pub mod part;
pub mod tile;

pub use code::TileCodeError;
pub use hex::{Board, HexCoord, HexState};
pub use part::{Part, PathEnd, Revenue, Terrain, TileColor};
pub use tile::{Tile, TileManifest, TilePool, TileSupply};
