//! Stock-market grid and movement rules.

pub mod market;

pub use market::{MarketCell, MarketCellError, MarketPos, MoveDirection, StockMarket};
