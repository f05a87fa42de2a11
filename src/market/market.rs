//! The stock-market price ladder.
//!
//! A grid of price cells; each corporation's marker occupies exactly one
//! cell. Movement is a relative step (left/right/up/down) repeated `steps`
//! times, clamping at the grid boundary and at gaps. Cell rows are defined
//! by compact code strings, one cell per entry: a price with optional
//! suffixes (`p` = par cell, `c` = closed, `y` = no-cert-limit zone).
//!
//! Every move reports the position and price before and after, so games
//! with price-protection rules can compare historical prices from the log.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PricePoint;

/// Relative movement direction on the grid.
///
/// Up raises price (row decreases), left lowers it (column decreases).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Toward lower prices in the same row.
    Left,
    /// Toward higher prices in the same row.
    Right,
    /// Toward higher rows (price rises).
    Up,
    /// Toward lower rows (price falls).
    Down,
}

/// One cell of the price grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketCell {
    /// Share price at this cell.
    pub price: i64,
    /// Corporations may be started (parred) here.
    pub par: bool,
    /// Terminal cell: a corporation here is closed and cannot operate.
    pub closed: bool,
    /// Shares here do not count against certificate limits.
    pub no_cert_limit: bool,
}

/// Error parsing a market cell code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("bad market cell {0:?}")]
pub struct MarketCellError(pub String);

impl MarketCell {
    /// Parse a cell code like `"100p"`, `"40c"`, `"68"`.
    pub fn from_code(code: &str) -> Result<Self, MarketCellError> {
        let digits: String = code.chars().take_while(char::is_ascii_digit).collect();
        let suffix = &code[digits.len()..];
        let price: i64 = digits
            .parse()
            .map_err(|_| MarketCellError(code.to_string()))?;

        let mut cell = Self {
            price,
            par: false,
            closed: false,
            no_cert_limit: false,
        };
        for flag in suffix.chars() {
            match flag {
                'p' => cell.par = true,
                'c' => cell.closed = true,
                'y' => cell.no_cert_limit = true,
                _ => return Err(MarketCellError(code.to_string())),
            }
        }
        Ok(cell)
    }
}

/// A marker position on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketPos {
    /// Grid row, 0 at the top (highest prices).
    pub row: u8,
    /// Grid column.
    pub col: u8,
}

impl MarketPos {
    /// Create a position.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// The immutable price grid.
///
/// Rows may be ragged and contain gaps (`None`); markers never move into a
/// gap — movement clamps at the last valid cell.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StockMarket {
    grid: Vec<Vec<Option<MarketCell>>>,
}

impl StockMarket {
    /// Build a market from rows of cell codes. Empty strings are gaps.
    pub fn from_rows(rows: &[&[&str]]) -> Result<Self, MarketCellError> {
        let grid = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|code| {
                        if code.is_empty() {
                            Ok(None)
                        } else {
                            MarketCell::from_code(code).map(Some)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { grid })
    }

    /// The cell at a position, if inside the grid and not a gap.
    #[must_use]
    pub fn cell(&self, pos: MarketPos) -> Option<&MarketCell> {
        self.grid
            .get(pos.row as usize)?
            .get(pos.col as usize)?
            .as_ref()
    }

    /// The price at a position.
    ///
    /// # Panics
    /// Panics if the position is a gap or out of bounds: markers are only
    /// ever placed on valid cells, so this indicates an engine bug.
    #[must_use]
    pub fn price(&self, pos: MarketPos) -> i64 {
        self.cell(pos)
            .unwrap_or_else(|| panic!("marker off the grid at {pos:?}"))
            .price
    }

    /// The price point (position + price) at a position.
    #[must_use]
    pub fn price_point(&self, pos: MarketPos) -> PricePoint {
        PricePoint {
            row: pos.row,
            col: pos.col,
            price: self.price(pos),
        }
    }

    /// All par cells, for validating `Par` actions.
    #[must_use]
    pub fn par_positions(&self) -> Vec<MarketPos> {
        let mut out = Vec::new();
        for (r, row) in self.grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.as_ref().is_some_and(|cell| cell.par) {
                    out.push(MarketPos::new(r as u8, c as u8));
                }
            }
        }
        out
    }

    /// Find the par cell with a given price.
    #[must_use]
    pub fn par_position_at(&self, price: i64) -> Option<MarketPos> {
        self.par_positions()
            .into_iter()
            .find(|&pos| self.price(pos) == price)
    }

    /// True if the corporation at this position is closed out.
    #[must_use]
    pub fn is_closed(&self, pos: MarketPos) -> bool {
        self.cell(pos).is_some_and(|cell| cell.closed)
    }

    /// Move a marker `steps` cells in a direction, clamping at boundaries
    /// and gaps. Returns the final position (which may equal the start).
    #[must_use]
    pub fn move_marker(&self, from: MarketPos, direction: MoveDirection, steps: u8) -> MarketPos {
        let mut pos = from;
        for _ in 0..steps {
            let next = match direction {
                MoveDirection::Left => {
                    if pos.col == 0 {
                        break;
                    }
                    MarketPos::new(pos.row, pos.col - 1)
                }
                MoveDirection::Right => MarketPos::new(pos.row, pos.col + 1),
                MoveDirection::Up => {
                    if pos.row == 0 {
                        break;
                    }
                    MarketPos::new(pos.row - 1, pos.col)
                }
                MoveDirection::Down => MarketPos::new(pos.row + 1, pos.col),
            };
            if self.cell(next).is_none() {
                break;
            }
            pos = next;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> StockMarket {
        StockMarket::from_rows(&[
            &["90", "100p", "110", "125"],
            &["80", "90p", "100", "110"],
            &["70", "80", "90", "100"],
            &["60y", "70", "80", ""],
            &["40c", "60", "", ""],
        ])
        .unwrap()
    }

    #[test]
    fn test_cell_codes() {
        let par = MarketCell::from_code("100p").unwrap();
        assert!(par.par && !par.closed);
        assert_eq!(par.price, 100);

        let closed = MarketCell::from_code("40c").unwrap();
        assert!(closed.closed);

        let yellow = MarketCell::from_code("60y").unwrap();
        assert!(yellow.no_cert_limit);

        assert!(MarketCell::from_code("abc").is_err());
        assert!(MarketCell::from_code("60x").is_err());
    }

    #[test]
    fn test_par_positions() {
        let market = market();
        let pars = market.par_positions();
        assert_eq!(
            pars,
            vec![MarketPos::new(0, 1), MarketPos::new(1, 1)]
        );
        assert_eq!(market.par_position_at(90), Some(MarketPos::new(1, 1)));
        assert_eq!(market.par_position_at(95), None);
    }

    #[test]
    fn test_moves_and_clamping() {
        let market = market();
        let start = MarketPos::new(1, 1);

        assert_eq!(
            market.move_marker(start, MoveDirection::Left, 1),
            MarketPos::new(1, 0)
        );
        // Clamps at the left edge no matter how many steps remain.
        assert_eq!(
            market.move_marker(start, MoveDirection::Left, 10),
            MarketPos::new(1, 0)
        );
        assert_eq!(
            market.move_marker(start, MoveDirection::Up, 5),
            MarketPos::new(0, 1)
        );
        assert_eq!(
            market.move_marker(start, MoveDirection::Down, 2),
            MarketPos::new(3, 1)
        );
    }

    #[test]
    fn test_move_stops_at_gap() {
        let market = market();
        // Row 3 ends after column 2; movement right clamps there.
        let pos = market.move_marker(MarketPos::new(3, 1), MoveDirection::Right, 5);
        assert_eq!(pos, MarketPos::new(3, 2));
        // Row 4 has a gap at column 2.
        let pos = market.move_marker(MarketPos::new(4, 0), MoveDirection::Right, 5);
        assert_eq!(pos, MarketPos::new(4, 1));
    }

    #[test]
    fn test_closed_cell() {
        let market = market();
        assert!(market.is_closed(MarketPos::new(4, 0)));
        assert!(!market.is_closed(MarketPos::new(0, 0)));
    }

    #[test]
    fn test_price_point() {
        let market = market();
        let pp = market.price_point(MarketPos::new(2, 3));
        assert_eq!((pp.row, pp.col, pp.price), (2, 3, 100));
    }
}
