//! Property tests for stock-market marker movement.

use proptest::prelude::*;

use hexrail::games::simple::definition;
use hexrail::market::{MarketPos, MoveDirection};

fn direction(tag: u8) -> MoveDirection {
    match tag % 4 {
        0 => MoveDirection::Left,
        1 => MoveDirection::Right,
        2 => MoveDirection::Up,
        _ => MoveDirection::Down,
    }
}

proptest! {
    /// Any sequence of moves keeps the marker on a real cell.
    #[test]
    fn marker_never_leaves_the_grid(
        start_row in 0u8..5,
        start_col in 0u8..7,
        moves in prop::collection::vec((0u8..4, 1u8..3), 0..50),
    ) {
        let market = definition().market;
        let mut pos = MarketPos::new(start_row, start_col);
        prop_assume!(market.cell(pos).is_some());

        for (tag, steps) in moves {
            pos = market.move_marker(pos, direction(tag), steps);
            prop_assert!(market.cell(pos).is_some());
            prop_assert!(market.price(pos) > 0);
        }
    }

    /// A single-step move is undone by its opposite unless it clamped.
    #[test]
    fn opposite_moves_invert(
        start_row in 0u8..5,
        start_col in 0u8..7,
        tag in 0u8..4,
    ) {
        let market = definition().market;
        let start = MarketPos::new(start_row, start_col);
        prop_assume!(market.cell(start).is_some());

        let dir = direction(tag);
        let opposite = match dir {
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
        };

        let moved = market.move_marker(start, dir, 1);
        if moved != start {
            prop_assert_eq!(market.move_marker(moved, opposite, 1), start);
        }
    }
}
