//! A deterministic rules engine for 18xx-family railroad games.
//!
//! The engine separates an immutable [`game::GameDefinition`] (map, tiles,
//! trains, phases, market, templates) from the evolving [`game::GameState`],
//! and drives play through rounds of pluggable steps. Every accepted action
//! appends one entry to an ordered log; replaying the log against the same
//! definition and seed reproduces the final state byte for byte.
//!
//! Title-specific rules plug in through the [`game::Variant`] trait: revenue
//! hooks, setup randomization, phase events, and the step pipelines
//! themselves. A small complete title lives in [`games::simple`].
//!
//! ```
//! use hexrail::game::Game;
//! use hexrail::games::simple;
//!
//! let game = Game::new(simple::definition(), Box::new(simple::SimpleVariant), 7);
//! assert!(!game.game_over());
//! ```

pub mod ability;
pub mod core;
pub mod game;
pub mod games;
pub mod map;
pub mod market;
pub mod phase;
pub mod round;
pub mod route;
pub mod train;

pub use crate::core::{Action, ActionKind, Actor, EngineError};
pub use crate::game::{Game, GameDefinition, GameState, Variant};
