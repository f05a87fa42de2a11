//! Rounds, steps, and turn order.

pub mod round;
pub mod step;
pub mod steps;

pub use round::RoundManager;
pub use step::{Step, StepContext};
