//! Trains, distance classes, and the depot.

pub mod depot;
pub mod train;

pub use depot::Depot;
pub use train::{Distance, TrainType, TrainUnit};
