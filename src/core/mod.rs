//! Core types: entity IDs, actions, the action log, RNG, and errors.

pub mod action;
pub mod entity;
pub mod error;
pub mod log;
pub mod rng;

pub use action::{Action, ActionKind, DividendKind};
pub use entity::{AbilityOwner, Actor, CompanyId, CorporationId, HexId, PlayerId, TrainId};
pub use error::EngineError;
pub use log::{ActionLog, ActionLogEntry, LogEvent, PricePoint, RoundKind, RoundLabel};
pub use rng::{GameRng, GameRngState};
