//! Game assembly: definition, state, variant hooks, and the engine facade.

pub mod definition;
pub mod engine;
pub mod state;
pub mod variant;

pub use definition::{
    CompanyTemplate, CorporationTemplate, GameDefinition, MapHex, RuleOptions,
};
pub use engine::Game;
pub use state::{
    CompanyOwner, CompanyState, CorporationState, GameState, PlayerState, TurnState,
};
pub use variant::{hex_bonus_total, route_bonus_total, Variant};
