//! Concrete round steps.

pub mod bankrupt;
pub mod buy_company;
pub mod buy_sell_par;
pub mod buy_train;
pub mod discard_train;
pub mod dividend;
pub mod route_run;
pub mod take_loan;
pub mod token;
pub mod track;

pub use bankrupt::BankruptStep;
pub use buy_company::BuyCompanyStep;
pub use buy_sell_par::BuySellParSharesStep;
pub use buy_train::BuyTrainStep;
pub use discard_train::DiscardTrainStep;
pub use dividend::DividendStep;
pub use route_run::RouteStep;
pub use take_loan::TakeLoanStep;
pub use token::TokenStep;
pub use track::TrackStep;

use crate::core::{Actor, CorporationId};
use crate::game::GameState;

/// The corporation acting in the current operating turn, if `actor` is it.
pub(crate) fn acting_corporation(state: &GameState, actor: Actor) -> Option<CorporationId> {
    actor
        .corporation()
        .filter(|&c| state.turn.corporation == Some(c))
}
