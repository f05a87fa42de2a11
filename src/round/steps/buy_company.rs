//! Buying private companies into a corporation.
//!
//! A corporation may buy a player-held company at any price between half and
//! twice its face value; the company's abilities come with it. The step is
//! instantiated twice in some pipelines: a mid-turn window and a trailing
//! `blocks` window that keeps the turn open until resolved or passed.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::{CompanyOwner, GameState};
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// Private-company purchase window.
pub struct BuyCompanyStep {
    name: &'static str,
    blocking: bool,
}

impl BuyCompanyStep {
    /// A mid-turn, non-blocking purchase window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "buy_company",
            blocking: false,
        }
    }

    /// The trailing window: blocks the end of the turn until passed.
    #[must_use]
    pub fn trailing() -> Self {
        Self {
            name: "buy_company_window",
            blocking: true,
        }
    }
}

impl Default for BuyCompanyStep {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for BuyCompanyStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn blocks(&self) -> bool {
        self.blocking
    }

    fn available(
        &self,
        _ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind> {
        let Some(corporation) = acting_corporation(state, actor) else {
            return vec![];
        };
        if state.turn.has_passed(self.name) {
            return vec![];
        }
        let any_for_sale = state
            .companies
            .iter()
            .any(|c| !c.closed && matches!(c.owner, CompanyOwner::Player(_)));
        if !any_for_sale || state.corporation(corporation).treasury <= 0 {
            return vec![];
        }
        vec![ActionKind::BuyCompany, ActionKind::Pass]
    }

    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name))?;

        match action {
            Action::BuyCompany { company, price } => {
                if company.index() >= state.companies.len() {
                    return Err(EngineError::rule(format!("{company} does not exist")));
                }
                let company_state = state.company(*company);
                if company_state.closed {
                    return Err(EngineError::rule(format!("{company} is closed")));
                }
                let CompanyOwner::Player(seller) = company_state.owner else {
                    return Err(EngineError::rule(format!(
                        "{company} is not held by a player"
                    )));
                };

                let value = ctx.def.companies[company.index()].value;
                if *price < value / 2 || *price > value * 2 {
                    return Err(EngineError::rule(format!(
                        "price {price} outside half to double of value {value}"
                    )));
                }
                let treasury = state.corporation(corporation).treasury;
                if treasury < *price {
                    return Err(EngineError::InsufficientFunds {
                        actor,
                        available: treasury,
                        required: *price,
                    });
                }

                state.corporation_mut(corporation).treasury -= price;
                state.player_mut(seller).cash += price;
                state.company_mut(*company).owner = CompanyOwner::Corporation(corporation);
                state.corporation_mut(corporation).companies.push(*company);

                Ok(vec![
                    LogEvent::CompanyBought {
                        company: *company,
                        buyer: corporation,
                        price: *price,
                    },
                    LogEvent::CashChange {
                        actor: Actor::Corporation(corporation),
                        amount: -price,
                    },
                    LogEvent::CashChange {
                        actor: Actor::Player(seller),
                        amount: *price,
                    },
                ])
            }
            Action::Pass => {
                state.turn.pass(self.name);
                Ok(vec![])
            }
            _ => Err(illegal(action.kind(), actor, self.name)),
        }
    }
}
