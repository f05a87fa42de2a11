//! Bank loans.
//!
//! A corporation may take loans up to the rule set's limit; each loan pays
//! the principal into the treasury and drops the share price two cells left.
//! The log entry carries the price before and after the drop.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::GameState;
use crate::market::MoveDirection;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The loan window of the operating turn.
pub struct TakeLoanStep;

impl Step for TakeLoanStep {
    fn name(&self) -> &'static str {
        "take_loan"
    }

    fn available(
        &self,
        ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind> {
        let Some(corporation) = acting_corporation(state, actor) else {
            return vec![];
        };
        if ctx.def.rules.loan_amount == 0 || state.turn.has_passed(self.name()) {
            return vec![];
        }
        if state.corporation(corporation).loans >= ctx.def.rules.loan_limit {
            return vec![];
        }
        vec![ActionKind::TakeLoan, ActionKind::Pass]
    }

    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name()))?;

        match action {
            Action::TakeLoan => {
                let amount = ctx.def.rules.loan_amount;
                let corp = state.corporation_mut(corporation);
                if corp.loans >= ctx.def.rules.loan_limit {
                    return Err(EngineError::rule("loan limit exceeded"));
                }
                corp.loans += 1;
                corp.treasury += amount;
                state.bank -= amount;

                let mut events = vec![
                    LogEvent::LoanTaken {
                        corporation,
                        amount,
                    },
                    LogEvent::CashChange {
                        actor: Actor::Corporation(corporation),
                        amount,
                    },
                ];
                events.extend(state.move_price(
                    ctx.def,
                    corporation,
                    MoveDirection::Left,
                    2,
                ));
                tracing::debug!(corporation = %corporation, amount, "loan taken");
                Ok(events)
            }
            Action::Pass => {
                state.turn.pass(self.name());
                Ok(vec![])
            }
            _ => Err(illegal(action.kind(), actor, self.name())),
        }
    }
}
