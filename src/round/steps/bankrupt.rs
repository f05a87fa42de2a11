//! Bankruptcy declaration.
//!
//! Offered only when the acting corporation has no train and no way to fund
//! one: the cheapest train for sale exceeds its treasury plus the
//! president's cash plus its remaining loan headroom. Processing ends the
//! game.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::GameState;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The bankruptcy check at the head of the operating pipeline.
pub struct BankruptStep;

impl Step for BankruptStep {
    fn name(&self) -> &'static str {
        "bankrupt"
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
        let corp = state.corporation(corporation);
        if !corp.trains.is_empty() {
            return vec![];
        }

        let Some(cheapest) = state
            .depot
            .buyable()
            .iter()
            .map(|&t| state.depot.unit(t).price)
            .min()
        else {
            return vec![];
        };

        let president_cash = corp
            .president
            .map_or(0, |p| state.player(p).cash);
        let loan_headroom = ctx.def.rules.loan_amount
            * i64::from(ctx.def.rules.loan_limit.saturating_sub(corp.loans));

        if cheapest > corp.treasury + president_cash + loan_headroom {
            vec![ActionKind::Bankrupt]
        } else {
            vec![]
        }
    }

    fn process(
        &self,
        _ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        let Action::Bankrupt = action else {
            return Err(illegal(action.kind(), actor, self.name()));
        };
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name()))?;
        let player = state
            .corporation(corporation)
            .president
            .ok_or_else(|| EngineError::rule("corporation has no president"))?;

        state.game_over = true;
        tracing::info!(player = %player, "bankruptcy declared, game over");
        Ok(vec![LogEvent::Bankrupted { player }])
    }
}
