//! Dividend distribution.
//!
//! After a revenue run the president chooses to pay out or withhold. A
//! payout sends each player their share of the total from the bank and moves
//! the price one cell right; a withhold (or a zero run) banks the total in
//! the treasury and moves the price one cell left.

use crate::core::{Action, ActionKind, Actor, DividendKind, EngineError, LogEvent, PlayerId};
use crate::game::GameState;
use crate::market::MoveDirection;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The dividend step of the operating turn.
pub struct DividendStep;

impl Step for DividendStep {
    fn name(&self) -> &'static str {
        "dividend"
    }

    fn available(
        &self,
        _ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind> {
        if acting_corporation(state, actor).is_none() {
            return vec![];
        }
        if state.turn.revenue.is_none() || state.turn.dividended {
            return vec![];
        }
        vec![ActionKind::Dividend]
    }

    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        let Action::Dividend { kind } = action else {
            return Err(illegal(action.kind(), actor, self.name()));
        };
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name()))?;
        let Some((total, _)) = state.turn.revenue else {
            return Err(illegal(action.kind(), actor, self.name()));
        };

        let mut events = Vec::new();
        let payout = *kind == DividendKind::Payout && total > 0;
        if payout {
            for i in 0..state.players.len() {
                let player = PlayerId::new(i as u8);
                let percent = i64::from(state.player(player).percent(corporation));
                let amount = total * percent / 100;
                if amount > 0 {
                    state.player_mut(player).cash += amount;
                    state.bank -= amount;
                    events.push(LogEvent::CashChange {
                        actor: Actor::Player(player),
                        amount,
                    });
                }
            }
            events.extend(state.move_price(ctx.def, corporation, MoveDirection::Right, 1));
        } else {
            state.corporation_mut(corporation).treasury += total;
            state.bank -= total;
            if total > 0 {
                events.push(LogEvent::CashChange {
                    actor: Actor::Corporation(corporation),
                    amount: total,
                });
            }
            events.extend(state.move_price(ctx.def, corporation, MoveDirection::Left, 1));
        }

        state.turn.dividended = true;
        events.insert(
            0,
            LogEvent::DividendPaid {
                corporation,
                kind: *kind,
                amount: total,
            },
        );
        tracing::debug!(corporation = %corporation, amount = total, payout, "dividend");
        Ok(events)
    }
}
