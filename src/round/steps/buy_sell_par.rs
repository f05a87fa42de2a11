//! Stock-round share dealing.
//!
//! One action per stock turn: par a corporation (taking the 20% president's
//! certificate), buy one 10% share from the initial offering or the bank
//! pool, sell pool-bound shares (dropping the price one cell per share), or
//! pass. A corporation floats when 60% of its shares have left the offering.

use crate::core::{
    Action, ActionKind, Actor, CorporationId, EngineError, LogEvent, PlayerId,
};
use crate::game::GameState;
use crate::market::MoveDirection;
use crate::round::step::{illegal, Step, StepContext};

/// Shares in the initial offering at or below which the corporation floats.
const FLOAT_IPO_SHARES: u8 = 4;

/// The stock-round dealing step.
pub struct BuySellParSharesStep;

impl BuySellParSharesStep {
    fn check_corporation(
        state: &GameState,
        corporation: CorporationId,
    ) -> Result<(), EngineError> {
        if corporation.index() >= state.corporations.len() {
            return Err(EngineError::rule(format!("{corporation} does not exist")));
        }
        if state.corporation(corporation).closed {
            return Err(EngineError::rule(format!("{corporation} is closed")));
        }
        Ok(())
    }

    fn pay(
        state: &mut GameState,
        player: PlayerId,
        cost: i64,
        actor: Actor,
    ) -> Result<(), EngineError> {
        let cash = state.player(player).cash;
        if cash < cost {
            return Err(EngineError::InsufficientFunds {
                actor,
                available: cash,
                required: cost,
            });
        }
        state.player_mut(player).cash -= cost;
        Ok(())
    }
}

impl Step for BuySellParSharesStep {
    fn name(&self) -> &'static str {
        "buy_sell_par"
    }

    fn available(
        &self,
        _ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind> {
        let Actor::Player(_) = actor else {
            return vec![];
        };
        let _ = state;
        vec![
            ActionKind::Par,
            ActionKind::BuyShares,
            ActionKind::SellShares,
            ActionKind::Pass,
        ]
    }

    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        let Actor::Player(player) = actor else {
            return Err(illegal(action.kind(), actor, self.name()));
        };

        match action {
            Action::Par { corporation, price } => {
                Self::check_corporation(state, *corporation)?;
                let corp = state.corporation(*corporation);
                if corp.par.is_some() {
                    return Err(EngineError::rule(format!(
                        "{corporation} has already been started"
                    )));
                }
                let pos = ctx.def.market.par_position_at(*price).ok_or_else(|| {
                    EngineError::rule(format!("{price} is not a par price"))
                })?;

                // President's certificate is two shares.
                let cost = price * 2;
                Self::pay(state, player, cost, actor)?;
                state.bank += cost;

                let corp = state.corporation_mut(*corporation);
                corp.par = Some(*price);
                corp.market = Some(pos);
                corp.president = Some(player);
                corp.ipo_shares -= 2;
                *state
                    .player_mut(player)
                    .shares
                    .entry(*corporation)
                    .or_insert(0) += 20;

                tracing::info!(corporation = %corporation, price, "corporation parred");
                Ok(vec![
                    LogEvent::Parred {
                        corporation: *corporation,
                        price: *price,
                    },
                    LogEvent::SharesTraded {
                        player,
                        corporation: *corporation,
                        percent: 20,
                    },
                    LogEvent::CashChange {
                        actor,
                        amount: -cost,
                    },
                ])
            }

            Action::BuyShares { corporation } => {
                Self::check_corporation(state, *corporation)?;
                let corp = state.corporation(*corporation);
                let Some(par) = corp.par else {
                    return Err(EngineError::rule(format!(
                        "{corporation} has not been started"
                    )));
                };

                let (cost, from_ipo) = if corp.ipo_shares > 0 {
                    (par, true)
                } else if corp.pool_shares > 0 {
                    (state.share_price(ctx.def, *corporation), false)
                } else {
                    return Err(EngineError::rule(format!(
                        "no {corporation} shares for sale"
                    )));
                };
                Self::pay(state, player, cost, actor)?;

                // Under incremental capitalization IPO sales fund the
                // treasury directly; otherwise the bank takes them.
                if from_ipo && ctx.def.rules.incremental_capitalization {
                    state.corporation_mut(*corporation).treasury += cost;
                } else {
                    state.bank += cost;
                }
                let corp = state.corporation_mut(*corporation);
                if from_ipo {
                    corp.ipo_shares -= 1;
                } else {
                    corp.pool_shares -= 1;
                }
                *state
                    .player_mut(player)
                    .shares
                    .entry(*corporation)
                    .or_insert(0) += 10;

                let mut events = vec![
                    LogEvent::SharesTraded {
                        player,
                        corporation: *corporation,
                        percent: 10,
                    },
                    LogEvent::CashChange {
                        actor,
                        amount: -cost,
                    },
                ];
                let corp = state.corporation(*corporation);
                if !corp.floated && corp.ipo_shares <= FLOAT_IPO_SHARES {
                    state.float_corporation(ctx.def, *corporation, &mut events);
                }
                Ok(events)
            }

            Action::SellShares {
                corporation,
                shares,
            } => {
                Self::check_corporation(state, *corporation)?;
                if *shares == 0 {
                    return Err(EngineError::rule("cannot sell zero shares"));
                }
                let corp = state.corporation(*corporation);
                if corp.par.is_none() {
                    return Err(EngineError::rule(format!(
                        "{corporation} has not been started"
                    )));
                }
                let held = state.player(player).percent(*corporation);
                // The president's certificate cannot be broken up and sold.
                let reserved: u8 = if corp.president == Some(player) { 20 } else { 0 };
                if i16::from(held) - i16::from(reserved) < i16::from(*shares) * 10 {
                    return Err(EngineError::rule(format!(
                        "cannot sell {shares} shares holding {held}%"
                    )));
                }

                let price = state.share_price(ctx.def, *corporation);
                let proceeds = price * i64::from(*shares);
                state.player_mut(player).cash += proceeds;
                state.bank -= proceeds;
                *state
                    .player_mut(player)
                    .shares
                    .entry(*corporation)
                    .or_insert(0) -= shares * 10;
                state.corporation_mut(*corporation).pool_shares += shares;

                let mut events = vec![
                    LogEvent::SharesTraded {
                        player,
                        corporation: *corporation,
                        percent: -((*shares as i8) * 10),
                    },
                    LogEvent::CashChange {
                        actor,
                        amount: proceeds,
                    },
                ];
                events.extend(state.move_price(
                    ctx.def,
                    *corporation,
                    MoveDirection::Down,
                    *shares,
                ));
                Ok(events)
            }

            Action::Pass => Ok(vec![]),
            _ => Err(illegal(action.kind(), actor, self.name())),
        }
    }
}
