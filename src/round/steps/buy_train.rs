//! Train purchases.
//!
//! Depot trains sell at list price in queue order (plus any discarded pool
//! train); corporations may also trade trains between themselves at any
//! agreed price of at least 1. A depot purchase can advance the phase, which
//! in turn fires rust, obsolescence, and the new phase's events.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::GameState;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The train-purchase step of the operating turn.
pub struct BuyTrainStep;

impl Step for BuyTrainStep {
    fn name(&self) -> &'static str {
        "buy_train"
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
        if state.turn.has_passed(self.name()) {
            return vec![];
        }
        let limit = state.phase(ctx.def).train_limit as usize;
        if state.counted_trains(corporation) >= limit {
            return vec![];
        }
        let any_elsewhere = state
            .corporations
            .iter()
            .enumerate()
            .any(|(i, c)| i != corporation.index() && !c.trains.is_empty());
        if state.depot.buyable().is_empty() && !any_elsewhere {
            return vec![];
        }
        vec![ActionKind::BuyTrain, ActionKind::Pass]
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

        let (train, price) = match action {
            Action::BuyTrain { train, price } => (*train, *price),
            Action::Pass => {
                state.turn.pass(self.name());
                return Ok(vec![]);
            }
            _ => return Err(illegal(action.kind(), actor, self.name())),
        };

        let unit = state
            .depot
            .get(train)
            .ok_or_else(|| EngineError::rule(format!("{train} does not exist")))?;
        if unit.rusted {
            return Err(EngineError::rule(format!("{train} has rusted")));
        }
        let name = unit.name.clone();
        let list_price = unit.price;

        let mut events = Vec::new();
        if state.depot.holds(train) {
            // Depot purchase, at list price only, queue head or pool.
            if price != list_price {
                return Err(EngineError::rule(format!(
                    "depot trains sell at list price {list_price}, not {price}"
                )));
            }
            if !state.depot.buyable().contains(&train) {
                return Err(EngineError::rule(format!("{train} is not yet for sale")));
            }
            let treasury = state.corporation(corporation).treasury;
            if treasury < price {
                return Err(EngineError::InsufficientFunds {
                    actor,
                    available: treasury,
                    required: price,
                });
            }

            let from_queue = state.depot.take(train)?;
            state.corporation_mut(corporation).treasury -= price;
            state.bank += price;
            state.corporation_mut(corporation).trains.push(train);
            events.push(LogEvent::TrainBought {
                buyer: corporation,
                train,
                price,
                from_depot: true,
            });
            events.push(LogEvent::CashChange {
                actor: Actor::Corporation(corporation),
                amount: -price,
            });

            if from_queue {
                self.replenish(ctx, state, &name);
                if let Some(target) = ctx
                    .def
                    .phases
                    .advance_target(state.phase_index, &name)
                {
                    state.advance_phase(ctx.def, target, &name, &mut events);
                    let phase_events = state.phase(ctx.def).events.clone();
                    for event in phase_events {
                        ctx.variant.phase_event(event, ctx.def, state, &mut events);
                    }
                }
            }
        } else {
            // Cross-corporation trade at any agreed price of at least 1.
            let seller = state
                .train_owner(train)
                .ok_or_else(|| EngineError::rule(format!("{train} is not for sale")))?;
            if seller == corporation {
                return Err(EngineError::rule(format!(
                    "{corporation} already owns {train}"
                )));
            }
            if price < 1 {
                return Err(EngineError::rule("trade price must be at least 1"));
            }
            let treasury = state.corporation(corporation).treasury;
            if treasury < price {
                return Err(EngineError::InsufficientFunds {
                    actor,
                    available: treasury,
                    required: price,
                });
            }

            state.corporation_mut(seller).trains.retain(|&t| t != train);
            state.corporation_mut(seller).treasury += price;
            state.corporation_mut(corporation).treasury -= price;
            state.corporation_mut(corporation).trains.push(train);
            events.push(LogEvent::TrainBought {
                buyer: corporation,
                train,
                price,
                from_depot: false,
            });
            events.push(LogEvent::CashChange {
                actor: Actor::Corporation(corporation),
                amount: -price,
            });
            events.push(LogEvent::CashChange {
                actor: Actor::Corporation(seller),
                amount: price,
            });
        }

        let limit = state.phase(ctx.def).train_limit as usize;
        if state.counted_trains(corporation) > limit {
            return Err(EngineError::rule(format!(
                "{corporation} would exceed the train limit of {limit}"
            )));
        }

        tracing::debug!(corporation = %corporation, train = %train, price, "train bought");
        Ok(events)
    }
}

impl BuyTrainStep {
    /// Under the unlimited-diesels rule option, the named type never sells
    /// out: buying the last queued unit mints another.
    fn replenish(&self, ctx: &StepContext<'_>, state: &mut GameState, bought: &str) {
        let Some(diesel) = ctx.def.rules.unlimited_diesels.as_deref() else {
            return;
        };
        if bought != diesel {
            return;
        }
        let still_queued = state
            .depot
            .unsold()
            .iter()
            .any(|&t| state.depot.unit(t).name == diesel);
        if still_queued {
            return;
        }
        if let Some(train_type) = ctx.def.roster.iter().find(|t| t.name == diesel) {
            let index = state.depot.count_of(diesel) + 1;
            let id = state.depot.add_unit(train_type, index);
            tracing::debug!(train = %id, "diesel supply replenished");
        }
    }
}
