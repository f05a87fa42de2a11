//! Forced discard when over the train limit.
//!
//! A phase advance can lower the train limit below a corporation's holdings;
//! the excess must be discarded to the depot pool before the corporation
//! does anything else. Obsolete trains are exempt from the limit and need
//! not be discarded.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::GameState;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// Over-limit train discard.
pub struct DiscardTrainStep;

impl Step for DiscardTrainStep {
    fn name(&self) -> &'static str {
        "discard_train"
    }

    fn blocks(&self) -> bool {
        true
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
        let limit = state.phase(ctx.def).train_limit as usize;
        if state.counted_trains(corporation) > limit {
            vec![ActionKind::DiscardTrain]
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
        let Action::DiscardTrain { train } = action else {
            return Err(illegal(action.kind(), actor, self.name()));
        };
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name()))?;

        let corp = state.corporation_mut(corporation);
        if !corp.trains.contains(train) {
            return Err(EngineError::rule(format!(
                "{corporation} does not own {train}"
            )));
        }
        corp.trains.retain(|&t| t != *train);
        state.depot.discard(*train);

        Ok(vec![LogEvent::TrainDiscarded {
            corporation,
            train: *train,
        }])
    }
}
