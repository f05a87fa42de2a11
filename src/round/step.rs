//! The step capability interface.
//!
//! A round holds an ordered list of steps. Each step advertises the action
//! kinds it can currently process for an actor (`available`; an empty set
//! means the step is silently skipped) and applies accepted actions
//! (`process`). A step tagged `blocks` must be emptied or passed before any
//! later step may act.
//!
//! Steps receive the mutable state directly; atomicity is the engine's job —
//! it processes each action against a copy of the state and commits only on
//! success, so a step may mutate freely and then fail.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::{GameDefinition, GameState, Variant};

/// Shared read-only context handed to every step call.
pub struct StepContext<'a> {
    /// The immutable game configuration.
    pub def: &'a GameDefinition,
    /// The title's rule hooks.
    pub variant: &'a dyn Variant,
}

/// One stage of a round's pipeline.
pub trait Step {
    /// Stable step name, used in errors and pass tracking.
    fn name(&self) -> &'static str;

    /// A blocking step bars later steps while it has actions to offer.
    fn blocks(&self) -> bool {
        false
    }

    /// Action kinds this step currently offers the actor. Empty = skipped.
    fn available(
        &self,
        ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind>;

    /// Validate and apply an action whose kind this step advertised.
    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError>;
}

/// The standard rejection for an action a step did not advertise.
pub(crate) fn illegal(kind: ActionKind, actor: Actor, step: &'static str) -> EngineError {
    EngineError::IllegalAction { kind, actor, step }
}
