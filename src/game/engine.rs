//! The engine facade.
//!
//! [`Game`] binds a definition, a variant, and the evolving state together
//! and applies actions atomically: each action is processed against a clone
//! of the state and committed only when the whole pipeline succeeds, so a
//! rejected action leaves no trace. Every accepted action appends exactly
//! one log entry, and replaying the log from the same definition and seed
//! reproduces the state byte for byte.

use crate::core::{Action, ActionKind, Actor, ActionLog, ActionLogEntry, EngineError, RoundLabel};
use crate::round::{RoundManager, StepContext};

use super::definition::GameDefinition;
use super::state::GameState;
use super::variant::Variant;

/// A running game: definition, variant hooks, state, round manager, log.
pub struct Game {
    def: GameDefinition,
    variant: Box<dyn Variant>,
    state: GameState,
    manager: RoundManager,
    log: ActionLog,
}

impl Game {
    /// Start a new game from a definition and seed.
    #[must_use]
    pub fn new(def: GameDefinition, variant: Box<dyn Variant>, seed: u64) -> Self {
        let mut state = GameState::new(&def, seed);
        variant.setup(&def, &mut state);
        let manager = {
            let ctx = StepContext {
                def: &def,
                variant: variant.as_ref(),
            };
            RoundManager::opening(&ctx, def.players)
        };
        tracing::info!(game = %def.name, variant = %variant.name(), seed, "game started");
        Self {
            def,
            variant,
            state,
            manager,
            log: ActionLog::new(),
        }
    }

    /// Apply one action for the current actor.
    ///
    /// On success the state advances, the action is logged, and the new log
    /// entry is returned; on failure nothing changes.
    pub fn apply(&mut self, action: Action) -> Result<ActionLogEntry, EngineError> {
        if self.state.game_over {
            return Err(EngineError::rule("the game is over"));
        }
        let actor = self.manager.current_actor();
        let kind = action.kind();
        let round = self.manager.round();

        let ctx = StepContext {
            def: &self.def,
            variant: self.variant.as_ref(),
        };
        let step = self.manager.resolve(&ctx, &self.state, actor, kind)?;

        let mut next = self.state.clone();
        let mut events = step.process(&ctx, &mut next, actor, &action)?;
        self.manager.after_action(&ctx, &mut next, kind, &mut events);

        self.state = next;
        let entry = ActionLogEntry {
            sequence: self.log.next_sequence(),
            round,
            actor,
            action,
            events,
        };
        self.log.push(entry.clone());
        tracing::debug!(round = %round, actor = %actor, ?kind, "action applied");
        Ok(entry)
    }

    /// Rebuild a game by replaying a recorded action sequence.
    pub fn replay(
        def: GameDefinition,
        variant: Box<dyn Variant>,
        seed: u64,
        actions: &[Action],
    ) -> Result<Self, EngineError> {
        let mut game = Self::new(def, variant, seed);
        for action in actions {
            game.apply(action.clone())?;
        }
        Ok(game)
    }

    /// Serialize the full game state.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which indicates an engine bug.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        bincode::serialize(&self.state).unwrap_or_else(|e| panic!("state serialization: {e}"))
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The immutable definition.
    #[must_use]
    pub fn definition(&self) -> &GameDefinition {
        &self.def
    }

    /// The action log.
    #[must_use]
    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    /// The current round label.
    #[must_use]
    pub fn round(&self) -> RoundLabel {
        self.manager.round()
    }

    /// Whose turn it is.
    #[must_use]
    pub fn current_actor(&self) -> Actor {
        self.manager.current_actor()
    }

    /// Every action kind the current actor may submit right now.
    #[must_use]
    pub fn available_actions(&self) -> Vec<ActionKind> {
        let ctx = StepContext {
            def: &self.def,
            variant: self.variant.as_ref(),
        };
        self.manager.available_actions(&ctx, &self.state)
    }

    /// True once a game-ending condition has fired.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.state.game_over
    }
}
