//! Round orchestration.
//!
//! The manager owns the current round's step pipeline and turn order and
//! advances both as actions are accepted. Stock rounds rotate through the
//! players until everyone passes in sequence; operating rounds walk the
//! corporations in share-price order, each corporation's turn running until
//! no step has anything left to offer. The phase sets how many operating
//! rounds follow each stock round.

use crate::ability::{AbilityContext, AbilityEffect, AbilityKind};
use crate::core::{
    ActionKind, Actor, CompanyId, CorporationId, LogEvent, PlayerId, RoundKind, RoundLabel,
};
use crate::game::{CompanyOwner, GameState};
use crate::market::MoveDirection;

use super::step::{Step, StepContext};

/// Drives rounds, turns, and step resolution.
pub struct RoundManager {
    label: RoundLabel,
    steps: Vec<Box<dyn Step>>,
    order: Vec<Actor>,
    position: usize,
    /// Consecutive stock-round passes; the round ends at a full table.
    stock_passes: usize,
    stock_number: u32,
    operating_number: u32,
    /// Operating rounds left before the next stock round.
    ors_remaining: u32,
}

impl RoundManager {
    /// The opening stock round, seats in definition order.
    #[must_use]
    pub fn opening(ctx: &StepContext<'_>, players: u8) -> Self {
        Self {
            label: RoundLabel {
                kind: RoundKind::Stock,
                number: 1,
            },
            steps: ctx.variant.stock_steps(),
            order: (0..players)
                .map(|i| Actor::Player(PlayerId::new(i)))
                .collect(),
            position: 0,
            stock_passes: 0,
            stock_number: 1,
            operating_number: 0,
            ors_remaining: 0,
        }
    }

    /// The current round label.
    #[must_use]
    pub fn round(&self) -> RoundLabel {
        self.label
    }

    /// Whose turn it is.
    #[must_use]
    pub fn current_actor(&self) -> Actor {
        self.order[self.position]
    }

    /// Every action kind the current actor may submit right now.
    #[must_use]
    pub fn available_actions(&self, ctx: &StepContext<'_>, state: &GameState) -> Vec<ActionKind> {
        let actor = self.current_actor();
        let mut kinds = Vec::new();
        for step in &self.steps {
            let offered = step.available(ctx, state, actor);
            let blocking = !offered.is_empty() && step.blocks();
            for kind in offered {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            if blocking {
                break;
            }
        }
        kinds
    }

    /// Find the step that advertises `kind` for the current actor.
    ///
    /// A blocking step with actions to offer bars everything after it.
    pub fn resolve(
        &self,
        ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
        kind: ActionKind,
    ) -> Result<&dyn Step, crate::core::EngineError> {
        let mut first_active: Option<&dyn Step> = None;
        for step in &self.steps {
            let offered = step.available(ctx, state, actor);
            if offered.contains(&kind) {
                return Ok(step.as_ref());
            }
            if !offered.is_empty() {
                if step.blocks() {
                    return Err(crate::core::EngineError::IllegalAction {
                        kind,
                        actor,
                        step: step.name(),
                    });
                }
                first_active.get_or_insert(step.as_ref());
            }
        }
        Err(crate::core::EngineError::IllegalAction {
            kind,
            actor,
            step: first_active.map_or("round", |s| s.name()),
        })
    }

    /// Advance turn order and rounds after an accepted action.
    pub fn after_action(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        kind: ActionKind,
        events: &mut Vec<LogEvent>,
    ) {
        if state.game_over {
            return;
        }
        match self.label.kind {
            RoundKind::Stock => {
                if kind == ActionKind::Pass {
                    self.stock_passes += 1;
                } else {
                    self.stock_passes = 0;
                }
                if self.stock_passes >= self.order.len() {
                    self.end_stock_round(ctx, state, events);
                } else {
                    self.position = (self.position + 1) % self.order.len();
                }
            }
            RoundKind::Operating => {
                self.skip_finished(ctx, state, events);
            }
        }
    }

    /// Close out a stock round: sold-out corporations rise, then the
    /// phase's worth of operating rounds begins.
    fn end_stock_round(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        for i in 0..state.corporations.len() {
            let id = CorporationId::new(i as u16);
            let corp = state.corporation(id);
            if corp.sold_out() && corp.market.is_some() && !corp.closed {
                events.extend(state.move_price(ctx.def, id, MoveDirection::Up, 1));
            }
        }
        self.ors_remaining = u32::from(state.phase(ctx.def).operating_rounds);
        self.enter_operating(ctx, state, events);
    }

    /// Start the next operating round, or fall back to a stock round when
    /// none remain (or no corporation can operate).
    fn enter_operating(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        if self.ors_remaining == 0 {
            self.enter_stock(ctx, state, events);
            return;
        }
        self.ors_remaining -= 1;
        self.operating_number += 1;
        state.operating_round = self.operating_number;

        self.label = RoundLabel {
            kind: RoundKind::Operating,
            number: self.operating_number,
        };
        self.steps = ctx.variant.operating_steps();
        self.order = state
            .operating_order(ctx.def)
            .into_iter()
            .map(Actor::Corporation)
            .collect();
        self.position = 0;
        events.push(LogEvent::RoundChanged { next: self.label });
        tracing::info!(round = %self.label, "round started");

        self.pay_fixed_income(ctx, state, events);

        if self.order.is_empty() {
            self.enter_operating(ctx, state, events);
            return;
        }
        if let Actor::Corporation(corp) = self.order[0] {
            state.turn.begin(corp);
        }
        self.skip_finished(ctx, state, events);
    }

    /// Start the next stock round.
    fn enter_stock(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        self.stock_number += 1;
        self.label = RoundLabel {
            kind: RoundKind::Stock,
            number: self.stock_number,
        };
        self.steps = ctx.variant.stock_steps();
        self.order = (0..state.players.len())
            .map(|i| Actor::Player(PlayerId::new(i as u8)))
            .collect();
        self.position = 0;
        self.stock_passes = 0;
        state.turn = Default::default();
        events.push(LogEvent::RoundChanged { next: self.label });
        tracing::info!(round = %self.label, "round started");
    }

    /// Advance past corporations whose turns are exhausted; close the round
    /// when the order runs out.
    fn skip_finished(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        loop {
            if self.position >= self.order.len() {
                if self.ors_remaining > 0 {
                    self.enter_operating(ctx, state, events);
                } else {
                    self.enter_stock(ctx, state, events);
                }
                return;
            }
            let actor = self.order[self.position];
            let finished = self
                .steps
                .iter()
                .all(|step| step.available(ctx, state, actor).is_empty());
            if !finished {
                return;
            }
            self.position += 1;
            if self.position < self.order.len() {
                if let Actor::Corporation(corp) = self.order[self.position] {
                    state.turn.begin(corp);
                }
            }
        }
    }

    /// Start-of-operating-round income: open companies pay their fixed
    /// revenue to their owner, and income abilities pay their holder.
    fn pay_fixed_income(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        let phases = state.phases_reached.clone();

        let mut payments: Vec<(Actor, i64)> = Vec::new();
        for i in 0..state.companies.len() {
            let id = CompanyId::new(i as u16);
            let company = state.company(id);
            if company.closed {
                continue;
            }
            let has_train = match company.owner {
                CompanyOwner::Corporation(c) => !state.corporation(c).trains.is_empty(),
                CompanyOwner::Player(_) => false,
            };
            let ability_ctx = AbilityContext {
                phases_reached: &phases,
                owner_has_train: has_train,
            };
            let mut amount = ctx.def.companies[i].revenue;
            for ability in company.abilities.of_kind(AbilityKind::RevenueChange, &ability_ctx) {
                if let AbilityEffect::RevenueChange { revenue } = ability.effect {
                    amount = revenue;
                }
            }
            let owner = match company.owner {
                CompanyOwner::Player(p) => Actor::Player(p),
                CompanyOwner::Corporation(c) => Actor::Corporation(c),
            };
            if amount != 0 {
                payments.push((owner, amount));
            }
        }
        for i in 0..state.corporations.len() {
            let id = CorporationId::new(i as u16);
            let corp = state.corporation(id);
            if corp.closed {
                continue;
            }
            let ability_ctx = AbilityContext {
                phases_reached: &phases,
                owner_has_train: !corp.trains.is_empty(),
            };
            for ability in corp.abilities.of_kind(AbilityKind::Income, &ability_ctx) {
                if let AbilityEffect::Income { amount } = ability.effect {
                    if amount != 0 {
                        payments.push((Actor::Corporation(id), amount));
                    }
                }
            }
        }

        for (owner, amount) in payments {
            match owner {
                Actor::Player(p) => state.player_mut(p).cash += amount,
                Actor::Corporation(c) => state.corporation_mut(c).treasury += amount,
            }
            state.bank -= amount;
            events.push(LogEvent::CashChange {
                actor: owner,
                amount,
            });
        }
    }
}
