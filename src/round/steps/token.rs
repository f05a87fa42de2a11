//! Station token placement.
//!
//! One token per operating turn, in a connected city with a free slot, at
//! the rule set's token cost. A token-grant ability waives connectivity for
//! its hex and may waive the cost.

use crate::ability::{AbilityContext, AbilityEffect, AbilityKind};
use crate::core::{AbilityOwner, Action, ActionKind, Actor, CorporationId, EngineError, HexId, LogEvent};
use crate::game::GameState;
use crate::route::reachable_hexes;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The token step of the operating turn.
pub struct TokenStep;

/// An active token grant for the hex: (owner, free).
fn token_grant(
    state: &GameState,
    corporation: CorporationId,
    hex: HexId,
) -> Option<(AbilityOwner, bool)> {
    let ctx = state.ability_context(corporation);
    let grants = |effect: &AbilityEffect| match effect {
        AbilityEffect::TokenGrant { hex: h, free } => (*h == hex).then_some(*free),
        _ => None,
    };

    let corp = state.corporation(corporation);
    for ability in corp.abilities.of_kind(AbilityKind::TokenGrant, &ctx) {
        if let Some(free) = grants(&ability.effect) {
            return Some((AbilityOwner::Corporation(corporation), free));
        }
    }
    for &company in &corp.companies {
        for ability in state
            .company(company)
            .abilities
            .of_kind(AbilityKind::TokenGrant, &ctx)
        {
            if let Some(free) = grants(&ability.effect) {
                return Some((AbilityOwner::Company(company), free));
            }
        }
    }
    None
}

impl Step for TokenStep {
    fn name(&self) -> &'static str {
        "token"
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
        if state.turn.tokened || state.turn.has_passed(self.name()) {
            return vec![];
        }
        if state.corporation(corporation).tokens_remaining == 0 {
            return vec![];
        }
        vec![ActionKind::PlaceToken, ActionKind::Pass]
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

        let (hex, city) = match action {
            Action::PlaceToken { hex, city } => (*hex, *city),
            Action::Pass => {
                state.turn.pass(self.name());
                return Ok(vec![]);
            }
            _ => return Err(illegal(action.kind(), actor, self.name())),
        };

        if hex.index() >= ctx.def.hexes.len() {
            return Err(EngineError::rule(format!("{hex} does not exist")));
        }

        let grant = token_grant(state, corporation, hex);
        if grant.is_none() {
            let coords = ctx.def.coords();
            let starts = state.token_nodes(corporation);
            if !reachable_hexes(&state.board, &coords, &starts).contains(&hex) {
                return Err(EngineError::rule(format!(
                    "{hex} is not connected to {corporation}'s network"
                )));
            }
        }

        let cost = match grant {
            Some((_, true)) => 0,
            _ => ctx.def.rules.token_cost,
        };
        let treasury = state.corporation(corporation).treasury;
        if treasury < cost {
            return Err(EngineError::InsufficientFunds {
                actor,
                available: treasury,
                required: cost,
            });
        }

        state.board.place_token(hex, city, corporation)?;

        let mut events = Vec::new();
        if let Some((owner, _)) = grant {
            let phases = state.phases_reached.clone();
            let has_train = !state.corporation(corporation).trains.is_empty();
            let ability_ctx = AbilityContext {
                phases_reached: &phases,
                owner_has_train: has_train,
            };
            let grants_hex = |e: &AbilityEffect| {
                matches!(e, AbilityEffect::TokenGrant { hex: h, .. } if *h == hex)
            };
            let consumed = match owner {
                AbilityOwner::Corporation(c) => state.corporations[c.index()]
                    .abilities
                    .use_matching(AbilityKind::TokenGrant, &ability_ctx, grants_hex),
                AbilityOwner::Company(c) => state.companies[c.index()]
                    .abilities
                    .use_matching(AbilityKind::TokenGrant, &ability_ctx, grants_hex),
            };
            if consumed.is_some() {
                events.push(LogEvent::AbilityUsed {
                    owner,
                    kind: AbilityKind::TokenGrant.as_str().to_string(),
                });
            }
        }

        let corp = state.corporation_mut(corporation);
        corp.tokens_remaining -= 1;
        if cost > 0 {
            corp.treasury -= cost;
            state.bank += cost;
            events.push(LogEvent::CashChange {
                actor: Actor::Corporation(corporation),
                amount: -cost,
            });
        }
        state.turn.tokened = true;
        events.push(LogEvent::TokenPlaced { hex, corporation });
        tracing::debug!(corporation = %corporation, hex = %hex, "token placed");
        Ok(events)
    }
}
