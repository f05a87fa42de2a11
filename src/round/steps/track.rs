//! Tile lays and upgrades.
//!
//! A lay must use a manifest tile of the next color band, permitted by the
//! current phase, preserving the replaced tile's label and every edge its
//! track touched, drawn from remaining supply, connected to the
//! corporation's token network, with terrain cost paid from the treasury.
//! Tile-lay abilities waive connectivity (and cost, when free) on their
//! listed hexes; discount abilities reduce terrain cost.

use crate::ability::{AbilityContext, AbilityEffect, AbilityKind};
use crate::core::{AbilityOwner, Action, ActionKind, Actor, CorporationId, EngineError, HexId, LogEvent};
use crate::game::GameState;
use crate::map::TileColor;
use crate::route::reachable_hexes;
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The track-lay step of the operating turn.
pub struct TrackStep;

/// The color band a lay on a tile of this color must use.
fn next_color(current: TileColor) -> Option<TileColor> {
    match current {
        TileColor::White => Some(TileColor::Yellow),
        TileColor::Yellow => Some(TileColor::Green),
        TileColor::Green => Some(TileColor::Brown),
        TileColor::Brown => Some(TileColor::Gray),
        TileColor::Gray | TileColor::Red | TileColor::Blue => None,
    }
}

/// An active tile-lay ability covering the hex, if any.
fn tile_lay_ability(
    state: &GameState,
    corporation: CorporationId,
    hex: HexId,
) -> Option<(AbilityOwner, bool)> {
    let ctx = state.ability_context(corporation);
    let covers = |effect: &AbilityEffect| match effect {
        AbilityEffect::TileLay { hexes, free } => hexes.contains(&hex).then_some(*free),
        _ => None,
    };

    let corp = state.corporation(corporation);
    for ability in corp.abilities.of_kind(AbilityKind::TileLay, &ctx) {
        if let Some(free) = covers(&ability.effect) {
            return Some((AbilityOwner::Corporation(corporation), free));
        }
    }
    for &company in &corp.companies {
        for ability in state
            .company(company)
            .abilities
            .of_kind(AbilityKind::TileLay, &ctx)
        {
            if let Some(free) = covers(&ability.effect) {
                return Some((AbilityOwner::Company(company), free));
            }
        }
    }
    None
}

impl Step for TrackStep {
    fn name(&self) -> &'static str {
        "track"
    }

    fn available(
        &self,
        ctx: &StepContext<'_>,
        state: &GameState,
        actor: Actor,
    ) -> Vec<ActionKind> {
        let Some(_) = acting_corporation(state, actor) else {
            return vec![];
        };
        if state.turn.has_passed(self.name()) {
            return vec![];
        }
        if state.turn.tile_lays >= ctx.variant.tile_lays(ctx.def, state) {
            return vec![];
        }
        vec![ActionKind::LayTile, ActionKind::Pass]
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

        let (hex, tile_name, rotation) = match action {
            Action::LayTile {
                hex,
                tile,
                rotation,
            } => (*hex, tile.as_str(), *rotation),
            Action::Pass => {
                state.turn.pass(self.name());
                return Ok(vec![]);
            }
            _ => return Err(illegal(action.kind(), actor, self.name())),
        };

        if hex.index() >= ctx.def.hexes.len() {
            return Err(EngineError::placement(format!("{hex} does not exist")));
        }
        if rotation >= 6 {
            return Err(EngineError::placement(format!("rotation {rotation} out of range")));
        }
        let new_tile = ctx
            .def
            .manifest
            .get(tile_name)
            .ok_or_else(|| EngineError::placement(format!("tile {tile_name:?} not in manifest")))?
            .clone();

        // Everything we need from the tile being covered, captured before
        // the board mutates.
        let (expected_color, old_label, old_edges, mut cost, terrains) = {
            let current = state.board.hex(hex);
            let expected = next_color(current.tile.color)
                .ok_or_else(|| EngineError::placement(format!("{hex} cannot be built on")))?;
            let edges: Vec<u8> = current
                .absolute_paths()
                .flat_map(|(a, b)| [a, b])
                .filter_map(|end| match end {
                    crate::map::PathEnd::Edge(e) => Some(e),
                    crate::map::PathEnd::Node(_) => None,
                })
                .collect();
            (
                expected,
                current.tile.label().map(str::to_owned),
                edges,
                current.tile.upgrade_cost(),
                current.tile.terrain(),
            )
        };

        if new_tile.color != expected_color {
            return Err(EngineError::placement(format!(
                "tile {tile_name:?} is {}, expected {}",
                new_tile.color.as_str(),
                expected_color.as_str()
            )));
        }
        if !state.phase(ctx.def).tiles.contains(&new_tile.color) {
            return Err(EngineError::placement(format!(
                "{} tiles are not yet available",
                new_tile.color.as_str()
            )));
        }
        if let Some(label) = &old_label {
            if new_tile.label() != Some(label.as_str()) {
                return Err(EngineError::placement(format!(
                    "upgrade must keep label {label:?}"
                )));
            }
        }
        let new_edges: Vec<u8> = new_tile
            .edges()
            .iter()
            .map(|e| (e + rotation) % 6)
            .collect();
        if !old_edges.iter().all(|e| new_edges.contains(e)) {
            return Err(EngineError::placement(
                "existing track must be preserved".to_string(),
            ));
        }

        state.tile_pool.consume(tile_name)?;
        if let Some(replaced) = state.board.lay(hex, new_tile, rotation) {
            state.tile_pool.release(&replaced);
        }

        let ability = tile_lay_ability(state, corporation, hex);
        let coords = ctx.def.coords();
        let starts = state.token_nodes(corporation);
        if ability.is_none() && !reachable_hexes(&state.board, &coords, &starts).contains(&hex) {
            return Err(EngineError::placement(format!(
                "{hex} is not connected to {corporation}'s network"
            )));
        }

        // The activation context must borrow locals so ability sets can be
        // mutated while it is alive.
        let phases = state.phases_reached.clone();
        let has_train = !state.corporation(corporation).trains.is_empty();
        let ability_ctx = AbilityContext {
            phases_reached: &phases,
            owner_has_train: has_train,
        };

        let mut events = Vec::new();
        if let Some((owner, free)) = ability {
            let covers_hex = |e: &AbilityEffect| {
                matches!(e, AbilityEffect::TileLay { hexes, .. } if hexes.contains(&hex))
            };
            let consumed = match owner {
                AbilityOwner::Corporation(c) => state.corporations[c.index()]
                    .abilities
                    .use_matching(AbilityKind::TileLay, &ability_ctx, covers_hex),
                AbilityOwner::Company(c) => state.companies[c.index()]
                    .abilities
                    .use_matching(AbilityKind::TileLay, &ability_ctx, covers_hex),
            };
            if consumed.is_some() {
                events.push(LogEvent::AbilityUsed {
                    owner,
                    kind: AbilityKind::TileLay.as_str().to_string(),
                });
            }
            if free {
                cost = 0;
            }
        }

        if cost > 0 {
            let matches_terrain = |effect: &AbilityEffect| match effect {
                AbilityEffect::TileDiscount { terrain, .. } => match terrain {
                    None => true,
                    Some(t) => terrains.contains(t),
                },
                _ => false,
            };
            let mut discount = state.corporations[corporation.index()]
                .abilities
                .use_matching(AbilityKind::TileDiscount, &ability_ctx, matches_terrain)
                .map(|e| (AbilityOwner::Corporation(corporation), e));
            if discount.is_none() {
                let companies = state.corporation(corporation).companies.clone();
                for c in companies {
                    if let Some(e) = state.companies[c.index()].abilities.use_matching(
                        AbilityKind::TileDiscount,
                        &ability_ctx,
                        matches_terrain,
                    ) {
                        discount = Some((AbilityOwner::Company(c), e));
                        break;
                    }
                }
            }
            if let Some((owner, AbilityEffect::TileDiscount { amount, .. })) = discount {
                cost = (cost - amount).max(0);
                events.push(LogEvent::AbilityUsed {
                    owner,
                    kind: AbilityKind::TileDiscount.as_str().to_string(),
                });
            }
        }

        let treasury = state.corporation(corporation).treasury;
        if treasury < cost {
            return Err(EngineError::InsufficientFunds {
                actor,
                available: treasury,
                required: cost,
            });
        }
        if cost > 0 {
            state.corporation_mut(corporation).treasury -= cost;
            state.bank += cost;
            events.push(LogEvent::CashChange {
                actor: Actor::Corporation(corporation),
                amount: -cost,
            });
        }

        state.turn.tile_lays += 1;
        events.push(LogEvent::TileLaid {
            hex,
            tile: tile_name.to_string(),
            rotation,
        });
        tracing::debug!(corporation = %corporation, hex = %hex, tile = tile_name, "tile laid");
        Ok(events)
    }
}
