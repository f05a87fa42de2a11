//! Running trains for revenue.
//!
//! The engine computes the revenue-optimal set of routes itself: one route
//! per train at most, disjoint track, each route anchored at one of the
//! corporation's tokens. The chosen total and route count are parked on the
//! turn state for the dividend step.

use crate::core::{Action, ActionKind, Actor, EngineError, LogEvent};
use crate::game::GameState;
use crate::route::{RouteFinder, TrackGraph};
use crate::round::step::{illegal, Step, StepContext};

use super::acting_corporation;

/// The run-routes step of the operating turn.
pub struct RouteStep;

impl Step for RouteStep {
    fn name(&self) -> &'static str {
        "route"
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
        if state.turn.revenue.is_some() {
            return vec![];
        }
        if state.corporation(corporation).trains.is_empty() {
            return vec![];
        }
        vec![ActionKind::RunRoutes]
    }

    fn process(
        &self,
        ctx: &StepContext<'_>,
        state: &mut GameState,
        actor: Actor,
        action: &Action,
    ) -> Result<Vec<LogEvent>, EngineError> {
        if !matches!(action, Action::RunRoutes) {
            return Err(illegal(action.kind(), actor, self.name()));
        }
        let corporation = acting_corporation(state, actor)
            .ok_or_else(|| illegal(action.kind(), actor, self.name()))?;

        let (total, count) = {
            let coords = ctx.def.coords();
            let graph = TrackGraph::build(&state.board, &coords);
            let starts = state.token_nodes(corporation);
            let trains: Vec<_> = state
                .corporation(corporation)
                .trains
                .iter()
                .map(|&t| (t, state.depot.unit(t).distance.clone()))
                .collect();

            let finder = RouteFinder::new(&graph, &state.board, state.phase_color(ctx.def))
                .allow_shared_track(ctx.def.rules.allow_shared_track);
            let adjust = |route: &crate::route::Route, base: i64| {
                ctx.variant
                    .revenue_for(ctx.def, state, corporation, route, base)
            };
            // Trains without a legal route simply contribute nothing.
            let routes = finder.best_routes(&trains, &starts, &adjust);
            let total = ctx
                .variant
                .routes_revenue(ctx.def, state, corporation, &routes);
            (total, routes.len() as u8)
        };

        state.turn.revenue = Some((total, count));
        tracing::debug!(corporation = %corporation, revenue = total, routes = count, "routes run");
        Ok(vec![LogEvent::RevenueRun {
            corporation,
            revenue: total,
            routes: count,
        }])
    }
}
