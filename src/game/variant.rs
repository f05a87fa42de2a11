//! The variant seam.
//!
//! A [`Variant`] is the strategy object a game title plugs into the engine:
//! hooks for seeded setup, per-route and cross-route revenue adjustment,
//! tile-lay allowances, phase events, and the step lists for each round
//! type. Every hook has a default that implements the common rules, so a
//! title overrides only where it diverges. The engine depends on this trait
//! alone, never on a concrete title's type.

use rustc_hash::FxHashMap;

use crate::ability::{AbilityEffect, AbilityKind};
use crate::core::{CompanyId, CorporationId, LogEvent};
use crate::phase::PhaseEvent;
use crate::route::Route;
use crate::round::steps::{
    BankruptStep, BuyCompanyStep, BuySellParSharesStep, BuyTrainStep, DiscardTrainStep,
    DividendStep, RouteStep, TakeLoanStep, TokenStep, TrackStep,
};
use crate::round::Step;

use super::definition::GameDefinition;
use super::state::GameState;

/// Per-title rule hooks with common-rule defaults.
pub trait Variant {
    /// Title name, for logs.
    fn name(&self) -> &str;

    /// Seeded setup randomization (metropolitan hex assignment, offboard
    /// shuffles). Draw only from `state.rng`.
    fn setup(&self, def: &GameDefinition, state: &mut GameState) {
        let _ = (def, state);
    }

    /// Tile lays allowed per operating turn.
    fn tile_lays(&self, def: &GameDefinition, state: &GameState) -> u8 {
        if def.rules.double_yellow_first_or && state.operating_round == 1 {
            2
        } else {
            1
        }
    }

    /// Adjust one route's revenue, or reject the route entirely.
    ///
    /// Runs after the base per-stop sum. The default applies the
    /// corporation's hex-bonus abilities; titles add termini checks and
    /// conditional bonuses on top.
    fn revenue_for(
        &self,
        def: &GameDefinition,
        state: &GameState,
        corporation: CorporationId,
        route: &Route,
        base: i64,
    ) -> Option<i64> {
        let _ = def;
        Some(base + hex_bonus_total(state, corporation, route))
    }

    /// Total revenue across a corporation's chosen routes.
    ///
    /// The default sums per-route revenue and adds named route bonuses
    /// aggregated as the maximum per bonus name across routes, summed over
    /// names.
    fn routes_revenue(
        &self,
        def: &GameDefinition,
        state: &GameState,
        corporation: CorporationId,
        routes: &[Route],
    ) -> i64 {
        let _ = def;
        routes.iter().map(|r| r.revenue).sum::<i64>()
            + route_bonus_total(state, corporation, routes)
    }

    /// Handle a begin-of-phase event.
    fn phase_event(
        &self,
        event: PhaseEvent,
        def: &GameDefinition,
        state: &mut GameState,
        events: &mut Vec<LogEvent>,
    ) {
        let _ = def;
        match event {
            PhaseEvent::CloseCompanies => {
                for i in 0..state.companies.len() {
                    state.close_company(CompanyId::new(i as u16), events);
                }
            }
            PhaseEvent::RemoveTokens => {
                for corp in &mut state.corporations {
                    corp.abilities.remove_kind(AbilityKind::RouteBonus);
                    corp.abilities.remove_kind(AbilityKind::HexBonus);
                }
                for company in &mut state.companies {
                    company.abilities.remove_kind(AbilityKind::RouteBonus);
                    company.abilities.remove_kind(AbilityKind::HexBonus);
                }
            }
        }
    }

    /// Step list for operating rounds, in pipeline order.
    ///
    /// The trailing company-purchase window blocks: the turn stays open
    /// until it is resolved or passed.
    fn operating_steps(&self) -> Vec<Box<dyn Step>> {
        vec![
            Box::new(BankruptStep),
            Box::new(DiscardTrainStep),
            Box::new(TakeLoanStep),
            Box::new(TrackStep),
            Box::new(TokenStep),
            Box::new(RouteStep),
            Box::new(DividendStep),
            Box::new(BuyTrainStep),
            Box::new(BuyCompanyStep::trailing()),
        ]
    }

    /// Step list for stock rounds.
    fn stock_steps(&self) -> Vec<Box<dyn Step>> {
        vec![Box::new(BuySellParSharesStep)]
    }
}

/// Hex-bonus contribution for one route: per-stop bonus on listed hexes.
#[must_use]
pub fn hex_bonus_total(state: &GameState, corporation: CorporationId, route: &Route) -> i64 {
    state
        .bonus_effects(corporation)
        .iter()
        .map(|effect| match effect {
            AbilityEffect::HexBonus { hexes, amount } => {
                amount
                    * route
                        .stops
                        .iter()
                        .filter(|stop| hexes.contains(&stop.hex))
                        .count() as i64
            }
            _ => 0,
        })
        .sum()
}

/// Named route bonuses across a set of routes: the best route's value per
/// bonus name, summed over names.
#[must_use]
pub fn route_bonus_total(
    state: &GameState,
    corporation: CorporationId,
    routes: &[Route],
) -> i64 {
    let effects = state.bonus_effects(corporation);
    let mut best: FxHashMap<&str, i64> = FxHashMap::default();
    for effect in &effects {
        if let AbilityEffect::RouteBonus { name, hexes, amount } = effect {
            let qualified = routes
                .iter()
                .filter(|route| hexes.iter().all(|&h| route.visits_hex(h)))
                .map(|_| *amount)
                .max()
                .unwrap_or(0);
            let entry = best.entry(name.as_str()).or_insert(0);
            *entry = (*entry).max(qualified);
        }
    }
    best.values().sum()
}
