//! Mutable game state.
//!
//! Everything that changes during play lives here: player cash and share
//! holdings, corporation treasuries and trains, the board, the tile pool,
//! the depot, the current phase, and the per-turn operating progress. The
//! whole struct is `Clone` + serde so the engine can apply an action to a
//! copy and commit only on success, and so `bincode` snapshots back the
//! replay-determinism contract.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ability::{AbilityContext, AbilityEffect, AbilityKind, AbilitySet};
use crate::core::{CompanyId, CorporationId, GameRng, LogEvent, PlayerId, TrainId};
use crate::map::{Board, HexState, TileColor, TilePool};
use crate::market::{MarketPos, MoveDirection};
use crate::phase::Phase;
use crate::route::NodeRef;
use crate::train::Depot;

use super::definition::GameDefinition;

/// A player's mutable state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Cash on hand.
    pub cash: i64,
    /// Share holdings in percent, keyed by corporation.
    pub shares: FxHashMap<CorporationId, u8>,
}

impl PlayerState {
    /// Percent held in a corporation.
    #[must_use]
    pub fn percent(&self, corporation: CorporationId) -> u8 {
        self.shares.get(&corporation).copied().unwrap_or(0)
    }
}

/// Who currently owns a private company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyOwner {
    /// Held by a player.
    Player(PlayerId),
    /// Bought into a corporation.
    Corporation(CorporationId),
}

/// A private company's mutable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyState {
    /// Current owner.
    pub owner: CompanyOwner,
    /// Closed companies are out of play; abilities are gone.
    pub closed: bool,
    /// Abilities the company still carries.
    pub abilities: AbilitySet,
}

/// A corporation's mutable state.
///
/// The share register is 10 units of 10%; the president's certificate is two
/// units. A corporation floats once 60% has left the initial offering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorporationState {
    /// Treasury cash.
    pub treasury: i64,
    /// Owned train units.
    pub trains: Vec<TrainId>,
    /// Unplaced station tokens.
    pub tokens_remaining: u8,
    /// Market position, set at par.
    pub market: Option<MarketPos>,
    /// Par price, set when started.
    pub par: Option<i64>,
    /// The corporation has floated and operates.
    pub floated: bool,
    /// The corporation hit a closed market cell and is out of play.
    pub closed: bool,
    /// Current president.
    pub president: Option<PlayerId>,
    /// Outstanding loans.
    pub loans: u32,
    /// 10% units remaining in the initial offering.
    pub ipo_shares: u8,
    /// 10% units in the bank pool.
    pub pool_shares: u8,
    /// Abilities attached directly to the corporation.
    pub abilities: AbilitySet,
    /// Companies bought into the corporation.
    pub companies: Vec<CompanyId>,
}

impl CorporationState {
    /// True if every share has left the offering and the pool.
    #[must_use]
    pub fn sold_out(&self) -> bool {
        self.par.is_some() && self.ipo_shares == 0 && self.pool_shares == 0
    }
}

/// Progress of the current corporation's operating turn.
///
/// Reset when the next corporation comes up; steps consult and update these
/// flags to decide what they still have to offer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// The corporation whose turn it is, in an operating round.
    pub corporation: Option<CorporationId>,
    /// Tile lays used this turn.
    pub tile_lays: u8,
    /// A token was placed this turn.
    pub tokened: bool,
    /// Revenue run this turn: total and route count.
    pub revenue: Option<(i64, u8)>,
    /// The dividend decision was made.
    pub dividended: bool,
    /// Steps explicitly passed this turn, by name.
    pub passed: Vec<String>,
}

impl TurnState {
    /// Start a fresh turn for a corporation.
    pub fn begin(&mut self, corporation: CorporationId) {
        *self = Self {
            corporation: Some(corporation),
            ..Self::default()
        };
    }

    /// True if the named step was passed this turn.
    #[must_use]
    pub fn has_passed(&self, step: &str) -> bool {
        self.passed.iter().any(|s| s == step)
    }

    /// Mark a step as passed for the rest of the turn.
    pub fn pass(&mut self, step: &str) {
        if !self.has_passed(step) {
            self.passed.push(step.to_string());
        }
    }
}

/// The full mutable state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Player states, indexed by [`PlayerId`].
    pub players: Vec<PlayerState>,
    /// Corporation states, indexed by [`CorporationId`].
    pub corporations: Vec<CorporationState>,
    /// Company states, indexed by [`CompanyId`].
    pub companies: Vec<CompanyState>,
    /// The board.
    pub board: Board,
    /// Remaining tile supply.
    pub tile_pool: TilePool,
    /// Train registry and shared pools.
    pub depot: Depot,
    /// Current phase index into the definition's table.
    pub phase_index: usize,
    /// Names of every phase reached, in order.
    pub phases_reached: Vec<String>,
    /// Bank cash.
    pub bank: i64,
    /// The seeded randomness stream.
    pub rng: GameRng,
    /// Operating-turn progress.
    pub turn: TurnState,
    /// 1-based operating-round number, counted across the whole game.
    pub operating_round: u32,
    /// The game has ended (bankruptcy).
    pub game_over: bool,
}

impl GameState {
    /// Build the opening state from a definition and seed.
    ///
    /// Private companies are dealt to players in seat order at face value;
    /// the variant's `setup` hook runs afterwards for seeded map
    /// randomization.
    #[must_use]
    pub fn new(def: &GameDefinition, seed: u64) -> Self {
        let board = Board::new(
            def.hexes
                .iter()
                .map(|h| HexState::preprinted(h.tile.clone()))
                .collect(),
        );

        let mut players: Vec<PlayerState> = (0..def.players)
            .map(|_| PlayerState {
                cash: def.starting_cash,
                shares: FxHashMap::default(),
            })
            .collect();

        let mut bank = def.bank;
        let companies: Vec<CompanyState> = def
            .companies
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let owner = PlayerId::new((i % def.players as usize) as u8);
                players[owner.index()].cash -= template.value;
                bank += template.value;
                CompanyState {
                    owner: CompanyOwner::Player(owner),
                    closed: false,
                    abilities: template.abilities.clone(),
                }
            })
            .collect();

        let corporations = def
            .corporations
            .iter()
            .map(|template| CorporationState {
                treasury: 0,
                trains: Vec::new(),
                tokens_remaining: template.tokens,
                market: None,
                par: None,
                floated: false,
                closed: false,
                president: None,
                loans: 0,
                ipo_shares: 10,
                pool_shares: 0,
                abilities: template.abilities.clone(),
                companies: Vec::new(),
            })
            .collect();

        let first_phase = def.phases.get(0).name.clone();
        Self {
            players,
            corporations,
            companies,
            board,
            tile_pool: def.manifest.initial_pool(),
            depot: Depot::from_roster(&def.roster),
            phase_index: 0,
            phases_reached: vec![first_phase],
            bank,
            rng: GameRng::new(seed),
            turn: TurnState::default(),
            operating_round: 0,
            game_over: false,
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase<'a>(&self, def: &'a GameDefinition) -> &'a Phase {
        def.phases.get(self.phase_index)
    }

    /// Highest tile color the current phase permits.
    #[must_use]
    pub fn phase_color(&self, def: &GameDefinition) -> TileColor {
        self.phase(def).max_color()
    }

    /// A player's state.
    ///
    /// # Panics
    /// Panics on an out-of-range ID; IDs come from the definition, so a bad
    /// one is an engine bug.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    /// Mutable player state.
    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    /// A corporation's state.
    #[must_use]
    pub fn corporation(&self, id: CorporationId) -> &CorporationState {
        &self.corporations[id.index()]
    }

    /// Mutable corporation state.
    pub fn corporation_mut(&mut self, id: CorporationId) -> &mut CorporationState {
        &mut self.corporations[id.index()]
    }

    /// A company's state.
    #[must_use]
    pub fn company(&self, id: CompanyId) -> &CompanyState {
        &self.companies[id.index()]
    }

    /// Mutable company state.
    pub fn company_mut(&mut self, id: CompanyId) -> &mut CompanyState {
        &mut self.companies[id.index()]
    }

    /// Ability activation context for a corporation.
    #[must_use]
    pub fn ability_context(&self, corporation: CorporationId) -> AbilityContext<'_> {
        AbilityContext {
            phases_reached: &self.phases_reached,
            owner_has_train: !self.corporation(corporation).trains.is_empty(),
        }
    }

    /// Active bonus effects (hex and route bonuses) usable by a corporation:
    /// its own abilities plus those of companies it owns.
    #[must_use]
    pub fn bonus_effects(&self, corporation: CorporationId) -> Vec<AbilityEffect> {
        let ctx = self.ability_context(corporation);
        let corp = self.corporation(corporation);

        let mut out = Vec::new();
        for kind in [AbilityKind::HexBonus, AbilityKind::RouteBonus] {
            out.extend(corp.abilities.of_kind(kind, &ctx).map(|a| a.effect.clone()));
            for &company in &corp.companies {
                out.extend(
                    self.company(company)
                        .abilities
                        .of_kind(kind, &ctx)
                        .map(|a| a.effect.clone()),
                );
            }
        }
        out
    }

    /// Nodes carrying the corporation's station tokens.
    #[must_use]
    pub fn token_nodes(&self, corporation: CorporationId) -> Vec<NodeRef> {
        let mut out = Vec::new();
        for (hex_id, hex) in self.board.iter() {
            for (node, slot) in hex.tokens.iter().enumerate() {
                if slot.contains(&corporation) {
                    out.push(NodeRef::new(hex_id, node as u8));
                }
            }
        }
        out
    }

    /// Trains counting against the corporation's limit (obsolete exempt).
    #[must_use]
    pub fn counted_trains(&self, corporation: CorporationId) -> usize {
        self.corporation(corporation)
            .trains
            .iter()
            .filter(|&&t| !self.depot.unit(t).obsolete)
            .count()
    }

    /// Move a corporation's price marker and log before/after prices.
    ///
    /// Returns `None` if the marker did not move (already clamped).
    pub fn move_price(
        &mut self,
        def: &GameDefinition,
        corporation: CorporationId,
        direction: MoveDirection,
        steps: u8,
    ) -> Option<LogEvent> {
        let from = self.corporation(corporation).market?;
        let to = def.market.move_marker(from, direction, steps);
        if to == from {
            return None;
        }
        self.corporation_mut(corporation).market = Some(to);
        if def.market.is_closed(to) {
            self.corporation_mut(corporation).closed = true;
        }
        Some(LogEvent::PriceMoved {
            corporation,
            from: def.market.price_point(from),
            to: def.market.price_point(to),
        })
    }

    /// Current share price of a corporation.
    ///
    /// # Panics
    /// Panics if the corporation has not been parred; callers gate on
    /// `market.is_some()`.
    #[must_use]
    pub fn share_price(&self, def: &GameDefinition, corporation: CorporationId) -> i64 {
        let pos = self.corporation(corporation).market;
        def.market
            .price(pos.unwrap_or_else(|| panic!("{corporation} has no market position")))
    }

    /// Float a corporation: grant capital and place the home token.
    pub fn float_corporation(
        &mut self,
        def: &GameDefinition,
        corporation: CorporationId,
        events: &mut Vec<LogEvent>,
    ) {
        let template = &def.corporations[corporation.index()];
        let par = self.corporation(corporation).par.unwrap_or(0);

        self.corporation_mut(corporation).floated = true;
        if !def.rules.incremental_capitalization {
            self.bank -= par * 10;
            self.corporation_mut(corporation).treasury += par * 10;
        }
        // Home token is free and placed immediately.
        if self
            .board
            .place_token(template.home, template.home_city, corporation)
            .is_ok()
        {
            self.corporation_mut(corporation).tokens_remaining -= 1;
            events.push(LogEvent::TokenPlaced {
                hex: template.home,
                corporation,
            });
        }
        events.push(LogEvent::Floated { corporation });
        tracing::info!(corporation = %corporation, "corporation floated");
    }

    /// Close a company: remove it and its abilities from play.
    pub fn close_company(&mut self, company: CompanyId, events: &mut Vec<LogEvent>) {
        let state = self.company_mut(company);
        if state.closed {
            return;
        }
        state.closed = true;
        state.abilities = AbilitySet::new();
        if let CompanyOwner::Corporation(corp) = state.owner {
            self.corporation_mut(corp).companies.retain(|&c| c != company);
        }
        events.push(LogEvent::CompanyClosed { company });
    }

    /// Advance the phase after a depot purchase of `trigger`, firing rust
    /// and obsolescence events.
    ///
    /// Under the hard-rust rule option, obsolescence triggers remove trains
    /// outright instead of flagging them.
    pub fn advance_phase(
        &mut self,
        def: &GameDefinition,
        target: usize,
        trigger: &str,
        events: &mut Vec<LogEvent>,
    ) {
        self.phase_index = target;
        let name = def.phases.get(target).name.clone();
        self.phases_reached.push(name.clone());
        events.push(LogEvent::PhaseAdvanced { name: name.clone() });
        tracing::info!(phase = %name, trigger, "phase advanced");

        let unit_ids: Vec<TrainId> = self.depot.units().map(|u| u.id).collect();
        for id in unit_ids {
            let unit = self.depot.unit(id);
            if unit.rusted {
                continue;
            }
            let rusts = unit.rusts_on.as_deref() == Some(trigger)
                || (def.rules.hard_rust && unit.obsolete_on.as_deref() == Some(trigger));
            let obsoletes =
                !def.rules.hard_rust && unit.obsolete_on.as_deref() == Some(trigger);

            if rusts {
                let owner = self.train_owner(id);
                if let Some(corp) = owner {
                    self.corporation_mut(corp).trains.retain(|&t| t != id);
                }
                self.depot.rust(id);
                events.push(LogEvent::TrainRusted { train: id, owner });
                tracing::debug!(train = %id, "train rusted");
            } else if obsoletes && !self.depot.unit(id).obsolete {
                self.depot.unit_mut(id).obsolete = true;
                events.push(LogEvent::TrainObsoleted { train: id });
            }
        }
    }

    /// The corporation owning a train, if any.
    #[must_use]
    pub fn train_owner(&self, train: TrainId) -> Option<CorporationId> {
        self.corporations
            .iter()
            .position(|c| c.trains.contains(&train))
            .map(|i| CorporationId::new(i as u16))
    }

    /// Floated, open corporations in operating order: share price descending,
    /// ties broken toward the corporation parred earlier (lower ID).
    #[must_use]
    pub fn operating_order(&self, def: &GameDefinition) -> Vec<CorporationId> {
        let mut order: Vec<CorporationId> = (0..self.corporations.len() as u16)
            .map(CorporationId::new)
            .filter(|&c| {
                let corp = self.corporation(c);
                corp.floated && !corp.closed
            })
            .collect();
        order.sort_by_key(|&c| std::cmp::Reverse(self.share_price(def, c)));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_state_reset() {
        let mut turn = TurnState::default();
        turn.begin(CorporationId::new(0));
        turn.tile_lays = 2;
        turn.pass("track");
        assert!(turn.has_passed("track"));

        turn.begin(CorporationId::new(1));
        assert_eq!(turn.corporation, Some(CorporationId::new(1)));
        assert_eq!(turn.tile_lays, 0);
        assert!(!turn.has_passed("track"));
    }

    #[test]
    fn test_sold_out() {
        let corp = CorporationState {
            treasury: 0,
            trains: Vec::new(),
            tokens_remaining: 3,
            market: None,
            par: Some(70),
            floated: true,
            closed: false,
            president: None,
            loans: 0,
            ipo_shares: 0,
            pool_shares: 0,
            abilities: AbilitySet::new(),
            companies: Vec::new(),
        };
        assert!(corp.sold_out());
        assert!(!CorporationState { pool_shares: 1, ..corp }.sold_out());
    }
}
