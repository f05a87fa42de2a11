//! A small complete title for tests, demos, and benchmarks.
//!
//! Seven hexes on two rows: an east and a west offboard bracketing two
//! preprinted cities, a mountain hex between them, and two southern hexes
//! one of which hosts a metropolis chosen at setup. Two corporations, two
//! private companies, a four-train roster ending in unlimited diesels.
//!
//! The title's one special rule: the metropolis city only pays if a route
//! ends there.

use crate::ability::{Ability, AbilityEffect, AbilitySet};
use crate::core::HexId;
use crate::game::{
    hex_bonus_total, CompanyTemplate, CorporationTemplate, GameDefinition, GameState, MapHex,
    RuleOptions, Variant,
};
use crate::map::{HexCoord, Terrain, Tile, TileColor, TileManifest, TileSupply};
use crate::market::StockMarket;
use crate::phase::{Phase, PhaseEvent, PhaseTable};
use crate::route::Route;
use crate::train::{Distance, TrainType};

/// Hexes the metropolis may land on at setup.
const METRO_CANDIDATES: [&str; 2] = ["B3", "B5"];

fn tile(name: &str, color: TileColor, code: &str) -> Tile {
    Tile::from_code(name, color, code)
        .unwrap_or_else(|e| panic!("tile {name}: {e}"))
}

fn map_hex(name: &str, tile: Tile) -> MapHex {
    let coord = HexCoord::from_name(name)
        .unwrap_or_else(|| panic!("bad hex name {name:?}"));
    MapHex {
        name: name.to_string(),
        coord,
        tile,
    }
}

/// Build the title's definition.
#[must_use]
pub fn definition() -> GameDefinition {
    let blank = tile("blank", TileColor::White, "");

    let hexes = vec![
        map_hex(
            "A2",
            tile(
                "West",
                TileColor::Red,
                "offboard=revenue:yellow_20|green_30|brown_40|gray_50;path=a:4,b:_0",
            ),
        ),
        map_hex(
            "A4",
            tile(
                "Aberdeen",
                TileColor::Yellow,
                "city=revenue:20;path=a:1,b:_0;path=a:4,b:_0",
            ),
        ),
        map_hex(
            "A6",
            tile("pass", TileColor::White, "upgrade=cost:40,terrain:mountain"),
        ),
        map_hex(
            "A8",
            tile(
                "Halifax",
                TileColor::Yellow,
                "city=revenue:20;path=a:1,b:_0;path=a:4,b:_0",
            ),
        ),
        map_hex(
            "A10",
            tile(
                "East",
                TileColor::Red,
                "offboard=revenue:yellow_30|green_40|brown_50|gray_70;path=a:1,b:_0",
            ),
        ),
        map_hex("B3", blank.clone()),
        map_hex("B5", blank),
    ];

    let mut manifest = TileManifest::new();
    manifest.add(
        tile("8", TileColor::Yellow, "path=a:0,b:4"),
        TileSupply::Unlimited,
    );
    manifest.add(
        tile("9", TileColor::Yellow, "path=a:1,b:4"),
        TileSupply::Unlimited,
    );
    manifest.add(
        tile(
            "63",
            TileColor::Green,
            "city=revenue:40,slots:2;path=a:1,b:_0;path=a:4,b:_0",
        ),
        TileSupply::Limited(3),
    );
    manifest.add(
        tile(
            "X10",
            TileColor::Brown,
            "city=revenue:50,slots:2;path=a:1,b:_0;path=a:4,b:_0",
        ),
        TileSupply::Limited(2),
    );
    manifest.add(
        tile(
            "M1",
            TileColor::Green,
            "city=revenue:60,slots:2;path=a:2,b:_0;path=a:3,b:_0;label=M",
        ),
        TileSupply::Limited(1),
    );

    let roster = vec![
        TrainType::new("2", Distance::Simple(2), 80, 4).rusts_on("4"),
        TrainType::new("3", Distance::Simple(3), 180, 3).rusts_on("D"),
        TrainType::new("4", Distance::Simple(4), 300, 2).obsolete_on("D"),
        TrainType::new("D", Distance::Simple(9), 600, 6),
    ];

    use TileColor::{Brown, Green, Yellow};
    let phases = PhaseTable::new(vec![
        Phase::new("2", vec![Yellow], 4, 1),
        Phase::new("3", vec![Yellow, Green], 4, 2).on("3"),
        Phase::new("4", vec![Yellow, Green], 3, 2)
            .on("4")
            .with_event(PhaseEvent::CloseCompanies),
        Phase::new("D", vec![Yellow, Green, Brown], 2, 3)
            .on("D")
            .with_event(PhaseEvent::RemoveTokens),
    ]);

    let market = StockMarket::from_rows(&[
        &["90", "100p", "110", "125", "150", "175", "200"],
        &["80", "90p", "100", "112", "137", "162", "187"],
        &["70", "80p", "90", "100", "120", "145", "170"],
        &["60", "70p", "80", "90", "100", "120", "140"],
        &["40c", "50", "60", "70", "80", "90", "100"],
    ])
    .unwrap_or_else(|e| panic!("market grid: {e}"));

    let corporations = vec![
        CorporationTemplate {
            name: "Aberdeen & Western".to_string(),
            tokens: 3,
            home: HexId::new(1),
            home_city: 0,
            abilities: AbilitySet::new(),
        },
        CorporationTemplate {
            name: "Halifax & Eastern".to_string(),
            tokens: 3,
            home: HexId::new(3),
            home_city: 0,
            abilities: AbilitySet::new(),
        },
    ];

    let mut mail_abilities = AbilitySet::new();
    mail_abilities.add(
        Ability::new(AbilityEffect::RouteBonus {
            name: "east_west".to_string(),
            hexes: vec![HexId::new(0), HexId::new(4)],
            amount: 40,
        })
        .describe("+40 for a route joining West and East"),
    );

    let mut engineer_abilities = AbilitySet::new();
    engineer_abilities.add(
        Ability::new(AbilityEffect::TileLay {
            hexes: vec![HexId::new(2)],
            free: true,
        })
        .with_uses(1)
        .describe("one free lay in the mountain pass"),
    );
    engineer_abilities.add(
        Ability::new(AbilityEffect::TileDiscount {
            amount: 20,
            terrain: Some(Terrain::Mountain),
        })
        .with_uses(1)
        .describe("20 off one mountain lay"),
    );

    let companies = vec![
        CompanyTemplate {
            name: "Eastern Mail".to_string(),
            value: 40,
            revenue: 10,
            abilities: mail_abilities,
        },
        CompanyTemplate {
            name: "Mountain Engineers".to_string(),
            value: 60,
            revenue: 15,
            abilities: engineer_abilities,
        },
    ];

    GameDefinition {
        name: "Simple Rails".to_string(),
        hexes,
        manifest,
        roster,
        phases,
        market,
        corporations,
        companies,
        rules: RuleOptions {
            loan_amount: 50,
            loan_limit: 2,
            token_cost: 40,
            unlimited_diesels: Some("D".to_string()),
            ..RuleOptions::default()
        },
        players: 3,
        starting_cash: 400,
        bank: 8000,
    }
}

/// Rule hooks for the simple title.
pub struct SimpleVariant;

impl SimpleVariant {
    /// The hex currently carrying the metropolis tile, if placed.
    fn metro_hex(state: &GameState) -> Option<HexId> {
        state
            .board
            .iter()
            .find(|(_, hex)| hex.tile.label() == Some("M"))
            .map(|(id, _)| id)
    }
}

impl Variant for SimpleVariant {
    fn name(&self) -> &str {
        "simple"
    }

    /// Place the metropolis on one of the two southern hexes, drawn from the
    /// game seed.
    fn setup(&self, def: &GameDefinition, state: &mut GameState) {
        let pick = METRO_CANDIDATES[state.rng.gen_range(0..METRO_CANDIDATES.len())];
        let hex = def
            .hex_by_name(pick)
            .unwrap_or_else(|| panic!("metro hex {pick} not on the map"));
        let tile = def
            .manifest
            .get("M1")
            .unwrap_or_else(|| panic!("metro tile missing from manifest"))
            .clone();
        state
            .tile_pool
            .consume("M1")
            .unwrap_or_else(|e| panic!("metro supply: {e}"));
        state.board.lay(hex, tile, 0);
        tracing::info!(hex = pick, "metropolis placed");
    }

    /// The metropolis only pays when a route terminates there.
    fn revenue_for(
        &self,
        _def: &GameDefinition,
        state: &GameState,
        corporation: crate::core::CorporationId,
        route: &Route,
        base: i64,
    ) -> Option<i64> {
        if let Some(metro) = Self::metro_hex(state) {
            let through = route.visits_hex(metro);
            let terminus = route
                .visits
                .first()
                .is_some_and(|n| n.hex == metro)
                || route.visits.last().is_some_and(|n| n.hex == metro);
            if through && !terminus {
                return None;
            }
        }
        Some(base + hex_bonus_total(state, corporation, route))
    }
}
