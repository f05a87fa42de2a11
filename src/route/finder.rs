//! Route finding and revenue maximization.
//!
//! For each train the finder enumerates candidate routes by depth-first
//! search from the corporation's token cities: two half-routes are walked
//! outward from a token node and joined there, so the token may sit anywhere
//! along the final route. Candidates respect the train's distance class, a
//! no-hex-revisit rule, and offboard termination; halts are passed through
//! without consuming a stop but add their bypass revenue.
//!
//! Across trains, a branch-and-bound search picks the combination of
//! track-disjoint routes with maximum total adjusted revenue, pruned by the
//! sum of each remaining train's best candidate. Ties keep the combination
//! found first. A train with no legal route contributes zero.

use rustc_hash::FxHashSet;

use crate::core::{HexId, TrainId};
use crate::map::{Board, Part, TileColor};
use crate::train::Distance;

use super::graph::{NodeRef, SegmentId, TrackGraph};

/// Bounds keeping pathological boards from exploding the search.
const MAX_HALVES_PER_START: usize = 512;
const MAX_CANDIDATES_PER_TRAIN: usize = 2048;

/// A computed route for one train. Ephemeral: recomputed every evaluation.
#[derive(Clone, Debug)]
pub struct Route {
    /// The train running this route.
    pub train: TrainId,
    /// Every node visited in order, pass-through halts and junctions
    /// included.
    pub visits: Vec<NodeRef>,
    /// Revenue stops in visit order.
    pub stops: Vec<NodeRef>,
    /// Track segments used, sorted for overlap comparison.
    pub segments: Vec<SegmentId>,
    /// Hexes visited, in visit order.
    pub hexes: Vec<HexId>,
    /// Bonus-adjusted revenue.
    pub revenue: i64,
}

impl Route {
    /// True if two routes share any track segment.
    #[must_use]
    pub fn overlaps(&self, other: &Route) -> bool {
        // Both segment lists are sorted.
        let (mut i, mut j) = (0, 0);
        while i < self.segments.len() && j < other.segments.len() {
            match self.segments[i].cmp(&other.segments[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    /// True if the route visits the given hex.
    #[must_use]
    pub fn visits_hex(&self, hex: HexId) -> bool {
        self.hexes.contains(&hex)
    }
}

/// One direction of a route under construction.
#[derive(Clone, Debug)]
struct Half {
    visits: Vec<NodeRef>,
    segments: Vec<SegmentId>,
    hexes: FxHashSet<HexId>,
    cities: u32,
    towns: u32,
}

impl Half {
    fn trivial() -> Self {
        Self {
            visits: Vec::new(),
            segments: Vec::new(),
            hexes: FxHashSet::default(),
            cities: 0,
            towns: 0,
        }
    }
}

/// Route finder over a built track graph.
pub struct RouteFinder<'a> {
    graph: &'a TrackGraph,
    board: &'a Board,
    phase_color: TileColor,
    allow_shared_track: bool,
}

impl<'a> RouteFinder<'a> {
    /// Create a finder for the current board and phase.
    #[must_use]
    pub fn new(graph: &'a TrackGraph, board: &'a Board, phase_color: TileColor) -> Self {
        Self {
            graph,
            board,
            phase_color,
            allow_shared_track: false,
        }
    }

    /// Permit the corporation's trains to share track segments (rule-set
    /// specific; off by default).
    #[must_use]
    pub fn allow_shared_track(mut self, allow: bool) -> Self {
        self.allow_shared_track = allow;
        self
    }

    fn part_at(&self, node: NodeRef) -> &Part {
        self.board
            .hex(node.hex)
            .tile
            .node(node.node)
            .unwrap_or_else(|| panic!("graph node {node:?} missing from its tile"))
    }

    /// Candidate routes for one train, best revenue first.
    ///
    /// `adjust` is the variant revenue hook: it receives the route and its
    /// base revenue and returns the adjusted value, or `None` if the route
    /// is illegal under variant rules (terminus violations).
    pub fn candidates<F>(
        &self,
        train: TrainId,
        distance: Distance,
        starts: &[NodeRef],
        adjust: &F,
    ) -> Vec<Route>
    where
        F: Fn(&Route, i64) -> Option<i64>,
    {
        let mut out: Vec<Route> = Vec::new();

        for &start in starts {
            let halves = self.halves_from(start, distance);
            let (start_cities, start_towns) = self.stop_tally(start);

            for i in 0..halves.len() {
                for j in i..halves.len() {
                    if i == 0 && j == 0 {
                        continue;
                    }
                    let (left, right) = (&halves[i], &halves[j]);
                    if i == j || !self.compatible(start, left, right) {
                        continue;
                    }

                    let cities = left.cities + right.cities + start_cities;
                    let towns = left.towns + right.towns + start_towns;
                    if cities + towns < 2 || !distance.allows(cities, towns) {
                        continue;
                    }

                    let route = self.assemble(train, start, left, right);
                    let base = self.base_revenue(&route);
                    if let Some(revenue) = adjust(&route, base) {
                        let mut route = route;
                        route.revenue = revenue;
                        out.push(route);
                        if out.len() >= MAX_CANDIDATES_PER_TRAIN {
                            break;
                        }
                    }
                }
            }
        }

        out.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        out
    }

    /// The optimal disjoint assignment of routes to the given trains.
    ///
    /// Trains with no legal candidate are simply absent from the result.
    pub fn best_routes<F>(
        &self,
        trains: &[(TrainId, Distance)],
        starts: &[NodeRef],
        adjust: &F,
    ) -> Vec<Route>
    where
        F: Fn(&Route, i64) -> Option<i64>,
    {
        let per_train: Vec<Vec<Route>> = trains
            .iter()
            .map(|&(train, distance)| self.candidates(train, distance, starts, adjust))
            .collect();

        // Upper bound for pruning: best candidate of each remaining train.
        let best_suffix: Vec<i64> = {
            let mut suffix = vec![0; per_train.len() + 1];
            for i in (0..per_train.len()).rev() {
                let best = per_train[i].first().map_or(0, |r| r.revenue);
                suffix[i] = suffix[i + 1] + best;
            }
            suffix
        };

        let mut best_total = -1;
        let mut best_set: Vec<Route> = Vec::new();
        let mut chosen: Vec<Route> = Vec::new();
        self.search(
            &per_train,
            &best_suffix,
            0,
            0,
            &mut chosen,
            &mut best_total,
            &mut best_set,
        );
        best_set
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        per_train: &[Vec<Route>],
        best_suffix: &[i64],
        index: usize,
        total: i64,
        chosen: &mut Vec<Route>,
        best_total: &mut i64,
        best_set: &mut Vec<Route>,
    ) {
        if index == per_train.len() {
            // Strict improvement only: ties keep the first combination.
            if total > *best_total {
                *best_total = total;
                *best_set = chosen.clone();
            }
            return;
        }
        if total + best_suffix[index] <= *best_total {
            return;
        }

        for candidate in &per_train[index] {
            if !self.allow_shared_track && chosen.iter().any(|r| r.overlaps(candidate)) {
                continue;
            }
            chosen.push(candidate.clone());
            self.search(
                per_train,
                best_suffix,
                index + 1,
                total + candidate.revenue,
                chosen,
                best_total,
                best_set,
            );
            chosen.pop();
        }

        // This train sits the turn out.
        self.search(
            per_train,
            best_suffix,
            index + 1,
            total,
            chosen,
            best_total,
            best_set,
        );
    }

    /// Enumerate half-routes outward from a start node. Index 0 is the
    /// trivial (empty) half.
    fn halves_from(&self, start: NodeRef, distance: Distance) -> Vec<Half> {
        let mut halves = vec![Half::trivial()];
        let mut current = Half::trivial();
        current.hexes.insert(start.hex);
        self.extend(start, distance, &mut current, &mut halves);
        halves
    }

    fn extend(&self, from: NodeRef, distance: Distance, current: &mut Half, out: &mut Vec<Half>) {
        if out.len() >= MAX_HALVES_PER_START {
            return;
        }
        for connection in self.graph.connections_at(from) {
            let next = connection.other(from);
            if connection
                .segments
                .iter()
                .any(|s| current.segments.contains(s))
            {
                continue;
            }
            // No hex revisits within one route; the shared endpoint hex of
            // consecutive connections is exempt.
            if connection
                .hexes
                .iter()
                .any(|&h| h != from.hex && current.hexes.contains(&h))
            {
                continue;
            }

            let (cities, towns) = self.stop_tally(next);
            let new_cities = current.cities + cities;
            let new_towns = current.towns + towns;
            // Reserve the start stop: a half may use at most the full
            // distance minus nothing here; the joint check happens at
            // combination time, this prunes hopeless branches.
            if !distance.allows(new_cities, new_towns) {
                continue;
            }

            let saved_len = current.visits.len();
            let saved_seg = current.segments.len();
            let added_hexes: Vec<HexId> = connection
                .hexes
                .iter()
                .copied()
                .filter(|h| !current.hexes.contains(h))
                .collect();

            current.visits.push(next);
            current.segments.extend(connection.segments.iter().copied());
            current.hexes.extend(added_hexes.iter().copied());
            current.cities = new_cities;
            current.towns = new_towns;

            out.push(current.clone());

            // Offboards terminate a route; everything else may continue.
            if !matches!(self.part_at(next), Part::Offboard { .. }) {
                self.extend(next, distance, current, out);
            }

            current.visits.truncate(saved_len);
            current.segments.truncate(saved_seg);
            for h in added_hexes {
                current.hexes.remove(&h);
            }
            current.cities -= cities;
            current.towns -= towns;
        }
    }

    /// (cities, towns) contributed by stopping at a node.
    fn stop_tally(&self, node: NodeRef) -> (u32, u32) {
        match self.part_at(node) {
            Part::City { .. } | Part::Offboard { .. } => (1, 0),
            Part::Town { .. } => (0, 1),
            _ => (0, 0),
        }
    }

    fn compatible(&self, start: NodeRef, left: &Half, right: &Half) -> bool {
        if left
            .segments
            .iter()
            .any(|s| right.segments.contains(s))
        {
            return false;
        }
        // The two halves may only share the start hex.
        left.hexes
            .intersection(&right.hexes)
            .all(|&h| h == start.hex)
    }

    fn assemble(&self, train: TrainId, start: NodeRef, left: &Half, right: &Half) -> Route {
        let mut visits: Vec<NodeRef> = left.visits.iter().rev().copied().collect();
        visits.push(start);
        visits.extend(right.visits.iter().copied());

        let stops: Vec<NodeRef> = visits
            .iter()
            .copied()
            .filter(|&n| self.part_at(n).is_stop())
            .collect();

        let mut segments: Vec<SegmentId> = left
            .segments
            .iter()
            .chain(right.segments.iter())
            .copied()
            .collect();
        segments.sort_unstable();

        let mut hexes: Vec<HexId> = Vec::new();
        for node in &visits {
            if !hexes.contains(&node.hex) {
                hexes.push(node.hex);
            }
        }

        Route {
            train,
            visits,
            stops,
            segments,
            hexes,
            revenue: 0,
        }
    }

    /// Base revenue: per-stop revenue at the current phase color, plus halt
    /// bypass revenue for halts passed through.
    fn base_revenue(&self, route: &Route) -> i64 {
        route
            .visits
            .iter()
            .map(|&n| self.part_at(n).revenue_at(self.phase_color))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HexCoord, HexState, Tile};

    fn no_adjust(_: &Route, base: i64) -> Option<i64> {
        Some(base)
    }

    /// A fork: center city C connects to city A (30) and city B (40), with
    /// no track between A and B.
    fn fork_board() -> (Board, Vec<HexCoord>) {
        let a = Tile::from_code("A", TileColor::Yellow, "city=revenue:30;path=a:4,b:_0").unwrap();
        let center = Tile::from_code(
            "C",
            TileColor::Yellow,
            "city=revenue:20;path=a:1,b:_0;path=a:4,b:_0",
        )
        .unwrap();
        let b = Tile::from_code("B", TileColor::Yellow, "city=revenue:40;path=a:1,b:_0").unwrap();

        let coords = vec![
            HexCoord::new(0, 0),
            HexCoord::new(0, 2),
            HexCoord::new(0, 4),
        ];
        let board = Board::new(vec![
            HexState::preprinted(a),
            HexState::preprinted(center),
            HexState::preprinted(b),
        ]);
        (board, coords)
    }

    fn center_start() -> Vec<NodeRef> {
        vec![NodeRef::new(HexId::new(1), 0)]
    }

    #[test]
    fn test_distance_two_picks_richer_city() {
        // Two reachable cities (30 and 40) but a 2-train cannot combine
        // both with the tokened center: it must pick 20+40.
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        let routes = finder.best_routes(
            &[(TrainId::new(0), Distance::Simple(2))],
            &center_start(),
            &no_adjust,
        );

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].revenue, 60);
        assert!(routes[0].visits_hex(HexId::new(2)));
        assert!(!routes[0].visits_hex(HexId::new(0)));
    }

    #[test]
    fn test_distance_three_takes_all() {
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        let routes = finder.best_routes(
            &[(TrainId::new(0), Distance::Simple(3))],
            &center_start(),
            &no_adjust,
        );

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].revenue, 90);
        assert_eq!(routes[0].stops.len(), 3);
    }

    #[test]
    fn test_route_legality_no_repeated_hex() {
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        let candidates = finder.candidates(
            TrainId::new(0),
            Distance::Simple(4),
            &center_start(),
            &no_adjust,
        );
        for route in &candidates {
            let mut hexes = route.hexes.clone();
            hexes.sort_unstable();
            hexes.dedup();
            assert_eq!(hexes.len(), route.hexes.len(), "repeated hex in route");
            assert!(route.stops.len() <= 4);
        }
    }

    #[test]
    fn test_two_trains_disjoint_track() {
        // Both trains start from the same token; track from center to B can
        // serve only one of them, the other takes center-A.
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        let routes = finder.best_routes(
            &[
                (TrainId::new(0), Distance::Simple(2)),
                (TrainId::new(1), Distance::Simple(2)),
            ],
            &center_start(),
            &no_adjust,
        );

        assert_eq!(routes.len(), 2);
        assert!(!routes[0].overlaps(&routes[1]));
        let total: i64 = routes.iter().map(|r| r.revenue).sum();
        // 20+40 and 20+30.
        assert_eq!(total, 110);
    }

    #[test]
    fn test_no_route_contributes_zero() {
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        // Start from city A's node with everything blocked by the hook.
        let reject = |_: &Route, _: i64| -> Option<i64> { None };
        let routes = finder.best_routes(
            &[(TrainId::new(0), Distance::Simple(2))],
            &center_start(),
            &reject,
        );
        assert!(routes.is_empty());
    }

    #[test]
    fn test_adjust_hook_applied() {
        let (board, coords) = fork_board();
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        // Flat +15 on every route.
        let bonus = |_: &Route, base: i64| -> Option<i64> { Some(base + 15) };
        let routes = finder.best_routes(
            &[(TrainId::new(0), Distance::Simple(2))],
            &center_start(),
            &bonus,
        );
        assert_eq!(routes[0].revenue, 75);
    }

    #[test]
    fn test_halt_does_not_consume_stop() {
        // A halt between two cities: a 2-train can still reach both, and
        // collects the halt's bypass revenue.
        let a = Tile::from_code("A", TileColor::Yellow, "city=revenue:30;path=a:4,b:_0").unwrap();
        let halt =
            Tile::from_code("H", TileColor::Yellow, "halt=revenue:10;path=a:1,b:_0;path=a:4,b:_0")
                .unwrap();
        let b = Tile::from_code("B", TileColor::Yellow, "city=revenue:40;path=a:1,b:_0").unwrap();
        let coords = vec![
            HexCoord::new(0, 0),
            HexCoord::new(0, 2),
            HexCoord::new(0, 4),
        ];
        let board = Board::new(vec![
            HexState::preprinted(a),
            HexState::preprinted(halt),
            HexState::preprinted(b),
        ]);
        let graph = TrackGraph::build(&board, &coords);
        let finder = RouteFinder::new(&graph, &board, TileColor::Yellow);

        let routes = finder.best_routes(
            &[(TrainId::new(0), Distance::Simple(2))],
            &[NodeRef::new(HexId::new(0), 0)],
            &no_adjust,
        );

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].stops.len(), 2);
        assert_eq!(routes[0].revenue, 80);
    }
}
