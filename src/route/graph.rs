//! Track connectivity graph.
//!
//! The board's laid tiles induce a graph whose vertices are revenue-center
//! nodes (cities, towns, offboards, halts, junctions) and whose edges are
//! *connections*: maximal runs of track segments joining two nodes, possibly
//! crossing several hexes through plain edge-to-edge track. The route
//! finder walks this graph; track-overlap rules compare the underlying
//! segment sets.
//!
//! The graph is rebuilt from the board whenever routes are evaluated;
//! nothing here is persisted.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::core::HexId;
use crate::map::{Board, HexCoord, PathEnd};

/// A revenue-center node: hex plus node index on its tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    /// The hex.
    pub hex: HexId,
    /// Node index (`_K`) on the hex's current tile.
    pub node: u8,
}

impl NodeRef {
    /// Create a node reference.
    #[must_use]
    pub const fn new(hex: HexId, node: u8) -> Self {
        Self { hex, node }
    }
}

/// One track segment: a single path part on a hex's current tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId {
    /// The hex.
    pub hex: HexId,
    /// Path index in the tile's path order.
    pub path: u8,
}

/// A connection between two nodes.
#[derive(Clone, Debug)]
pub struct Connection {
    /// One endpoint.
    pub from: NodeRef,
    /// The other endpoint.
    pub to: NodeRef,
    /// Track segments the connection occupies.
    pub segments: SmallVec<[SegmentId; 4]>,
    /// Hexes traversed, endpoints included.
    pub hexes: SmallVec<[HexId; 4]>,
}

impl Connection {
    /// The endpoint opposite `node`.
    #[must_use]
    pub fn other(&self, node: NodeRef) -> NodeRef {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }
}

/// The full connectivity graph for a board.
#[derive(Clone, Debug, Default)]
pub struct TrackGraph {
    connections: Vec<Connection>,
    adjacency: FxHashMap<NodeRef, Vec<usize>>,
}

impl TrackGraph {
    /// Build the graph from the current board.
    ///
    /// `coords` gives each hex's fixed coordinate, indexed by [`HexId`],
    /// used to resolve edge adjacency.
    #[must_use]
    pub fn build(board: &Board, coords: &[HexCoord]) -> Self {
        let by_coord: FxHashMap<HexCoord, HexId> = coords
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, HexId::new(i as u16)))
            .collect();

        let mut graph = Self::default();
        let mut seen: FxHashSet<(NodeRef, NodeRef, SmallVec<[SegmentId; 4]>)> = FxHashSet::default();

        for (hex_id, hex) in board.iter() {
            for node in 0..hex.tile.node_count() as u8 {
                let start = NodeRef::new(hex_id, node);
                for (path_idx, (a, b)) in hex.absolute_paths().enumerate() {
                    let other_end = if a == PathEnd::Node(node) {
                        b
                    } else if b == PathEnd::Node(node) {
                        a
                    } else {
                        continue;
                    };

                    let segment = SegmentId {
                        hex: hex_id,
                        path: path_idx as u8,
                    };
                    let mut segments = SmallVec::new();
                    segments.push(segment);
                    let mut hexes = SmallVec::new();
                    hexes.push(hex_id);

                    walk(
                        board,
                        coords,
                        &by_coord,
                        start,
                        hex_id,
                        other_end,
                        segments,
                        hexes,
                        &mut graph,
                        &mut seen,
                    );
                }
            }
        }

        graph
    }

    /// Connections incident to a node.
    pub fn connections_at(&self, node: NodeRef) -> impl Iterator<Item = &Connection> {
        self.adjacency
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&i| &self.connections[i])
    }

    /// All connections.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn insert(&mut self, connection: Connection) {
        let index = self.connections.len();
        self.adjacency
            .entry(connection.from)
            .or_default()
            .push(index);
        if connection.to != connection.from {
            self.adjacency.entry(connection.to).or_default().push(index);
        }
        self.connections.push(connection);
    }
}

/// Follow track from `start` through `end` (an endpoint on `hex`) until a
/// node terminates the run, recording each completed connection once.
#[allow(clippy::too_many_arguments)]
fn walk(
    board: &Board,
    coords: &[HexCoord],
    by_coord: &FxHashMap<HexCoord, HexId>,
    start: NodeRef,
    hex: HexId,
    end: PathEnd,
    segments: SmallVec<[SegmentId; 4]>,
    hexes: SmallVec<[HexId; 4]>,
    graph: &mut TrackGraph,
    seen: &mut FxHashSet<(NodeRef, NodeRef, SmallVec<[SegmentId; 4]>)>,
) {
    match end {
        PathEnd::Node(n) => {
            let to = NodeRef::new(hex, n);
            // Each connection is discovered from both ends; canonicalize so
            // it is inserted once.
            let (a, b) = if start <= to { (start, to) } else { (to, start) };
            let mut canonical = segments.clone();
            canonical.sort_unstable();
            if seen.insert((a, b, canonical)) {
                graph.insert(Connection {
                    from: start,
                    to,
                    segments,
                    hexes,
                });
            }
        }
        PathEnd::Edge(edge) => {
            let neighbor_coord = coords[hex.index()].neighbor(edge);
            let Some(&neighbor) = by_coord.get(&neighbor_coord) else {
                return;
            };
            // No revisiting a hex within one connection run.
            if hexes.contains(&neighbor) {
                return;
            }
            let entry = PathEnd::Edge(HexCoord::opposite(edge));
            let neighbor_hex = board.hex(neighbor);
            for (path_idx, (a, b)) in neighbor_hex.absolute_paths().enumerate() {
                let next_end = if a == entry {
                    b
                } else if b == entry {
                    a
                } else {
                    continue;
                };
                let mut segments = segments.clone();
                segments.push(SegmentId {
                    hex: neighbor,
                    path: path_idx as u8,
                });
                let mut hexes = hexes.clone();
                hexes.push(neighbor);
                walk(
                    board, coords, by_coord, start, neighbor, next_end, segments, hexes, graph,
                    seen,
                );
            }
        }
    }
}

/// Every hex reachable from the given nodes by following laid track.
///
/// Unlike [`TrackGraph::build`], this does not stop at revenue centers, and
/// it includes hexes whose track dead-ends short of the next center. Track
/// steps use it to validate that a lay or token extends the corporation's
/// network.
#[must_use]
pub fn reachable_hexes(
    board: &Board,
    coords: &[HexCoord],
    starts: &[NodeRef],
) -> FxHashSet<HexId> {
    let by_coord: FxHashMap<HexCoord, HexId> = coords
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, HexId::new(i as u16)))
        .collect();

    let mut reached: FxHashSet<HexId> = FxHashSet::default();
    let mut visited: FxHashSet<SegmentId> = FxHashSet::default();
    let mut stack: Vec<(HexId, PathEnd)> = starts
        .iter()
        .map(|n| (n.hex, PathEnd::Node(n.node)))
        .collect();

    while let Some((hex_id, entry)) = stack.pop() {
        let hex = board.hex(hex_id);
        if let PathEnd::Edge(e) = entry {
            if !hex.connects_edge(e) {
                continue;
            }
        }
        reached.insert(hex_id);

        for (path_idx, (a, b)) in hex.absolute_paths().enumerate() {
            let other = if a == entry {
                b
            } else if b == entry {
                a
            } else {
                continue;
            };
            let segment = SegmentId {
                hex: hex_id,
                path: path_idx as u8,
            };
            if !visited.insert(segment) {
                continue;
            }
            match other {
                PathEnd::Node(n) => stack.push((hex_id, PathEnd::Node(n))),
                PathEnd::Edge(e) => {
                    if let Some(&neighbor) = by_coord.get(&coords[hex_id.index()].neighbor(e)) {
                        stack.push((neighbor, PathEnd::Edge(HexCoord::opposite(e))));
                    }
                }
            }
        }
    }
    reached
}
