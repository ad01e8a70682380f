//! A* pathfinding over tile nodes
//!
//! Searches with the same walk/jump/fall move model the navigation graph is
//! built from. Nodes live in a per-search pool and link to their parent by
//! index, so the pool can grow freely while the search runs.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use bevy::prelude::*;

use crate::ai::moves::{MoveEdge, MoveKind, MoveModel, is_walkable};
use crate::helpers::chebyshev;
use crate::tuning::{NavConfig, PhysicsTweaks};
use crate::world::TileOracle;

/// Search-time node. Also the element type of a returned [`Path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavNode {
    pub col: i32,
    pub row: i32,
    /// Cost from start to this node
    pub g_score: f32,
    /// g + heuristic
    pub f_score: f32,
    /// Index of the parent in the search pool (None for the start)
    pub parent: Option<usize>,
    /// Move used to arrive here (Walk for the start node)
    pub move_kind: MoveKind,
}

impl NavNode {
    pub fn tile(&self) -> IVec2 {
        IVec2::new(self.col, self.row)
    }
}

/// Ordered nodes from start (inclusive) to goal. Empty means "no path".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub nodes: Vec<NavNode>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hand-built path from (tile, kind) steps. Scores follow step count.
    pub fn from_steps(steps: &[(IVec2, MoveKind)]) -> Self {
        let nodes = steps
            .iter()
            .enumerate()
            .map(|(i, (tile, kind))| NavNode {
                col: tile.x,
                row: tile.y,
                g_score: i as f32,
                f_score: i as f32,
                parent: i.checked_sub(1),
                move_kind: *kind,
            })
            .collect();
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of moves (one less than the node count)
    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Moves of `kind`, not counting the start node
    pub fn count_kind(&self, kind: MoveKind) -> usize {
        self.nodes.iter().skip(1).filter(|n| n.move_kind == kind).count()
    }

    pub fn tiles(&self) -> Vec<IVec2> {
        self.nodes.iter().map(NavNode::tile).collect()
    }

    pub fn first_tile(&self) -> Option<IVec2> {
        self.nodes.first().map(NavNode::tile)
    }

    pub fn last_tile(&self) -> Option<IVec2> {
        self.nodes.last().map(NavNode::tile)
    }

    pub fn total_cost(&self) -> f32 {
        self.nodes.last().map(|n| n.g_score).unwrap_or(0.0)
    }

    pub fn get(&self, index: usize) -> Option<&NavNode> {
        self.nodes.get(index)
    }
}

/// Why a search ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    /// Open set exhausted, or start/goal not walkable
    NoPath,
    /// Node cap reached before the goal was found
    NodeCapExceeded,
    /// Start or goal outside the grid
    OffGrid,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStatus::Found => write!(f, "found"),
            SearchStatus::NoPath => write!(f, "no_path"),
            SearchStatus::NodeCapExceeded => write!(f, "node_cap_exceeded"),
            SearchStatus::OffGrid => write!(f, "off_grid"),
        }
    }
}

/// Full search result for callers that care why a path is empty
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub path: Path,
    pub status: SearchStatus,
    /// Nodes pushed into the search pool
    pub nodes_opened: usize,
}

impl SearchOutcome {
    fn failed(status: SearchStatus, nodes_opened: usize) -> Self {
        Self {
            path: Path::empty(),
            status,
            nodes_opened,
        }
    }
}

/// Entry in the open set
struct OpenEntry {
    f_score: f32,
    /// Insertion order, breaks f-score ties (first found wins)
    seq: u64,
    /// Index into the node pool
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lower f_score, then earlier seq = higher priority)
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pack a tile into a 64-bit open/closed set key
pub fn tile_key(tile: IVec2) -> u64 {
    ((tile.x as u32 as u64) << 32) | tile.y as u32 as u64
}

/// On-demand A* search. Holds the move model only; the level is passed per call.
#[derive(Resource, Clone, Debug, Default)]
pub struct Pathfinder {
    model: MoveModel,
}

impl Pathfinder {
    pub fn new(model: MoveModel) -> Self {
        Self { model }
    }

    pub fn from_tuning(config: &NavConfig, tweaks: &PhysicsTweaks) -> Self {
        Self::new(MoveModel::new(config.clone(), tweaks))
    }

    pub fn model(&self) -> &MoveModel {
        &self.model
    }

    pub fn set_model(&mut self, model: MoveModel) {
        self.model = model;
    }

    /// Shortest path from `start` to `goal`, or an empty path
    pub fn find_path<O: TileOracle + ?Sized>(&self, oracle: &O, start: IVec2, goal: IVec2) -> Path {
        self.search(oracle, start, goal).path
    }

    /// A* search returning the path together with how the search ended
    pub fn search<O: TileOracle + ?Sized>(
        &self,
        oracle: &O,
        start: IVec2,
        goal: IVec2,
    ) -> SearchOutcome {
        if !oracle.in_bounds(start.x, start.y) || !oracle.in_bounds(goal.x, goal.y) {
            return SearchOutcome::failed(SearchStatus::OffGrid, 0);
        }
        if !is_walkable(oracle, start) || !is_walkable(oracle, goal) {
            return SearchOutcome::failed(SearchStatus::NoPath, 0);
        }

        let node_cap = self.model.config.node_cap;
        let mut pool: Vec<NavNode> = Vec::new();
        let mut best_g: HashMap<u64, f32> = HashMap::new();
        let mut closed: HashSet<u64> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;
        let mut edges: Vec<MoveEdge> = Vec::new();

        let h_start = heuristic(start, goal);
        pool.push(NavNode {
            col: start.x,
            row: start.y,
            g_score: 0.0,
            f_score: h_start,
            parent: None,
            move_kind: MoveKind::Walk,
        });
        best_g.insert(tile_key(start), 0.0);
        open.push(OpenEntry {
            f_score: h_start,
            seq,
            index: 0,
        });

        while let Some(entry) = open.pop() {
            let current = pool[entry.index];
            let key = tile_key(current.tile());

            if !closed.insert(key) {
                continue;
            }
            if current.tile() == goal {
                return SearchOutcome {
                    path: reconstruct_path(&pool, entry.index),
                    status: SearchStatus::Found,
                    nodes_opened: pool.len(),
                };
            }

            self.model.neighbors(oracle, current.tile(), &mut edges);
            for edge in &edges {
                let next_key = tile_key(edge.to);
                if closed.contains(&next_key) {
                    continue;
                }
                let tentative_g = current.g_score + edge.cost;
                match best_g.entry(next_key) {
                    Entry::Occupied(mut e) => {
                        if tentative_g >= *e.get() {
                            continue;
                        }
                        e.insert(tentative_g);
                    }
                    Entry::Vacant(e) => {
                        e.insert(tentative_g);
                    }
                }

                if pool.len() >= node_cap {
                    warn!(
                        "A* node cap ({}) exceeded searching {:?} -> {:?}",
                        node_cap, start, goal
                    );
                    return SearchOutcome::failed(SearchStatus::NodeCapExceeded, pool.len());
                }

                let f_score = tentative_g + heuristic(edge.to, goal);
                pool.push(NavNode {
                    col: edge.to.x,
                    row: edge.to.y,
                    g_score: tentative_g,
                    f_score,
                    parent: Some(entry.index),
                    move_kind: edge.kind,
                });
                seq += 1;
                open.push(OpenEntry {
                    f_score,
                    seq,
                    index: pool.len() - 1,
                });
            }
        }

        SearchOutcome::failed(SearchStatus::NoPath, pool.len())
    }
}

/// Chebyshev distance in tiles. Every move costs at least this much.
fn heuristic(from: IVec2, to: IVec2) -> f32 {
    chebyshev(from, to) as f32
}

/// Follow parent indices back from `goal_index`, then reverse
fn reconstruct_path(pool: &[NavNode], goal_index: usize) -> Path {
    let mut nodes = Vec::new();
    let mut current = Some(goal_index);
    while let Some(index) = current {
        let node = pool[index];
        nodes.push(node);
        current = node.parent;
    }
    nodes.reverse();
    Path { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::TileLevel;

    fn level(grid: &str) -> TileLevel {
        TileLevel::from_ascii("test", grid).unwrap()
    }

    fn corridor() -> TileLevel {
        level(
            "##########\n\
             ..........\n\
             ..........\n\
             ##########",
        )
    }

    #[test]
    fn test_corridor_path_is_all_walks() {
        let pf = Pathfinder::default();
        let path = pf.find_path(&corridor(), IVec2::new(1, 1), IVec2::new(8, 1));
        assert_eq!(path.len(), 8);
        assert_eq!(path.edge_count(), 7);
        assert_eq!(path.count_kind(MoveKind::Walk), 7);
        assert_eq!(path.first_tile(), Some(IVec2::new(1, 1)));
        assert_eq!(path.last_tile(), Some(IVec2::new(8, 1)));
        assert_eq!(path.total_cost(), 7.0);
    }

    #[test]
    fn test_start_equals_goal() {
        let pf = Pathfinder::default();
        let path = pf.find_path(&corridor(), IVec2::new(3, 1), IVec2::new(3, 1));
        assert_eq!(path.len(), 1);
        assert_eq!(path.edge_count(), 0);
    }

    #[test]
    fn test_off_grid_and_unwalkable() {
        let pf = Pathfinder::default();
        let lvl = corridor();
        let outcome = pf.search(&lvl, IVec2::new(-1, 1), IVec2::new(8, 1));
        assert_eq!(outcome.status, SearchStatus::OffGrid);
        assert!(outcome.path.is_empty());

        let outcome = pf.search(&lvl, IVec2::new(1, 2), IVec2::new(8, 1));
        assert_eq!(outcome.status, SearchStatus::NoPath);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_node_cap_returns_empty() {
        let config = NavConfig {
            node_cap: 3,
            ..default()
        };
        let pf = Pathfinder::from_tuning(&config, &PhysicsTweaks::default());
        let outcome = pf.search(&corridor(), IVec2::new(1, 1), IVec2::new(8, 1));
        assert_eq!(outcome.status, SearchStatus::NodeCapExceeded);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_prefers_walking_over_jumping() {
        // Two routes to the right: walking costs 1 per column, any jump costs more
        let lvl = level(
            "########\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ########",
        );
        let pf = Pathfinder::default();
        let path = pf.find_path(&lvl, IVec2::new(0, 1), IVec2::new(6, 1));
        assert_eq!(path.count_kind(MoveKind::Jump), 0);
        assert_eq!(path.edge_count(), 6);
    }

    #[test]
    fn test_every_step_is_legal() {
        let lvl = level(
            "############\n\
             ............\n\
             ............\n\
             ............\n\
             ............\n\
             ........####\n\
             ........####\n\
             .....#######\n\
             .....#######\n\
             ############",
        );
        let pf = Pathfinder::default();
        for goal in [IVec2::new(9, 5), IVec2::new(6, 3)] {
            let path = pf.find_path(&lvl, IVec2::new(1, 1), goal);
            assert!(!path.is_empty(), "no path to {:?}", goal);
            for pair in path.nodes.windows(2) {
                assert!(
                    pf.model()
                        .is_legal(&lvl, pair[0].tile(), pair[1].tile(), pair[1].move_kind),
                    "illegal {} from {:?} to {:?}",
                    pair[1].move_kind,
                    pair[0].tile(),
                    pair[1].tile()
                );
            }
        }
        // And back down again
        let down = pf.find_path(&lvl, IVec2::new(9, 5), IVec2::new(1, 1));
        assert!(down.count_kind(MoveKind::Fall) >= 1);
    }

    #[test]
    fn test_search_is_deterministic() {
        let lvl = corridor();
        let pf = Pathfinder::default();
        let a = pf.find_path(&lvl, IVec2::new(0, 1), IVec2::new(9, 1));
        let b = pf.find_path(&lvl, IVec2::new(0, 1), IVec2::new(9, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_cost_tie_goes_to_first_discovered() {
        // A lone block three rows up: step left then jump, or step right
        // then jump. Both cost 6 and reach the open set with equal f-scores.
        let lvl = level(
            ".......\n\
             .......\n\
             .......\n\
             .......\n\
             ...#...\n\
             .......\n\
             .......\n\
             #######",
        );
        let pf = Pathfinder::default();
        let start = IVec2::new(3, 1);
        let goal = IVec2::new(3, 4);
        assert!(pf.model().is_legal(&lvl, IVec2::new(2, 1), goal, MoveKind::Jump));
        assert!(pf.model().is_legal(&lvl, IVec2::new(4, 1), goal, MoveKind::Jump));

        // Walks are generated left first, so the left step is discovered first
        let path = pf.find_path(&lvl, start, goal);
        assert_eq!(path.tiles(), vec![start, IVec2::new(2, 1), goal]);
        assert_eq!(path.total_cost(), 6.0);
        assert_eq!(pf.find_path(&lvl, start, goal), path);
    }

    #[test]
    fn test_tile_key_is_unique_for_negative_coords() {
        assert_ne!(tile_key(IVec2::new(-1, 0)), tile_key(IVec2::new(0, -1)));
        assert_ne!(tile_key(IVec2::new(1, 2)), tile_key(IVec2::new(2, 1)));
    }
}
