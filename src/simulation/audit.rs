//! Reachability audit
//!
//! Cross-checks the nav graph's component lookup against real searches for
//! every ordered pair of walkable tiles. Pairs run in parallel with Rayon.

use bevy::prelude::*;
use rayon::prelude::*;

use crate::ai::{NavGraph, Pathfinder};
use crate::levels::TileLevel;
use crate::world::TileOracle;

/// Initialize the global Rayon pool. Zero keeps Rayon's default.
pub fn init_parallel(threads: usize) -> Result<(), String> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| format!("Failed to initialize Rayon thread pool: {}", e))?;
    }
    Ok(())
}

/// A pair where the graph and the search disagree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disagreement {
    pub start: IVec2,
    pub goal: IVec2,
    /// What `is_reachable` said
    pub graph_reachable: bool,
    /// Whether `find_path` returned a path
    pub path_found: bool,
}

/// Audit summary for one level
#[derive(Clone, Debug, Default)]
pub struct AuditReport {
    pub level: String,
    pub walkable_tiles: usize,
    pub components: usize,
    pub pairs_checked: usize,
    pub disagreements: Vec<Disagreement>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.disagreements.is_empty()
    }

    /// Pairs the graph calls reachable but search cannot route (one-way drops)
    pub fn one_way_count(&self) -> usize {
        self.disagreements
            .iter()
            .filter(|d| d.graph_reachable && !d.path_found)
            .count()
    }
}

/// Build the graph for `level` and compare it against search for all pairs
pub fn audit_level(level: &TileLevel, pathfinder: &Pathfinder) -> AuditReport {
    let mut nav_graph = NavGraph::default();
    nav_graph.build(level, pathfinder.model());

    let tiles: Vec<IVec2> = (0..level.rows())
        .flat_map(|row| (0..level.columns()).map(move |col| IVec2::new(col, row)))
        .filter(|&tile| nav_graph.is_walkable(tile))
        .collect();

    let disagreements: Vec<Disagreement> = tiles
        .par_iter()
        .flat_map_iter(|&start| {
            let nav_graph = &nav_graph;
            tiles.iter().filter_map(move |&goal| {
                let graph_reachable = nav_graph.is_reachable(start, goal);
                let path_found = !pathfinder.find_path(level, start, goal).is_empty();
                (graph_reachable != path_found).then_some(Disagreement {
                    start,
                    goal,
                    graph_reachable,
                    path_found,
                })
            })
        })
        .collect();

    AuditReport {
        level: level.name.clone(),
        walkable_tiles: tiles.len(),
        components: nav_graph.component_count(),
        pairs_checked: tiles.len() * tiles.len(),
        disagreements,
    }
}

/// Audit several levels, one after another. Pairs within each level run in
/// parallel.
pub fn audit_levels(levels: &[TileLevel], pathfinder: &Pathfinder) -> Vec<AuditReport> {
    levels.iter().map(|level| audit_level(level, pathfinder)).collect()
}
