//! Navigation graph - per-level connectivity of walkable tiles
//!
//! Built once per level load. Every walkable tile gets a component id; two
//! tiles are mutually reachable when they share one. Reachability queries are
//! a lookup and an equality test, so AI code can skip hopeless searches.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::ai::moves::{MoveEdge, MoveModel, is_walkable};
use crate::ai::pathfinding::Pathfinder;
use crate::levels::TileLevel;
use crate::tuning::{NavConfig, PhysicsTweaks};
use crate::world::TileOracle;

/// Component id of tiles that are not walkable
pub const INVALID_COMPONENT: u32 = u32::MAX;

/// Aggregate counts from the last build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavStats {
    pub walkable_tiles: usize,
    pub components: usize,
    /// Directed moves found between walkable tiles
    pub edges: usize,
}

/// Detailed answer to a reachability query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reachability {
    /// Graph has not been built for the current level
    NotBuilt,
    /// One of the tiles is off-grid or not walkable
    Unwalkable,
    Disconnected,
    Connected,
}

/// Resource containing the navigation graph for the current level
#[derive(Resource, Clone, Debug, Default)]
pub struct NavGraph {
    /// Component id per tile, indexed by `row * columns + col`
    components: Vec<u32>,
    columns: i32,
    rows: i32,
    built: bool,
    stats: NavStats,
    /// Tile count per component id
    component_sizes: Vec<usize>,
    /// Whether the graph needs rebuilding
    pub dirty: bool,
    /// Level name this graph was built for
    pub built_for_level: Option<String>,
}

impl NavGraph {
    /// Classify every tile and flood-fill walkable tiles into components.
    ///
    /// Components follow moves in both directions, so a one-way drop still
    /// joins the two areas it connects.
    pub fn build<O: TileOracle + ?Sized>(&mut self, oracle: &O, model: &MoveModel) {
        let columns = oracle.columns().max(0);
        let rows = oracle.rows().max(0);
        let count = (columns * rows) as usize;

        self.components = vec![INVALID_COMPONENT; count];
        self.component_sizes.clear();
        self.columns = columns;
        self.rows = rows;
        self.stats = NavStats::default();

        let mut walkable = vec![false; count];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut edges: Vec<MoveEdge> = Vec::new();

        for row in 0..rows {
            for col in 0..columns {
                let tile = IVec2::new(col, row);
                if !is_walkable(oracle, tile) {
                    continue;
                }
                let index = (row * columns + col) as usize;
                walkable[index] = true;
                self.stats.walkable_tiles += 1;

                model.neighbors(oracle, tile, &mut edges);
                self.stats.edges += edges.len();
                for edge in &edges {
                    let to = (edge.to.y * columns + edge.to.x) as usize;
                    adjacency[index].push(to);
                    adjacency[to].push(index);
                }
            }
        }

        let mut queue = VecDeque::new();
        for start in 0..count {
            if !walkable[start] || self.components[start] != INVALID_COMPONENT {
                continue;
            }
            let id = self.component_sizes.len() as u32;
            let mut size = 0;
            self.components[start] = id;
            queue.push_back(start);

            while let Some(index) = queue.pop_front() {
                size += 1;
                for &next in &adjacency[index] {
                    if walkable[next] && self.components[next] == INVALID_COMPONENT {
                        self.components[next] = id;
                        queue.push_back(next);
                    }
                }
            }
            self.component_sizes.push(size);
        }

        self.stats.components = self.component_sizes.len();
        self.built = true;

        info!(
            "Nav graph built: {} walkable tiles, {} components, {} edges",
            self.stats.walkable_tiles, self.stats.components, self.stats.edges
        );
        for (id, size) in self.component_sizes.iter().enumerate() {
            debug!("  Component {}: {} tiles", id, size);
        }
    }

    /// Forget the current level. Queries report `NotBuilt` until the next build.
    pub fn clear(&mut self) {
        *self = Self {
            dirty: true,
            ..default()
        };
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn stats(&self) -> NavStats {
        self.stats
    }

    pub fn component_count(&self) -> usize {
        self.component_sizes.len()
    }

    pub fn component_size(&self, id: u32) -> usize {
        self.component_sizes.get(id as usize).copied().unwrap_or(0)
    }

    /// Component id of a walkable tile
    pub fn component_of(&self, tile: IVec2) -> Option<u32> {
        if tile.x < 0 || tile.y < 0 || tile.x >= self.columns || tile.y >= self.rows {
            return None;
        }
        let id = self.components[(tile.y * self.columns + tile.x) as usize];
        (id != INVALID_COMPONENT).then_some(id)
    }

    pub fn is_walkable(&self, tile: IVec2) -> bool {
        self.component_of(tile).is_some()
    }

    /// Both tiles walkable and in the same component. False before a build.
    pub fn is_reachable(&self, a: IVec2, b: IVec2) -> bool {
        self.reachability(a, b) == Reachability::Connected
    }

    pub fn reachability(&self, a: IVec2, b: IVec2) -> Reachability {
        if !self.built {
            return Reachability::NotBuilt;
        }
        match (self.component_of(a), self.component_of(b)) {
            (Some(ca), Some(cb)) if ca == cb => Reachability::Connected,
            (Some(_), Some(_)) => Reachability::Disconnected,
            _ => Reachability::Unwalkable,
        }
    }

    /// First walkable tile at or below `tile` in its column (where an
    /// airborne body will land)
    pub fn ground_tile_below(&self, tile: IVec2) -> Option<IVec2> {
        if tile.x < 0 || tile.x >= self.columns {
            return None;
        }
        let top = tile.y.min(self.rows - 1);
        (0..=top)
            .rev()
            .map(|row| IVec2::new(tile.x, row))
            .find(|t| self.is_walkable(*t))
    }
}

/// Mark nav graph as dirty when the level changes
pub fn mark_nav_dirty_on_level_change(level: Res<TileLevel>, mut nav_graph: ResMut<NavGraph>) {
    if level.is_changed() {
        nav_graph.dirty = true;
    }
}

/// Rebuild the pathfinder's move model when physics or nav limits change
pub fn sync_move_model(
    tweaks: Res<PhysicsTweaks>,
    config: Res<NavConfig>,
    mut pathfinder: ResMut<Pathfinder>,
    mut nav_graph: ResMut<NavGraph>,
) {
    if tweaks.is_changed() || config.is_changed() {
        pathfinder.set_model(MoveModel::new(config.clone(), &tweaks));
        nav_graph.dirty = true;
    }
}

/// System to rebuild the navigation graph when the level changes
pub fn rebuild_nav_graph(
    level: Res<TileLevel>,
    pathfinder: Res<Pathfinder>,
    mut nav_graph: ResMut<NavGraph>,
) {
    let up_to_date = nav_graph.built_for_level.as_deref() == Some(level.name.as_str());
    if !nav_graph.dirty && nav_graph.is_built() && up_to_date {
        return;
    }

    info!("Rebuilding nav graph for level {}", level.name);
    nav_graph.build(&*level, pathfinder.model());
    nav_graph.built_for_level = Some(level.name.clone());
    nav_graph.dirty = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(grid: &str) -> (TileLevel, NavGraph) {
        let level = TileLevel::from_ascii("test", grid).unwrap();
        let mut graph = NavGraph::default();
        graph.build(&level, &MoveModel::default());
        (level, graph)
    }

    #[test]
    fn test_corridor_is_one_component() {
        let (_, graph) = build(
            "##########\n\
             ..........\n\
             ..........\n\
             ##########",
        );
        let stats = graph.stats();
        assert_eq!(stats.walkable_tiles, 10);
        assert_eq!(stats.components, 1);
        assert_eq!(stats.edges, 18);
        assert!(graph.is_reachable(IVec2::new(0, 1), IVec2::new(9, 1)));
        assert_eq!(graph.component_size(0), 10);
    }

    #[test]
    fn test_sealed_room_is_separate() {
        let (_, graph) = build(
            "############\n\
             #......#...#\n\
             #......#...#\n\
             #......#...#\n\
             ############",
        );
        assert_eq!(graph.component_count(), 2);
        assert!(!graph.is_reachable(IVec2::new(2, 1), IVec2::new(9, 1)));
        assert_eq!(
            graph.reachability(IVec2::new(2, 1), IVec2::new(9, 1)),
            Reachability::Disconnected
        );
        assert!(graph.is_reachable(IVec2::new(8, 1), IVec2::new(10, 1)));
    }

    #[test]
    fn test_queries_before_build() {
        let graph = NavGraph::default();
        assert!(!graph.is_built());
        assert!(!graph.is_reachable(IVec2::new(0, 0), IVec2::new(0, 0)));
        assert_eq!(
            graph.reachability(IVec2::new(0, 0), IVec2::new(0, 0)),
            Reachability::NotBuilt
        );
    }

    #[test]
    fn test_empty_level() {
        let level = TileLevel::empty("void");
        let mut graph = NavGraph::default();
        graph.build(&level, &MoveModel::default());
        assert!(graph.is_built());
        assert_eq!(graph.stats(), NavStats::default());
        assert_eq!(
            graph.reachability(IVec2::new(0, 0), IVec2::new(1, 0)),
            Reachability::Unwalkable
        );
    }

    #[test]
    fn test_rebuild_is_stable() {
        let (level, mut graph) = build(
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
        let before = graph.clone();
        graph.build(&level, &MoveModel::default());
        assert_eq!(before.stats(), graph.stats());
        for row in 0..level.rows() {
            for col in 0..level.columns() {
                let tile = IVec2::new(col, row);
                assert_eq!(before.component_of(tile), graph.component_of(tile));
            }
        }
    }

    #[test]
    fn test_reachability_agrees_with_search() {
        let (level, graph) = build(
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
        let pathfinder = Pathfinder::default();
        let walkable: Vec<IVec2> = (0..level.rows())
            .flat_map(|row| (0..level.columns()).map(move |col| IVec2::new(col, row)))
            .filter(|t| graph.is_walkable(*t))
            .collect();
        assert!(!walkable.is_empty());

        for &a in &walkable {
            for &b in &walkable {
                let found = !pathfinder.find_path(&level, a, b).is_empty();
                assert_eq!(
                    graph.is_reachable(a, b),
                    found,
                    "disagreement between {:?} and {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_ground_tile_below() {
        let (_, graph) = build(
            "######\n\
             ......\n\
             ......\n\
             ......\n\
             ......\n\
             ######",
        );
        assert_eq!(graph.ground_tile_below(IVec2::new(2, 3)), Some(IVec2::new(2, 1)));
        assert_eq!(graph.ground_tile_below(IVec2::new(2, 1)), Some(IVec2::new(2, 1)));
        assert_eq!(graph.ground_tile_below(IVec2::new(9, 3)), None);
    }

    #[test]
    fn test_systems_rebuild_on_level_change() {
        let mut app = App::new();
        app.insert_resource(
            TileLevel::from_ascii("first", "....\n....\n####").unwrap(),
        )
        .init_resource::<NavGraph>()
        .init_resource::<Pathfinder>()
        .init_resource::<PhysicsTweaks>()
        .init_resource::<NavConfig>()
        .add_systems(
            Update,
            (mark_nav_dirty_on_level_change, sync_move_model, rebuild_nav_graph).chain(),
        );

        app.update();
        let graph = app.world().resource::<NavGraph>();
        assert!(graph.is_built());
        assert_eq!(graph.built_for_level.as_deref(), Some("first"));
        assert_eq!(graph.stats().walkable_tiles, 4);

        app.insert_resource(TileLevel::from_ascii("second", "..\n..\n##").unwrap());
        app.update();
        let graph = app.world().resource::<NavGraph>();
        assert_eq!(graph.built_for_level.as_deref(), Some("second"));
        assert_eq!(graph.stats().walkable_tiles, 2);
        assert!(!graph.dirty);
    }
}
