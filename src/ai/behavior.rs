//! Enemy behaviors - per-frame decision policies
//!
//! A behavior looks at its own body, the target and the level's navigation
//! services and returns the intents for this frame. It never touches physics.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::intents::{ActionIntents, ActionKind};
use crate::ai::moves::is_walkable;
use crate::ai::navigation::NavGraph;
use crate::ai::pathfinding::{Pathfinder, SearchStatus};
use crate::ai::profiles::{AiProfile, BehaviorKind};
use crate::ai::steering::{AiMode, BodyView, PathFollower};
use crate::constants::*;
use crate::helpers::{chebyshev, tile_line};
use crate::world::{TileOracle, world_to_tile};

/// What a behavior gets to see each frame
#[derive(Clone, Copy, Debug)]
pub struct BehaviorContext {
    pub body: BodyView,
    /// Monotonic simulation frame
    pub frame: u64,
    /// Collision box of the entity being hunted, if any
    pub target: Option<Rect>,
}

/// Level-owned navigation services, borrowed for one update
#[derive(Clone, Copy)]
pub struct NavServices<'a> {
    pub graph: &'a NavGraph,
    pub pathfinder: &'a Pathfinder,
    pub oracle: &'a dyn TileOracle,
}

/// Pluggable enemy decision policy
pub trait Behavior: Send + Sync {
    fn name(&self) -> &str;

    /// Intents for this frame. `nav` is None until the level's navigation
    /// services exist; behaviors must then return neutral intents.
    fn update(
        &mut self,
        ctx: &BehaviorContext,
        follower: &mut PathFollower,
        nav: Option<NavServices<'_>>,
    ) -> ActionIntents;
}

/// Build the behavior a profile asks for. `seed` feeds the shooter's jitter.
pub fn create_behavior(profile: &AiProfile, seed: u64) -> Box<dyn Behavior> {
    match profile.behavior {
        BehaviorKind::Stalker => Box::new(StalkerBehavior::from_profile(profile)),
        BehaviorKind::Shooter => Box::new(ShooterBehavior::from_profile(profile, seed)),
        BehaviorKind::Patroller => {
            Box::new(ShooterBehavior::from_profile(profile, seed).without_shooting())
        }
    }
}

/// Tile of the target's feet
fn target_feet_tile(target: &Rect, grid_size: f32) -> IVec2 {
    world_to_tile(
        Vec2::new(target.center().x, target.min.y + COLLISION_EPSILON),
        grid_size,
    )
}

// =============================================================================
// STALKER
// =============================================================================

/// Walks, jumps and drops along A* paths toward the target
#[derive(Clone, Debug)]
pub struct StalkerBehavior {
    pub repath_interval: u64,
    pub stale_frames: u64,
    pub target_tolerance: i32,
}

impl Default for StalkerBehavior {
    fn default() -> Self {
        Self {
            repath_interval: STALKER_REPATH_INTERVAL,
            stale_frames: STALKER_STALE_FRAMES,
            target_tolerance: STALKER_TARGET_TOLERANCE,
        }
    }
}

impl StalkerBehavior {
    pub fn from_profile(profile: &AiProfile) -> Self {
        Self {
            repath_interval: profile.repath_interval,
            stale_frames: profile.stale_frames,
            target_tolerance: profile.target_tolerance,
        }
    }

    fn needs_repath(&self, follower: &PathFollower, goal: IVec2, frame: u64) -> bool {
        let Some(since) = follower.frames_since_repath(frame) else {
            return true;
        };
        if follower.is_exhausted() {
            return follower.goal != Some(goal) || since >= self.repath_interval;
        }
        let drift = follower
            .goal
            .map(|g| chebyshev(g, goal))
            .unwrap_or(i32::MAX);
        (since >= self.repath_interval && drift > self.target_tolerance)
            || since >= self.stale_frames
    }

    /// Walkable tile under the body. The center column can hang over a
    /// ledge while the body still stands on it, so the columns under either
    /// edge are tried too.
    fn start_tile(body: &BodyView, graph: &NavGraph) -> Option<IVec2> {
        let feet = body.feet_tile();
        if graph.is_walkable(feet) {
            return Some(feet);
        }
        let g = body.grid_size;
        [body.bounds.min.x + COLLISION_EPSILON, body.bounds.max.x - COLLISION_EPSILON]
            .into_iter()
            .map(|x| IVec2::new((x / g).floor() as i32, feet.y))
            .find(|t| graph.is_walkable(*t))
    }

    fn repath(
        &self,
        ctx: &BehaviorContext,
        follower: &mut PathFollower,
        nav: NavServices<'_>,
        goal: IVec2,
    ) {
        let Some(start) = Self::start_tile(&ctx.body, nav.graph) else {
            follower.clear();
            follower.last_repath_frame = Some(ctx.frame);
            follower.mode = AiMode::Idle;
            return;
        };

        // Skip the search entirely when the graph says it cannot succeed
        if !nav.graph.is_reachable(start, goal) {
            debug!(
                "Stalker: {:?} -> {:?} {:?}, holding",
                start,
                goal,
                nav.graph.reachability(start, goal)
            );
            follower.clear();
            follower.last_repath_frame = Some(ctx.frame);
            follower.mode = AiMode::Idle;
            return;
        }

        let outcome = nav.pathfinder.search(nav.oracle, start, goal);
        if outcome.status != SearchStatus::Found {
            debug!(
                "Stalker: search {:?} -> {:?} ended {} after {} nodes",
                start, goal, outcome.status, outcome.nodes_opened
            );
            follower.clear();
            follower.last_repath_frame = Some(ctx.frame);
            follower.mode = AiMode::Idle;
            return;
        }

        debug!(
            "Stalker: path {:?} -> {:?}, {} nodes",
            start,
            goal,
            outcome.path.len()
        );
        follower.set_path(outcome.path, goal, ctx.frame);
        follower.mode = AiMode::Pursuing;
    }
}

impl Behavior for StalkerBehavior {
    fn name(&self) -> &str {
        "stalker"
    }

    fn update(
        &mut self,
        ctx: &BehaviorContext,
        follower: &mut PathFollower,
        nav: Option<NavServices<'_>>,
    ) -> ActionIntents {
        let (Some(nav), Some(target)) = (nav, ctx.target) else {
            follower.mode = AiMode::Idle;
            return ActionIntents::neutral();
        };

        // Aim for where an airborne target will come down
        let target_tile = target_feet_tile(&target, ctx.body.grid_size);
        let Some(goal) = nav.graph.ground_tile_below(target_tile) else {
            follower.mode = AiMode::Idle;
            return ActionIntents::neutral();
        };

        if self.needs_repath(follower, goal, ctx.frame) {
            if ctx.body.on_ground {
                self.repath(ctx, follower, nav, goal);
            } else {
                // Finish the current move before searching again
                follower.mode = AiMode::Repath;
            }
        }

        match follower.follow(&ctx.body) {
            Some(intents) => intents,
            None => {
                if follower.mode == AiMode::Pursuing {
                    follower.mode = AiMode::Idle;
                }
                ActionIntents::neutral()
            }
        }
    }
}

// =============================================================================
// SHOOTER
// =============================================================================

/// Patrols near its spawn and fires at a visible target on a cooldown
#[derive(Clone, Debug)]
pub struct ShooterBehavior {
    /// Tiles
    pub sight_range: f32,
    pub fire_cooldown: u64,
    pub fire_jitter: u64,
    pub patrol_radius: i32,
    pub shoots: bool,
    home: Option<IVec2>,
    patrol_dir: i32,
    next_shot_frame: u64,
    rng: StdRng,
}

impl ShooterBehavior {
    pub fn from_profile(profile: &AiProfile, seed: u64) -> Self {
        Self {
            sight_range: profile.sight_range,
            fire_cooldown: profile.fire_cooldown,
            fire_jitter: profile.fire_jitter,
            patrol_radius: profile.patrol_radius,
            shoots: true,
            home: None,
            patrol_dir: 1,
            next_shot_frame: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Patrol only
    pub fn without_shooting(mut self) -> Self {
        self.shoots = false;
        self
    }

    pub fn home(&self) -> Option<IVec2> {
        self.home
    }

    /// Target within sight range with no blocking tile between the eye
    /// (one row above the feet) and the target's center tile
    pub fn can_see<O: TileOracle + ?Sized>(&self, oracle: &O, body: &BodyView, target: &Rect) -> bool {
        let eye = body.feet_tile() + IVec2::Y;
        let target_tile = world_to_tile(target.center(), body.grid_size);
        if (target_tile - eye).as_vec2().length() > self.sight_range {
            return false;
        }
        tile_line(eye, target_tile)
            .into_iter()
            .all(|t| !oracle.blocks_movement(t.x, t.y))
    }

    fn patrol<O: TileOracle + ?Sized>(&mut self, oracle: &O, body: &BodyView) -> ActionIntents {
        let mut intents = ActionIntents::neutral();
        if self.patrol_radius <= 0 || !body.on_ground {
            return intents;
        }
        let feet = body.feet_tile();
        let home = *self.home.get_or_insert(feet);

        let radius = self.patrol_radius;
        let open = |dir: i32| {
            let ahead = feet + IVec2::new(dir, 0);
            (ahead.x - home.x).abs() <= radius && is_walkable(oracle, ahead)
        };

        if !open(self.patrol_dir) {
            if open(-self.patrol_dir) {
                self.patrol_dir = -self.patrol_dir;
            } else {
                return intents;
            }
        }
        intents.set_move_x(self.patrol_dir as f32);
        intents
    }
}

impl Behavior for ShooterBehavior {
    fn name(&self) -> &str {
        if self.shoots { "shooter" } else { "patroller" }
    }

    fn update(
        &mut self,
        ctx: &BehaviorContext,
        follower: &mut PathFollower,
        nav: Option<NavServices<'_>>,
    ) -> ActionIntents {
        let Some(nav) = nav else {
            follower.mode = AiMode::Idle;
            return ActionIntents::neutral();
        };
        if let Some(target) = ctx.target.filter(|_| self.shoots) {
            if self.can_see(nav.oracle, &ctx.body, &target) {
                // Stand and engage
                follower.mode = AiMode::Engaging;
                let mut intents = ActionIntents::neutral();
                if ctx.frame >= self.next_shot_frame {
                    let delta = target.center() - ctx.body.bounds.center();
                    let aim_x = if delta.length() > 0.0 {
                        delta.x / delta.length()
                    } else {
                        0.0
                    };
                    intents.set(ActionKind::Shoot).set_value(ActionKind::AimX, aim_x);
                    let jitter = if self.fire_jitter > 0 {
                        self.rng.gen_range(0..=self.fire_jitter)
                    } else {
                        0
                    };
                    self.next_shot_frame = ctx.frame + self.fire_cooldown + jitter;
                }
                return intents;
            }
        }

        let intents = self.patrol(nav.oracle, &ctx.body);
        follower.mode = if intents.is_neutral() {
            AiMode::Idle
        } else {
            AiMode::Patrol
        };
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::TileLevel;

    fn body_rect(tile: IVec2) -> Rect {
        let center = Vec2::new(
            (tile.x as f32 + 0.5) * TILE_SIZE,
            tile.y as f32 * TILE_SIZE + BODY_SIZE.y / 2.0,
        );
        Rect::from_center_size(center, BODY_SIZE)
    }

    fn ctx(tile: IVec2, frame: u64, target: Option<IVec2>) -> BehaviorContext {
        BehaviorContext {
            body: BodyView {
                bounds: body_rect(tile),
                on_ground: true,
                grid_size: TILE_SIZE,
            },
            frame,
            target: target.map(body_rect),
        }
    }

    fn world(grid: &str) -> (TileLevel, NavGraph, Pathfinder) {
        let level = TileLevel::from_ascii("test", grid).unwrap();
        let pathfinder = Pathfinder::default();
        let mut graph = NavGraph::default();
        graph.build(&level, pathfinder.model());
        (level, graph, pathfinder)
    }

    const HALL: &str = "\
        ##########\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ##########";

    const DIVIDED: &str = "\
        ##########\n\
        .....#....\n\
        .....#....\n\
        .....#....\n\
        .....#....\n\
        ##########";

    #[test]
    fn test_stalker_without_nav_is_neutral() {
        let mut stalker = StalkerBehavior::default();
        let mut follower = PathFollower::default();
        let intents = stalker.update(&ctx(IVec2::new(1, 1), 0, Some(IVec2::new(8, 1))), &mut follower, None);
        assert!(intents.is_neutral());
        assert_eq!(follower.mode, AiMode::Idle);
    }

    #[test]
    fn test_stalker_paths_toward_target() {
        let (level, graph, pathfinder) = world(HALL);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let mut stalker = StalkerBehavior::default();
        let mut follower = PathFollower::default();

        let intents = stalker.update(&ctx(IVec2::new(1, 1), 0, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        assert_eq!(intents.move_x(), 1.0);
        assert_eq!(follower.mode, AiMode::Pursuing);
        assert_eq!(follower.goal, Some(IVec2::new(8, 1)));
        assert_eq!(follower.path.len(), 8);
    }

    #[test]
    fn test_stalker_throttles_repath() {
        let (level, graph, pathfinder) = world(HALL);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let mut stalker = StalkerBehavior::default();
        let mut follower = PathFollower::default();

        stalker.update(&ctx(IVec2::new(1, 1), 0, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        // Target drifted within tolerance before the interval: keep the path
        stalker.update(&ctx(IVec2::new(1, 1), 5, Some(IVec2::new(7, 1))), &mut follower, Some(nav));
        assert_eq!(follower.last_repath_frame, Some(0));
        assert_eq!(follower.goal, Some(IVec2::new(8, 1)));

        // Moved beyond tolerance but still inside the interval
        stalker.update(&ctx(IVec2::new(1, 1), 10, Some(IVec2::new(4, 1))), &mut follower, Some(nav));
        assert_eq!(follower.last_repath_frame, Some(0));

        // Interval elapsed: search again
        let frame = STALKER_REPATH_INTERVAL;
        stalker.update(&ctx(IVec2::new(1, 1), frame, Some(IVec2::new(4, 1))), &mut follower, Some(nav));
        assert_eq!(follower.last_repath_frame, Some(frame));
        assert_eq!(follower.goal, Some(IVec2::new(4, 1)));
    }

    #[test]
    fn test_stalker_holds_when_target_unreachable() {
        let (level, graph, pathfinder) = world(DIVIDED);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let mut stalker = StalkerBehavior::default();
        let mut follower = PathFollower::default();

        let intents = stalker.update(&ctx(IVec2::new(1, 1), 0, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        assert!(intents.is_neutral());
        assert_eq!(follower.mode, AiMode::Idle);
        assert!(follower.path.is_empty());
        // The attempt still counts toward throttling
        assert_eq!(follower.last_repath_frame, Some(0));
    }

    #[test]
    fn test_shooter_fires_at_visible_target_on_cooldown() {
        let (level, graph, pathfinder) = world(HALL);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let profile = AiProfile {
            fire_jitter: 0,
            ..AiProfile::default()
        };
        let mut shooter = ShooterBehavior::from_profile(&profile, 7);
        let mut follower = PathFollower::default();

        let intents = shooter.update(&ctx(IVec2::new(2, 1), 0, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        assert!(intents.is_set(ActionKind::Shoot));
        assert!(intents.value(ActionKind::AimX).unwrap() > 0.9);
        assert_eq!(intents.move_x(), 0.0);
        assert_eq!(follower.mode, AiMode::Engaging);

        let intents = shooter.update(&ctx(IVec2::new(2, 1), 1, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        assert!(!intents.is_set(ActionKind::Shoot));

        let frame = profile.fire_cooldown;
        let intents = shooter.update(&ctx(IVec2::new(2, 1), frame, Some(IVec2::new(0, 1))), &mut follower, Some(nav));
        assert!(intents.is_set(ActionKind::Shoot));
        assert!(intents.value(ActionKind::AimX).unwrap() < -0.9);
    }

    #[test]
    fn test_shooter_needs_line_of_sight() {
        let (level, graph, pathfinder) = world(DIVIDED);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let mut shooter = ShooterBehavior::from_profile(&AiProfile::default(), 1);
        let mut follower = PathFollower::default();

        let intents = shooter.update(&ctx(IVec2::new(2, 1), 0, Some(IVec2::new(8, 1))), &mut follower, Some(nav));
        assert!(!intents.is_set(ActionKind::Shoot));
        assert_eq!(follower.mode, AiMode::Patrol);
        assert_eq!(intents.move_x(), 1.0);
    }

    #[test]
    fn test_patrol_turns_at_radius() {
        let (level, graph, pathfinder) = world(HALL);
        let nav = NavServices { graph: &graph, pathfinder: &pathfinder, oracle: &level };
        let profile = AiProfile {
            patrol_radius: 2,
            ..AiProfile::default()
        };
        let mut patroller = ShooterBehavior::from_profile(&profile, 1).without_shooting();
        let mut follower = PathFollower::default();
        assert_eq!(patroller.name(), "patroller");

        let intents = patroller.update(&ctx(IVec2::new(4, 1), 0, Some(IVec2::new(6, 1))), &mut follower, Some(nav));
        assert!(!intents.is_set(ActionKind::Shoot));
        assert_eq!(intents.move_x(), 1.0);
        assert_eq!(patroller.home(), Some(IVec2::new(4, 1)));

        // Two tiles right of home: turn around
        let intents = patroller.update(&ctx(IVec2::new(6, 1), 1, None), &mut follower, Some(nav));
        assert_eq!(intents.move_x(), -1.0);
    }

    #[test]
    fn test_create_behavior_from_profile() {
        let db = crate::ai::AiProfileDatabase::builtin();
        let names: Vec<String> = ["Stalker", "Shooter", "Patroller"]
            .iter()
            .filter_map(|n| db.get_by_name(n))
            .map(|p| create_behavior(p, 0).name().to_string())
            .collect();
        assert_eq!(names, vec!["stalker", "shooter", "patroller"]);
    }
}
