//! Level database - parsing and storage

use bevy::prelude::*;
use std::fs;

use crate::constants::*;
use crate::world::{TileKind, TileOracle};

/// Enemy placement in level data
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Profile name from the AI profile database
    pub profile: String,
    pub tile: IVec2,
}

/// A loaded tile level. Implements [`TileOracle`] for navigation and physics.
///
/// Tiles are stored row-major with row 0 at the bottom.
#[derive(Resource, Clone, Debug)]
pub struct TileLevel {
    pub name: String,
    columns: i32,
    rows: i32,
    grid_size: f32,
    tiles: Vec<TileKind>,
    pub player_spawn: Option<IVec2>,
    pub enemy_spawns: Vec<EnemySpawn>,
}

impl TileLevel {
    /// Level with no tiles at all
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: 0,
            rows: 0,
            grid_size: TILE_SIZE,
            tiles: Vec::new(),
            player_spawn: None,
            enemy_spawns: Vec::new(),
        }
    }

    /// Parse an ASCII grid. The first text line is the highest row.
    ///
    /// `#` full block, `|` wall, `.` empty, `P` player spawn, `E` enemy spawn
    /// (default profile). Blank lines are ignored.
    pub fn from_ascii(name: &str, grid: &str) -> Result<Self, String> {
        let lines: Vec<&str> = grid
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        let rows = lines.len() as i32;
        let columns = lines.first().map(|l| l.chars().count() as i32).unwrap_or(0);
        let mut level = Self::empty(name);
        level.columns = columns;
        level.rows = rows;
        level.tiles = vec![TileKind::Empty; (columns * rows) as usize];

        for (line_idx, line) in lines.iter().enumerate() {
            if line.chars().count() as i32 != columns {
                return Err(format!(
                    "Level '{}': line {} has {} columns, expected {}",
                    name,
                    line_idx + 1,
                    line.chars().count(),
                    columns
                ));
            }
            let row = rows - 1 - line_idx as i32;
            for (col, ch) in line.chars().enumerate() {
                let col = col as i32;
                let kind = match ch {
                    '#' => TileKind::FullBlock,
                    '|' => TileKind::Wall,
                    '.' => TileKind::Empty,
                    'P' => {
                        level.player_spawn = Some(IVec2::new(col, row));
                        TileKind::Empty
                    }
                    'E' => {
                        level.enemy_spawns.push(EnemySpawn {
                            profile: "Stalker".to_string(),
                            tile: IVec2::new(col, row),
                        });
                        TileKind::Empty
                    }
                    other => {
                        return Err(format!(
                            "Level '{}': unknown tile '{}' at line {}",
                            name,
                            other,
                            line_idx + 1
                        ));
                    }
                };
                level.set_tile(col, row, kind);
            }
        }

        Ok(level)
    }

    pub fn tile(&self, col: i32, row: i32) -> TileKind {
        if !self.in_bounds(col, row) {
            return TileKind::Empty;
        }
        self.tiles[(row * self.columns + col) as usize]
    }

    /// Overwrite one tile (editor / tests). Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, col: i32, row: i32, kind: TileKind) {
        if self.in_bounds(col, row) {
            let idx = (row * self.columns + col) as usize;
            self.tiles[idx] = kind;
        }
    }
}

impl TileOracle for TileLevel {
    fn is_wall_tile(&self, col: i32, row: i32) -> bool {
        self.tile(col, row) == TileKind::Wall
    }

    fn is_full_block_tile(&self, col: i32, row: i32) -> bool {
        self.tile(col, row) == TileKind::FullBlock
    }

    fn grid_size(&self) -> f32 {
        self.grid_size
    }

    fn columns(&self) -> i32 {
        self.columns
    }

    fn rows(&self) -> i32 {
        self.rows
    }
}

/// Database of all loaded levels
#[derive(Resource, Default)]
pub struct LevelDatabase {
    pub levels: Vec<TileLevel>,
}

impl LevelDatabase {
    /// Load levels from file, returns default hardcoded levels on error
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("Failed to load levels from {}: {}, using defaults", path, e);
                Self::default_levels()
            }
        }
    }

    /// Parse level data from string
    ///
    /// ```text
    /// level: Corridor
    /// enemy: Shooter 6 1
    /// grid:
    /// ##########
    /// ..........
    /// #P........
    /// ##########
    /// end
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut levels = Vec::new();
        let mut name: Option<String> = None;
        let mut extra_enemies: Vec<EnemySpawn> = Vec::new();
        let mut grid: Option<String> = None;

        for raw in content.lines() {
            let line = raw.trim();

            // Grid lines are taken verbatim until `end`
            if let Some(rows) = grid.as_mut() {
                if line == "end" {
                    let level_name = name.take().unwrap_or_else(|| "Unnamed".to_string());
                    match TileLevel::from_ascii(&level_name, rows) {
                        Ok(mut level) => {
                            level.enemy_spawns.append(&mut extra_enemies);
                            levels.push(level);
                        }
                        Err(e) => warn!("Skipping level: {}", e),
                    }
                    extra_enemies.clear();
                    grid = None;
                } else {
                    rows.push_str(line);
                    rows.push('\n');
                }
                continue;
            }

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(level_name) = line.strip_prefix("level:") {
                name = Some(level_name.trim().to_string());
                extra_enemies.clear();
            } else if let Some(params) = line.strip_prefix("enemy:") {
                let parts: Vec<&str> = params.split_whitespace().collect();
                if parts.len() >= 3 {
                    if let (Ok(col), Ok(row)) = (parts[1].parse::<i32>(), parts[2].parse::<i32>()) {
                        extra_enemies.push(EnemySpawn {
                            profile: parts[0].to_string(),
                            tile: IVec2::new(col, row),
                        });
                    }
                }
            } else if line == "grid:" {
                grid = Some(String::new());
            }
        }

        if levels.is_empty() {
            warn!("No levels parsed, using defaults");
            return Self::default_levels();
        }

        info!("Loaded {} levels from file", levels.len());
        Self { levels }
    }

    /// Hardcoded fallback levels
    pub fn default_levels() -> Self {
        let sources = [
            (
                "Corridor",
                "##########\n\
                 ..........\n\
                 .P........\n\
                 ##########",
            ),
            (
                "Steps",
                "############\n\
                 ............\n\
                 ............\n\
                 ............\n\
                 ........####\n\
                 ........####\n\
                 .....#######\n\
                 .P...#######\n\
                 ############",
            ),
        ];

        let levels = sources
            .iter()
            .filter_map(|(name, grid)| TileLevel::from_ascii(name, grid).ok())
            .collect();
        Self { levels }
    }

    /// Get level by index
    pub fn get(&self, index: usize) -> Option<&TileLevel> {
        self.levels.get(index)
    }

    /// Get level by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&TileLevel> {
        self.levels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Get number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii_bottom_row_is_zero() {
        let level = TileLevel::from_ascii("t", "....\n.P..\n#|##").unwrap();
        assert_eq!(level.columns(), 4);
        assert_eq!(level.rows(), 3);
        assert!(level.is_full_block_tile(0, 0));
        assert!(level.is_wall_tile(1, 0));
        assert!(level.is_floor_tile(1, 0));
        assert!(!level.is_floor_tile(0, 2));
        assert_eq!(level.player_spawn, Some(IVec2::new(1, 1)));
    }

    #[test]
    fn test_from_ascii_rejects_ragged_rows() {
        assert!(TileLevel::from_ascii("t", "....\n...").is_err());
        assert!(TileLevel::from_ascii("t", "..x.").is_err());
    }

    #[test]
    fn test_out_of_bounds_queries_are_false() {
        let level = TileLevel::from_ascii("t", "##").unwrap();
        assert!(!level.is_floor_tile(-1, 0));
        assert!(!level.is_floor_tile(0, 5));
        assert!(level.blocks_movement(-1, 0));
    }

    #[test]
    fn test_parse_database() {
        let content = "\
# comment
level: Tiny
enemy: Shooter 2 1
grid:
....
.E..
####
end

level: Broken
grid:
...
..
end
";
        let db = LevelDatabase::parse(content);
        assert_eq!(db.len(), 1);
        let tiny = db.get_by_name("tiny").unwrap();
        assert_eq!(tiny.enemy_spawns.len(), 2);
        assert!(tiny
            .enemy_spawns
            .iter()
            .any(|s| s.profile == "Shooter" && s.tile == IVec2::new(2, 1)));
    }

    #[test]
    fn test_default_levels_parse() {
        let db = LevelDatabase::default_levels();
        assert_eq!(db.len(), 2);
    }
}
