/// Level loader.
///
/// ## Sources (priority order):
///   1. `map_<n>.toml` in the configured levels directory
///   2. Built-in embedded copy of the same map
///
/// ## Map format (TOML):
///   ```toml
///   name = "Sochi"                 # optional
///   tile_size = 64                 # optional, pixels
///   background_color = "#ADD8E6"   # optional
///
///   [layers]
///   Platforms  = ["....", "####"]  # row 0 = top of the map
///   Snowflake1 = []                # empty layer
///   Snowflake2 = [...]
///   Snowflake3 = [...]
///   Podium     = [...]
///   Background = [...]
///   Decor      = [...]
///
///   [[layers.Enemy]]
///   col = 10
///   row = 6
///   boundary_left = 400.0          # optional, world px
///   boundary_right = 900.0         # optional, world px
///   ```
///
/// Every layer name must be present. In grid layers `.` and ` ` are empty
/// cells and any other character is a tile. A non-empty grid layer must
/// have exactly as many rows as `Platforms`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::entity::{Collectible, Enemy, Player, Podium};
use crate::domain::physics::TileGrid;
use crate::domain::tile::{FlakeTier, Layer};
use crate::sim::camera::Camera;
use crate::sim::world::{Phase, Rgb, WorldState, DEFAULT_BACKGROUND};

/// Display names of the shipped levels, indexed by level number − 1.
pub const LEVEL_NAMES: [&str; 3] = ["Sochi", "Vancouver", "PyeongChang"];

const DEFAULT_TILE_SIZE: f32 = 64.0;

const EMBEDDED: [&str; 3] = [
    include_str!("../../levels/map_1.toml"),
    include_str!("../../levels/map_2.toml"),
    include_str!("../../levels/map_3.toml"),
];

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum LevelError {
    NotFound { level: u32, path: PathBuf },
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    MissingLayer(&'static str),
    LayerShape { layer: &'static str, expected: usize, found: usize },
    EnemyOutOfMap { index: usize, col: usize, row: usize },
    BadColor(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NotFound { level, path } => {
                write!(f, "level {level} not found (looked for {})", path.display())
            }
            LevelError::Io { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            LevelError::Parse(e) => write!(f, "invalid map file: {e}"),
            LevelError::MissingLayer(name) => write!(f, "map is missing layer '{name}'"),
            LevelError::LayerShape { layer, expected, found } => write!(
                f, "layer '{layer}' has {found} rows, expected {expected}",
            ),
            LevelError::EnemyOutOfMap { index, col, row } => write!(
                f, "enemy #{index} at col {col}, row {row} is outside the map",
            ),
            LevelError::BadColor(s) => write!(f, "invalid background_color '{s}' (want \"#RRGGBB\")"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io { source, .. } => Some(source),
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for LevelError {
    fn from(e: toml::de::Error) -> Self {
        LevelError::Parse(e)
    }
}

// ══════════════════════════════════════════════════════════════
// File schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct MapFile {
    name: Option<String>,
    tile_size: Option<f32>,
    background_color: Option<String>,
    #[serde(default)]
    layers: MapLayers,
}

#[derive(Deserialize, Debug, Default)]
struct MapLayers {
    #[serde(rename = "Platforms")]
    platforms: Option<Vec<String>>,
    #[serde(rename = "Snowflake1")]
    snowflake1: Option<Vec<String>>,
    #[serde(rename = "Snowflake2")]
    snowflake2: Option<Vec<String>>,
    #[serde(rename = "Snowflake3")]
    snowflake3: Option<Vec<String>>,
    #[serde(rename = "Podium")]
    podium: Option<Vec<String>>,
    #[serde(rename = "Background")]
    background: Option<Vec<String>>,
    #[serde(rename = "Decor")]
    decor: Option<Vec<String>>,
    #[serde(rename = "Enemy")]
    enemy: Option<Vec<EnemyDef>>,
}

/// An enemy placement. `row` counts from the top, like the grids.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct EnemyDef {
    pub col: usize,
    pub row: usize,
    pub boundary_left: Option<f32>,
    pub boundary_right: Option<f32>,
}

// ══════════════════════════════════════════════════════════════
// Parsed map
// ══════════════════════════════════════════════════════════════

/// A validated level, in grid coordinates (row 0 = bottom).
#[derive(Clone, Debug)]
pub struct LevelMap {
    pub name: Option<String>,
    pub tile_size: f32,
    pub width: usize,
    pub height: usize,
    pub background_color: Option<Rgb>,
    pub walls: TileGrid,
    pub background: TileGrid,
    pub decor: TileGrid,
    pub flakes: [Vec<(usize, usize)>; 3],
    pub podiums: Vec<(usize, usize)>,
    pub enemies: Vec<EnemyDef>,
}

impl LevelMap {
    /// World-space centre of a grid cell.
    pub fn cell_center(&self, col: usize, row: usize) -> (f32, f32) {
        let ts = self.tile_size;
        (col as f32 * ts + ts / 2.0, row as f32 * ts + ts / 2.0)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// `map_<n>.toml`
pub fn map_file_name(level: u32) -> String {
    format!("map_{level}.toml")
}

/// Display name for a level number, if it is one of the shipped ones.
pub fn level_name(level: u32) -> Option<&'static str> {
    let idx = (level as usize).checked_sub(1)?;
    LEVEL_NAMES.get(idx).copied()
}

/// Interpret the answer to the level prompt.
pub fn parse_level_choice(input: &str) -> Option<u32> {
    let n = input.trim().parse::<u32>().ok()?;
    level_name(n).map(|_| n)
}

/// Load and install a level into the world. Resets score, camera and
/// session state; keeps the world's tuning.
pub fn load_level(world: &mut WorldState, level: u32, config: &GameConfig) -> Result<(), LevelError> {
    let map = load_map(level, &config.levels_dir)?;
    install_level(world, level, map);
    Ok(())
}

/// Find and parse `map_<level>.toml`, falling back to the embedded copy.
pub fn load_map(level: u32, levels_dir: &Path) -> Result<LevelMap, LevelError> {
    let path = levels_dir.join(map_file_name(level));

    if path.is_file() {
        let text = std::fs::read_to_string(&path)
            .map_err(|source| LevelError::Io { path: path.clone(), source })?;
        log::info!("loading level {level} from {}", path.display());
        return parse_map(&text);
    }

    match embedded_map(level) {
        Some(text) => {
            log::info!("{} not found, using built-in level {level}", path.display());
            parse_map(text)
        }
        None => Err(LevelError::NotFound { level, path }),
    }
}

/// Parse and validate a map document.
pub fn parse_map(text: &str) -> Result<LevelMap, LevelError> {
    let file: MapFile = toml::from_str(text)?;
    let layers = file.layers;

    let platforms = require(layers.platforms, Layer::Platforms)?;
    let grids: Vec<(Layer, Vec<String>)> = vec![
        (Layer::Snowflake1, require(layers.snowflake1, Layer::Snowflake1)?),
        (Layer::Snowflake2, require(layers.snowflake2, Layer::Snowflake2)?),
        (Layer::Snowflake3, require(layers.snowflake3, Layer::Snowflake3)?),
        (Layer::Podium, require(layers.podium, Layer::Podium)?),
        (Layer::Background, require(layers.background, Layer::Background)?),
        (Layer::Decor, require(layers.decor, Layer::Decor)?),
    ];
    let enemies = require(layers.enemy, Layer::Enemy)?;

    let height = platforms.len();
    for (layer, rows) in &grids {
        if !rows.is_empty() && rows.len() != height {
            return Err(LevelError::LayerShape {
                layer: layer.name(),
                expected: height,
                found: rows.len(),
            });
        }
    }

    let width = grids.iter()
        .flat_map(|(_, rows)| rows.iter())
        .chain(platforms.iter())
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0);

    for (index, e) in enemies.iter().enumerate() {
        if e.row >= height || e.col >= width {
            return Err(LevelError::EnemyOutOfMap { index, col: e.col, row: e.row });
        }
    }

    let tile_size = file.tile_size.filter(|&ts| ts > 0.0).unwrap_or(DEFAULT_TILE_SIZE);
    let background_color = file.background_color.as_deref().map(parse_color).transpose()?;

    let mut cells: HashMap<Layer, Vec<(usize, usize)>> = HashMap::new();
    let mut flakes: [Vec<(usize, usize)>; 3] = [vec![], vec![], vec![]];
    for (layer, rows) in &grids {
        let occupied = occupied_cells(rows, height);
        match layer.flake_tier() {
            Some(tier) => flakes[tier.index()] = occupied,
            None => { cells.insert(*layer, occupied); }
        }
    }

    let grid_of = |cells: &[(usize, usize)]| {
        let mut g = TileGrid::empty(width, height, tile_size);
        for &(col, row) in cells {
            g.set(col, row);
        }
        g
    };

    let mut take = |layer: Layer| cells.remove(&layer).unwrap_or_default();

    Ok(LevelMap {
        name: file.name,
        tile_size,
        width,
        height,
        background_color,
        walls: grid_of(&occupied_cells(&platforms, height)),
        background: grid_of(&take(Layer::Background)),
        decor: grid_of(&take(Layer::Decor)),
        flakes,
        podiums: take(Layer::Podium),
        enemies: enemies.into_iter()
            .map(|e| EnemyDef { row: height - 1 - e.row, ..e })
            .collect(),
    })
}

/// Populate the world from a parsed map and start a fresh session.
pub fn install_level(world: &mut WorldState, level: u32, map: LevelMap) {
    let ts = map.tile_size;
    let sprite = world.physics.sprite_size;
    let speed = world.physics.enemy_speed;

    world.flakes = [vec![], vec![], vec![]];
    for tier in FlakeTier::ALL {
        world.flakes[tier.index()] = map.flakes[tier.index()].iter()
            .map(|&(col, row)| {
                let (x, y) = map.cell_center(col, row);
                Collectible::new(x, y, ts, tier)
            })
            .collect();
    }

    world.podiums = map.podiums.iter()
        .map(|&(col, row)| {
            let (x, y) = map.cell_center(col, row);
            Podium::new(x, y, ts)
        })
        .collect();

    // Enemies stand on the bottom edge of their cell whatever the tile size.
    world.enemies = map.enemies.iter()
        .map(|e| {
            let (x, _) = map.cell_center(e.col, e.row);
            let y = e.row as f32 * ts + sprite / 2.0;
            Enemy::new(x, y, sprite, speed).with_bounds(e.boundary_left, e.boundary_right)
        })
        .collect();

    world.player = Player::new(world.start.start_x, world.start.start_y, sprite);
    world.score = 0;
    world.game_over = false;
    world.phase = Phase::Playing;
    world.camera = Camera::new();
    world.tick = 0;
    world.level = level;
    world.level_name = map.name.clone()
        .or_else(|| level_name(level).map(str::to_string))
        .unwrap_or_else(|| format!("Level {level}"));
    world.background_color = map.background_color.unwrap_or(DEFAULT_BACKGROUND);

    log::info!(
        "level {} '{}': {}x{} tiles, {} flakes, {} enemies, {} podium(s)",
        level, world.level_name, map.width, map.height,
        world.flakes_remaining(), world.enemies.len(), world.podiums.len(),
    );

    world.walls = map.walls;
    world.background = map.background;
    world.decor = map.decor;

    let name = world.level_name.clone();
    world.set_message(&name, 120);
}

// ══════════════════════════════════════════════════════════════
// Internal
// ══════════════════════════════════════════════════════════════

fn embedded_map(level: u32) -> Option<&'static str> {
    let idx = (level as usize).checked_sub(1)?;
    EMBEDDED.get(idx).copied()
}

fn require<T>(layer: Option<T>, which: Layer) -> Result<T, LevelError> {
    layer.ok_or(LevelError::MissingLayer(which.name()))
}

/// Occupied `(col, row)` cells, with rows converted to bottom-up order.
fn occupied_cells(rows: &[String], height: usize) -> Vec<(usize, usize)> {
    let mut out = vec![];
    for (i, line) in rows.iter().enumerate() {
        let row = height - 1 - i;
        for (col, ch) in line.chars().enumerate() {
            if ch != '.' && ch != ' ' {
                out.push((col, row));
            }
        }
    }
    out
}

/// `"#RRGGBB"` → `(r, g, b)`.
fn parse_color(s: &str) -> Result<Rgb, LevelError> {
    let bad = || LevelError::BadColor(s.to_string());
    let hex = s.strip_prefix('#').ok_or_else(bad)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
