/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the built-in constants if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub viewport: ViewportConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub tick_rate_ms: u64,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub movement_speed: f32,  // px per tick, horizontal
    pub jump_speed: f32,      // initial upward change_y
    pub gravity: f32,         // subtracted from change_y each tick
    pub enemy_speed: f32,     // patrol speed magnitude
    pub sprite_size: f32,     // player and enemy box edge
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    pub start_x: f32,
    pub start_y: f32,
}

/// Dead-zone margins, in pixels from each edge of the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig {
    pub left_margin: f32,
    pub right_margin: f32,
    pub bottom_margin: f32,
    pub top_margin: f32,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub volume: f32,
    pub collect: PathBuf,
    pub jump: PathBuf,
    pub hurt: PathBuf,
    pub music: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    viewport: TomlViewport,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlScreen {
    #[serde(default = "default_screen_width")]
    width: f32,
    #[serde(default = "default_screen_height")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_movement_speed")]
    movement_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f32,
    #[serde(default = "default_sprite_size")]
    sprite_size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_start_x")]
    start_x: f32,
    #[serde(default = "default_start_y")]
    start_y: f32,
}

#[derive(Deserialize, Debug)]
struct TomlViewport {
    #[serde(default = "default_left_margin")]
    left: f32,
    #[serde(default = "default_right_margin")]
    right: f32,
    #[serde(default = "default_bottom_margin")]
    bottom: f32,
    #[serde(default = "default_top_margin")]
    top: f32,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_volume")]
    volume: f32,
    #[serde(default = "default_collect_sound")]
    collect: String,
    #[serde(default = "default_jump_sound")]
    jump: String,
    #[serde(default = "default_hurt_sound")]
    hurt: String,
    #[serde(default = "default_music")]
    music: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_tick_rate() -> u64 { 16 }     // ~60 ticks per second
fn default_log_file() -> String { "skate-game.log".into() }

fn default_screen_width() -> f32 { 1000.0 }
fn default_screen_height() -> f32 { 650.0 }

fn default_movement_speed() -> f32 { 8.0 }
fn default_jump_speed() -> f32 { 15.0 }
fn default_gravity() -> f32 { 1.0 }
fn default_enemy_speed() -> f32 { 2.0 }
fn default_sprite_size() -> f32 { 64.0 }  // 128px art at 0.5 scale

fn default_start_x() -> f32 { 64.0 }
fn default_start_y() -> f32 { 128.0 }

fn default_left_margin() -> f32 { 300.0 }
fn default_right_margin() -> f32 { 300.0 }
fn default_bottom_margin() -> f32 { 100.0 }
fn default_top_margin() -> f32 { 250.0 }

fn default_volume() -> f32 { 0.5 }
fn default_collect_sound() -> String { "sounds/coin5.wav".into() }
fn default_jump_sound() -> String { "sounds/jump1.wav".into() }
fn default_hurt_sound() -> String { "sounds/hurt1.wav".into() }
fn default_music() -> String { "sounds/snowball_park.mp3".into() }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            tick_rate_ms: default_tick_rate(),
            log_file: default_log_file(),
        }
    }
}

impl Default for TomlScreen {
    fn default() -> Self {
        TomlScreen { width: default_screen_width(), height: default_screen_height() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            movement_speed: default_movement_speed(),
            jump_speed: default_jump_speed(),
            gravity: default_gravity(),
            enemy_speed: default_enemy_speed(),
            sprite_size: default_sprite_size(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { start_x: default_start_x(), start_y: default_start_y() }
    }
}

impl Default for TomlViewport {
    fn default() -> Self {
        TomlViewport {
            left: default_left_margin(),
            right: default_right_margin(),
            bottom: default_bottom_margin(),
            top: default_top_margin(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            volume: default_volume(),
            collect: default_collect_sound(),
            jump: default_jump_sound(),
            hurt: default_hurt_sound(),
            music: default_music(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            screen: ScreenConfig {
                width: cfg.screen.width,
                height: cfg.screen.height,
            },
            physics: PhysicsConfig {
                movement_speed: cfg.physics.movement_speed,
                jump_speed: cfg.physics.jump_speed,
                gravity: cfg.physics.gravity,
                enemy_speed: patrol_speed(cfg.physics.enemy_speed),
                sprite_size: cfg.physics.sprite_size,
            },
            player: PlayerConfig {
                start_x: cfg.player.start_x,
                start_y: cfg.player.start_y,
            },
            viewport: ViewportConfig {
                left_margin: cfg.viewport.left,
                right_margin: cfg.viewport.right,
                bottom_margin: cfg.viewport.bottom,
                top_margin: cfg.viewport.top,
            },
            audio: AudioConfig {
                volume: cfg.audio.volume,
                collect: resolve_path(&cfg.audio.collect, search_dirs),
                jump: resolve_path(&cfg.audio.jump, search_dirs),
                hurt: resolve_path(&cfg.audio.hurt, search_dirs),
                music: resolve_path(&cfg.audio.music, search_dirs),
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
            levels_dir: resolve_path(&cfg.general.levels_dir, search_dirs),
            tick_rate_ms: cfg.general.tick_rate_ms.max(1),
            log_file: PathBuf::from(cfg.general.log_file),
        }
    }
}

/// Patrol speed is a magnitude: negatives are flipped, and zero or
/// non-finite values fall back to the default.
fn patrol_speed(value: f32) -> f32 {
    let speed = value.abs();
    if speed > 0.0 && speed.is_finite() {
        if value < 0.0 {
            eprintln!("Warning: enemy_speed {value} is negative, using {speed}");
        }
        speed
    } else {
        let fallback = default_enemy_speed();
        eprintln!("Warning: enemy_speed {value} would stop enemies, using {fallback}");
        fallback
    }
}

/// Resolve a relative data path against the first search dir that has it.
/// Absolute paths and paths found nowhere are returned unchanged.
fn resolve_path(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(p))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds data next to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before the logger exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<GameConfig, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg, &[]))
    }

    #[test]
    fn defaults_match_builtin_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.screen, ScreenConfig { width: 1000.0, height: 650.0 });
        assert_eq!(cfg.physics.movement_speed, 8.0);
        assert_eq!(cfg.physics.jump_speed, 15.0);
        assert_eq!(cfg.physics.gravity, 1.0);
        assert_eq!(cfg.physics.enemy_speed, 2.0);
        assert_eq!(cfg.player, PlayerConfig { start_x: 64.0, start_y: 128.0 });
        assert_eq!(cfg.viewport.left_margin, 300.0);
        assert_eq!(cfg.viewport.top_margin, 250.0);
        assert_eq!(cfg.audio.volume, 0.5);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse("[physics]\ngravity = 2.0\n").unwrap();
        assert_eq!(cfg.physics.gravity, 2.0);
        assert_eq!(cfg.physics.movement_speed, 8.0);
        assert_eq!(cfg.screen.width, 1000.0);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = parse("[general]\ntick_rate_ms = 0\n").unwrap();
        assert_eq!(cfg.tick_rate_ms, 1);
    }

    #[test]
    fn enemy_speed_is_a_positive_magnitude() {
        let cfg = parse("[physics]\nenemy_speed = 0.0\n").unwrap();
        assert_eq!(cfg.physics.enemy_speed, 2.0);
        let cfg = parse("[physics]\nenemy_speed = -3.5\n").unwrap();
        assert_eq!(cfg.physics.enemy_speed, 3.5);
        let cfg = parse("[physics]\nenemy_speed = 1.5\n").unwrap();
        assert_eq!(cfg.physics.enemy_speed, 1.5);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse("[physics\n").is_err());
    }
}
