/// WorldState: the session context of a running level.
///
/// ## Layers
///
/// Static layers are `TileGrid`s and are **never mutated** after load:
///   - `walls`      - Platforms: collide with the player and enemies
///   - `background` - collide with enemies only
///   - `decor`      - render only
///
/// Dynamic collections shrink during play and are never refilled:
///   - `flakes[tier]` - collectibles, removed on contact
///   - `podiums`      - goal tiles, removed on contact
///
/// `enemies` persist for the whole level; only their bodies move.
///
/// ## Ownership
///
/// `sim::step::step` is the only writer during play. The renderer and the
/// sound dispatcher only read.

use crate::config::{GameConfig, PhysicsConfig, PlayerConfig, ScreenConfig, ViewportConfig};
use crate::domain::entity::{Collectible, Enemy, Player, Podium};
use crate::domain::physics::TileGrid;
use crate::domain::tile::FlakeTier;

use super::camera::Camera;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Paused,
    Complete,
}

/// RGB colour used to clear the view.
pub type Rgb = (u8, u8, u8);

/// Light blue, the default sky.
pub const DEFAULT_BACKGROUND: Rgb = (173, 216, 230);

pub struct WorldState {
    // ── Static layers ──
    pub walls: TileGrid,
    pub background: TileGrid,
    pub decor: TileGrid,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub flakes: [Vec<Collectible>; 3],
    pub podiums: Vec<Podium>,

    // ── Session ──
    pub score: i64,
    pub game_over: bool,
    pub phase: Phase,
    pub camera: Camera,
    pub tick: u64,

    // ── Level ──
    pub level: u32,
    pub level_name: String,
    pub background_color: Rgb,

    // ── Tuning (copied from config at setup) ──
    pub physics: PhysicsConfig,
    pub start: PlayerConfig,
    pub screen: ScreenConfig,
    pub margins: ViewportConfig,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    /// An empty world with the given tuning. Populated by `sim::level`.
    pub fn new(config: &GameConfig) -> Self {
        let size = config.physics.sprite_size;
        WorldState {
            walls: TileGrid::empty(0, 0, size),
            background: TileGrid::empty(0, 0, size),
            decor: TileGrid::empty(0, 0, size),
            player: Player::new(config.player.start_x, config.player.start_y, size),
            enemies: vec![],
            flakes: [vec![], vec![], vec![]],
            podiums: vec![],
            score: 0,
            game_over: false,
            phase: Phase::Playing,
            camera: Camera::new(),
            tick: 0,
            level: 0,
            level_name: String::new(),
            background_color: DEFAULT_BACKGROUND,
            physics: config.physics.clone(),
            start: config.player.clone(),
            screen: config.screen.clone(),
            margins: config.viewport.clone(),
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn flakes_of(&self, tier: FlakeTier) -> &[Collectible] {
        &self.flakes[tier.index()]
    }

    /// Flakes still in play, all tiers.
    pub fn flakes_remaining(&self) -> usize {
        self.flakes.iter().map(Vec::len).sum()
    }

    /// Send the player back to the start, stopped.
    pub fn respawn_player(&mut self) {
        self.player.body.reset_to(self.start.start_x, self.start.start_y);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the transient message; clear it when it expires.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            Phase::Complete => Phase::Complete,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_starts_at_spawn() {
        let w = WorldState::new(&GameConfig::default());
        assert_eq!(w.player.body.center_x, 64.0);
        assert_eq!(w.player.body.center_y, 128.0);
        assert_eq!(w.player.body.width, 64.0);
        assert_eq!(w.score, 0);
        assert!(!w.game_over);
        assert_eq!(w.flakes_remaining(), 0);
    }

    #[test]
    fn pause_toggles_only_while_running() {
        let mut w = WorldState::new(&GameConfig::default());
        w.toggle_pause();
        assert_eq!(w.phase, Phase::Paused);
        w.toggle_pause();
        assert_eq!(w.phase, Phase::Playing);
        w.phase = Phase::Complete;
        w.toggle_pause();
        assert_eq!(w.phase, Phase::Complete);
    }

    #[test]
    fn message_expires() {
        let mut w = WorldState::new(&GameConfig::default());
        w.set_message("Sochi", 2);
        w.tick_message();
        assert_eq!(w.message, "Sochi");
        w.tick_message();
        assert!(w.message.is_empty());
    }
}
