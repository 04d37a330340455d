/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

use crate::domain::ai::Turn;
use crate::domain::tile::FlakeTier;

/// What sent the player back to the start.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HurtCause {
    Enemy,
    Fell,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    EnemyTurned { index: usize, reason: Turn },
    FlakeCollected { tier: FlakeTier, points: i64, x: f32, y: f32 },
    PlayerHurt { cause: HurtCause },
    CameraReset,
    PodiumReached { bonus: i64, final_score: i64 },
}
