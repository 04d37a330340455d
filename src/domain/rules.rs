/// Scoring and session rules.
///
/// Pure functions and constants - no side effects. The step function
/// decides *when* a rule fires; this module decides *what* it is worth.
///
/// | Event                      | Score delta | Other effect                    |
/// |----------------------------|-------------|---------------------------------|
/// | Flake tier 1 / 2 / 3       | +10/+20/+50 | flake removed                   |
/// | Enemy contact              | −5          | reset to start                  |
/// | Fell below the world       | −5          | reset to start, camera to (0,0) |
/// | Podium                     | +100        | session ends                    |

/// Penalty for touching an enemy or falling out of the world.
pub const DAMAGE_PENALTY: i64 = 5;

/// Bonus for reaching the podium.
pub const PODIUM_BONUS: i64 = 100;

/// A player whose centre drops below this y has fallen out of the world.
pub const FALL_THRESHOLD: f32 = -100.0;

/// Has the player fallen through the bottom of the level?
pub fn fell_out_of_world(center_y: f32) -> bool {
    center_y < FALL_THRESHOLD
}

/// Score after a damage event. Score may go negative.
pub fn after_damage(score: i64) -> i64 {
    score - DAMAGE_PENALTY
}

/// Score after reaching the podium.
pub fn after_podium(score: i64) -> i64 {
    score + PODIUM_BONUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_can_go_negative() {
        assert_eq!(after_damage(0), -5);
        assert_eq!(after_damage(after_damage(3)), -7);
    }

    #[test]
    fn podium_adds_bonus() {
        assert_eq!(after_podium(80), 180);
    }

    #[test]
    fn fall_threshold_is_strict() {
        assert!(!fell_out_of_world(-100.0));
        assert!(fell_out_of_world(-100.5));
        assert!(!fell_out_of_world(0.0));
    }
}
