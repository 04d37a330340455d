/// Map layers and collectible tiers.
///
/// Collision roles: the player collides with `Platforms` only; patrolling
/// enemies turn on `Platforms` and `Background`. `Decor` is never solid.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Layer {
    Platforms,
    Snowflake1,
    Snowflake2,
    Snowflake3,
    Podium,
    Background,
    Decor,
    Enemy,
}

impl Layer {
    /// Layer name as it appears in the level file.
    pub fn name(self) -> &'static str {
        match self {
            Layer::Platforms => "Platforms",
            Layer::Snowflake1 => "Snowflake1",
            Layer::Snowflake2 => "Snowflake2",
            Layer::Snowflake3 => "Snowflake3",
            Layer::Podium => "Podium",
            Layer::Background => "Background",
            Layer::Decor => "Decor",
            Layer::Enemy => "Enemy",
        }
    }

    /// Collectible tier carried by this layer, if any.
    pub fn flake_tier(self) -> Option<FlakeTier> {
        match self {
            Layer::Snowflake1 => Some(FlakeTier::One),
            Layer::Snowflake2 => Some(FlakeTier::Two),
            Layer::Snowflake3 => Some(FlakeTier::Three),
            _ => None,
        }
    }
}

/// Snowflake collectible tiers, escalating in value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FlakeTier {
    One,
    Two,
    Three,
}

impl FlakeTier {
    pub const ALL: [FlakeTier; 3] = [FlakeTier::One, FlakeTier::Two, FlakeTier::Three];

    /// Points awarded when a flake of this tier is collected.
    pub fn points(self) -> i64 {
        match self {
            FlakeTier::One => 10,
            FlakeTier::Two => 20,
            FlakeTier::Three => 50,
        }
    }

    /// Index into per-tier collections (0..3).
    pub fn index(self) -> usize {
        match self {
            FlakeTier::One => 0,
            FlakeTier::Two => 1,
            FlakeTier::Three => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_points_escalate() {
        let total: i64 = FlakeTier::ALL.iter().map(|t| t.points()).sum();
        assert_eq!(total, 80);
        assert!(FlakeTier::One.points() < FlakeTier::Two.points());
        assert!(FlakeTier::Two.points() < FlakeTier::Three.points());
    }

    #[test]
    fn only_snowflake_layers_carry_tiers() {
        assert_eq!(Layer::Snowflake1.flake_tier(), Some(FlakeTier::One));
        assert_eq!(Layer::Snowflake3.flake_tier(), Some(FlakeTier::Three));
        assert_eq!(Layer::Podium.flake_tier(), None);
        assert_eq!(Layer::Enemy.flake_tier(), None);
    }
}
