/// Player animation state machine.
///
/// States: {Idle, Walking} × {FacingLeft, FacingRight}.
///
///   - Facing flips only when horizontal velocity contradicts it;
///     zero velocity never changes facing.
///   - Both velocity components zero → idle texture for the facing.
///   - Otherwise → walking: the counter cycles through
///     `WALK_FRAMES * TICKS_PER_FRAME` ticks and the walk frame is
///     `counter / TICKS_PER_FRAME`.
///
/// `animate` is a pure function of (velocity, facing, counter).

use super::entity::Facing;

/// Number of distinct walk frames.
pub const WALK_FRAMES: u32 = 8;
/// Ticks each walk frame stays on screen.
pub const TICKS_PER_FRAME: u32 = 5;
/// Length of one full walk cycle in ticks.
pub const WALK_CYCLE: u32 = WALK_FRAMES * TICKS_PER_FRAME;

/// Which texture the renderer should draw.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Texture {
    Idle(Facing),
    Walk { frame: u32, facing: Facing },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnimState {
    pub facing: Facing,
    pub counter: u32,
    pub texture: Texture,
}

impl AnimState {
    pub fn new() -> Self {
        AnimState {
            facing: Facing::Right,
            counter: 0,
            texture: Texture::Idle(Facing::Right),
        }
    }
}

impl Default for AnimState {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the animation one tick.
pub fn animate(state: AnimState, change_x: f32, change_y: f32) -> AnimState {
    let facing = match state.facing {
        Facing::Right if change_x < 0.0 => Facing::Left,
        Facing::Left if change_x > 0.0 => Facing::Right,
        f => f,
    };

    if change_x == 0.0 && change_y == 0.0 {
        return AnimState { facing, counter: state.counter, texture: Texture::Idle(facing) };
    }

    let counter = (state.counter + 1) % WALK_CYCLE;
    AnimState {
        facing,
        counter,
        texture: Texture::Walk { frame: counter / TICKS_PER_FRAME, facing },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_keeps_facing_and_counter() {
        let mut s = AnimState::new();
        s.facing = Facing::Left;
        s.counter = 7;
        let next = animate(s, 0.0, 0.0);
        assert_eq!(next.facing, Facing::Left);
        assert_eq!(next.counter, 7);
        assert_eq!(next.texture, Texture::Idle(Facing::Left));
    }

    #[test]
    fn facing_flips_only_on_contradiction() {
        let s = AnimState::new();
        let left = animate(s, -8.0, 0.0);
        assert_eq!(left.facing, Facing::Left);
        // Still moving left: stays left
        assert_eq!(animate(left, -8.0, 0.0).facing, Facing::Left);
        // Vertical-only motion never flips
        assert_eq!(animate(left, 0.0, 15.0).facing, Facing::Left);
        assert_eq!(animate(left, 8.0, 0.0).facing, Facing::Right);
    }

    #[test]
    fn walk_cycle_wraps_after_forty_ticks() {
        let mut s = AnimState::new();
        let mut frames = vec![];
        for _ in 0..WALK_CYCLE {
            s = animate(s, 8.0, 0.0);
            if let Texture::Walk { frame, .. } = s.texture {
                frames.push(frame);
            }
        }
        assert_eq!(s.counter, 0);
        assert_eq!(frames.len(), WALK_CYCLE as usize);
        assert_eq!(*frames.iter().max().unwrap(), WALK_FRAMES - 1);
        assert_eq!(frames[0], 0); // counter 1
        assert_eq!(frames[4], 1); // counter 5
    }

    #[test]
    fn airborne_counts_as_walking() {
        let s = animate(AnimState::new(), 0.0, -3.0);
        assert!(matches!(s.texture, Texture::Walk { .. }));
        assert_eq!(s.facing, Facing::Right);
    }
}
