/// Entities: Player, Enemy, Collectible (flake), Podium.
///
/// Every entity is a `Body` (centre, size, velocity) plus whatever role
/// data it needs. Rendering reads the role data; collision reads the body.

use super::animation::{self, AnimState};
use super::physics::Rect;
use super::tile::FlakeTier;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Frame input: continuous horizontal movement + edge-triggered jump.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<Facing>,
    pub jump: bool,
}

/// Position, size and per-tick velocity of anything that collides.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub change_x: f32,
    pub change_y: f32,
}

impl Body {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Body { center_x, center_y, width, height, change_x: 0.0, change_y: 0.0 }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center_x, self.center_y, self.width, self.height)
    }

    pub fn left(&self) -> f32 { self.center_x - self.width / 2.0 }
    pub fn right(&self) -> f32 { self.center_x + self.width / 2.0 }
    pub fn bottom(&self) -> f32 { self.center_y - self.height / 2.0 }
    pub fn top(&self) -> f32 { self.center_y + self.height / 2.0 }

    pub fn set_left(&mut self, x: f32) { self.center_x = x + self.width / 2.0; }
    pub fn set_right(&mut self, x: f32) { self.center_x = x - self.width / 2.0; }
    pub fn set_bottom(&mut self, y: f32) { self.center_y = y + self.height / 2.0; }
    pub fn set_top(&mut self, y: f32) { self.center_y = y - self.height / 2.0; }

    /// Teleport and stop.
    pub fn reset_to(&mut self, x: f32, y: f32) {
        self.center_x = x;
        self.center_y = y;
        self.change_x = 0.0;
        self.change_y = 0.0;
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub anim: AnimState,
}

impl Player {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Player { body: Body::new(x, y, size, size), anim: AnimState::new() }
    }

    /// Advance the animation state machine from the current velocity.
    pub fn update_animation(&mut self) {
        self.anim = animation::animate(self.anim, self.body.change_x, self.body.change_y);
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    /// Patrol limits in world pixels. `None` = unbounded on that side.
    pub boundary_left: Option<f32>,
    pub boundary_right: Option<f32>,
}

impl Enemy {
    pub fn new(x: f32, y: f32, size: f32, speed: f32) -> Self {
        let mut body = Body::new(x, y, size, size);
        body.change_x = speed;
        Enemy { body, boundary_left: None, boundary_right: None }
    }

    pub fn with_bounds(mut self, left: Option<f32>, right: Option<f32>) -> Self {
        self.boundary_left = left;
        self.boundary_right = right;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Collectible {
    pub body: Body,
    pub tier: FlakeTier,
}

impl Collectible {
    pub fn new(x: f32, y: f32, size: f32, tier: FlakeTier) -> Self {
        Collectible { body: Body::new(x, y, size, size), tier }
    }

    pub fn points(&self) -> i64 {
        self.tier.points()
    }
}

#[derive(Clone, Debug)]
pub struct Podium {
    pub body: Body,
}

impl Podium {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Podium { body: Body::new(x, y, size, size) }
    }
}
