/// Camera: scroll offsets into the level.
///
/// `(view_left, view_bottom)` is the world coordinate of the bottom-left
/// corner of the visible window. The window itself is `screen.width ×
/// screen.height` pixels.
///
/// Dead zone: the player may move freely inside an inset rectangle
/// (`margins` from each window edge). When a box edge crosses a dead-zone
/// boundary, the offset on that side shifts by exactly the crossing
/// distance, so after the correction the player sits on the margin line.
/// All four edges are checked independently every tick.
///
/// After any change both offsets are truncated toward zero, so the
/// renderer never sees sub-pixel scroll positions.

use crate::config::{ScreenConfig, ViewportConfig};
use crate::domain::physics::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Camera {
    pub view_left: i32,
    pub view_bottom: i32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { view_left: 0, view_bottom: 0 }
    }

    /// Snap back to the level origin (used after a fall).
    pub fn reset(&mut self) {
        self.view_left = 0;
        self.view_bottom = 0;
    }

    /// Shift the offsets so `target` lies inside the dead zone.
    ///
    /// `force` marks the offsets as changed even if no edge crossed a
    /// boundary. Returns whether the offsets were (re)applied.
    pub fn scroll(
        &mut self,
        target: &Rect,
        screen: &ScreenConfig,
        margins: &ViewportConfig,
        force: bool,
    ) -> bool {
        let mut left = self.view_left as f32;
        let mut bottom = self.view_bottom as f32;
        let mut changed = force;

        let left_boundary = left + margins.left_margin;
        if target.left < left_boundary {
            left -= left_boundary - target.left;
            changed = true;
        }

        let right_boundary = left + screen.width - margins.right_margin;
        if target.right > right_boundary {
            left += target.right - right_boundary;
            changed = true;
        }

        let top_boundary = bottom + screen.height - margins.top_margin;
        if target.top > top_boundary {
            bottom += target.top - top_boundary;
            changed = true;
        }

        let bottom_boundary = bottom + margins.bottom_margin;
        if target.bottom < bottom_boundary {
            bottom -= bottom_boundary - target.bottom;
            changed = true;
        }

        if changed {
            self.view_left = left as i32;
            self.view_bottom = bottom as i32;
        }
        changed
    }
}
