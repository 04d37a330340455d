/// Collision and platformer physics: single source of truth.
///
/// ## Architecture
///
/// Two distinct concepts:
///   1. TERRAIN - static tile layers stored as boolean grids (`TileGrid`).
///   2. BODIES  - moving entities with a centre, a size and a velocity.
///
/// All collision tests are strict AABB overlap: boxes that merely touch
/// along an edge do NOT collide. A body resting on a platform therefore
/// sits with `bottom == tile.top` and is not "inside" the platform.
///
/// ## Coordinates
///
/// World pixels, y grows upward. Grid row 0 is the bottom row of the map,
/// so a tile at `(col, row)` spans `[col*ts, (col+1)*ts] × [row*ts, (row+1)*ts]`.
/// Everything outside the grid is empty space (the player can fall out).
///
/// ## Platformer step
///
/// Horizontal and vertical motion are resolved separately:
///   - `move_horizontal` - advance by `change_x`, stop flush against a wall.
///   - `step_vertical`   - apply gravity, advance by `change_y`, snap flush
///     onto/under platforms and zero `change_y`.
///   - `can_jump`        - a probe just below the feet overlaps a platform.

use super::entity::Body;

/// Distance below the feet probed by `can_jump`.
pub const JUMP_PROBE: f32 = 5.0;

// ══════════════════════════════════════════════════════════════
// Axis-aligned bounding box
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Rect {
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Rect {
            left: cx - w / 2.0,
            right: cx + w / 2.0,
            bottom: cy - h / 2.0,
            top: cy + h / 2.0,
        }
    }

    /// Strict overlap test (shared edges do not count).
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.bottom < other.top
            && self.top > other.bottom
    }

    pub fn shifted(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            left: self.left + dx,
            right: self.right + dx,
            bottom: self.bottom + dy,
            top: self.top + dy,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Tile grid (static layers, O(1) cell lookup)
// ══════════════════════════════════════════════════════════════

/// A static tile layer. `cells[row][col] == true` ↔ a tile is present.
/// Never mutated after the level is loaded.
#[derive(Clone, Debug)]
pub struct TileGrid {
    cells: Vec<Vec<bool>>,
    width: usize,
    tile_size: f32,
}

impl TileGrid {
    pub fn empty(width: usize, height: usize, tile_size: f32) -> Self {
        TileGrid {
            cells: vec![vec![false; width]; height],
            width,
            tile_size,
        }
    }

    /// Mark a tile. Out-of-range cells are ignored.
    pub fn set(&mut self, col: usize, row: usize) {
        if row < self.cells.len() && col < self.width {
            self.cells[row][col] = true;
        }
    }

    #[inline]
    pub fn is_set(&self, col: i64, row: i64) -> bool {
        if col < 0 || row < 0 {
            return false;
        }
        let (c, r) = (col as usize, row as usize);
        r < self.cells.len() && c < self.width && self.cells[r][c]
    }

    pub fn cell_rect(&self, col: i64, row: i64) -> Rect {
        let ts = self.tile_size;
        Rect {
            left: col as f32 * ts,
            right: (col + 1) as f32 * ts,
            bottom: row as f32 * ts,
            top: (row + 1) as f32 * ts,
        }
    }

    /// Occupied cells that strictly overlap `rect`.
    pub fn hits(&self, rect: &Rect) -> Vec<(i64, i64)> {
        let ts = self.tile_size;
        let c0 = (rect.left / ts).floor() as i64;
        let c1 = (rect.right / ts).ceil() as i64 - 1;
        let r0 = (rect.bottom / ts).floor() as i64;
        let r1 = (rect.top / ts).ceil() as i64 - 1;

        let mut out = vec![];
        for row in r0..=r1 {
            for col in c0..=c1 {
                if self.is_set(col, row) {
                    out.push((col, row));
                }
            }
        }
        out
    }

    pub fn overlaps(&self, rect: &Rect) -> bool {
        !self.hits(rect).is_empty()
    }

    /// All occupied cells as world rectangles (render order: bottom-up).
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.cells.iter().enumerate().flat_map(move |(row, line)| {
            line.iter().enumerate().filter(|(_, &set)| set).map(move |(col, _)| {
                self.cell_rect(col as i64, row as i64)
            })
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Body queries
// ══════════════════════════════════════════════════════════════

/// Indices of bodies in `others` that overlap `body`.
pub fn colliding_indices<'a, I>(body: &Body, others: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Body>,
{
    let rect = body.rect();
    others
        .into_iter()
        .enumerate()
        .filter(|(_, other)| rect.overlaps(&other.rect()))
        .map(|(i, _)| i)
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Platformer step
// ══════════════════════════════════════════════════════════════

/// Advance horizontally by `change_x`. Returns true if a wall stopped us.
/// `change_x` itself is left alone: it is owned by the input layer.
pub fn move_horizontal(body: &mut Body, walls: &TileGrid) -> bool {
    if body.change_x == 0.0 {
        return false;
    }
    body.center_x += body.change_x;

    let hits = walls.hits(&body.rect());
    if hits.is_empty() {
        return false;
    }

    if body.change_x > 0.0 {
        let wall_left = hits.iter()
            .map(|&(c, r)| walls.cell_rect(c, r).left)
            .fold(f32::INFINITY, f32::min);
        body.set_right(wall_left);
    } else {
        let wall_right = hits.iter()
            .map(|&(c, r)| walls.cell_rect(c, r).right)
            .fold(f32::NEG_INFINITY, f32::max);
        body.set_left(wall_right);
    }
    true
}

/// Outcome of a vertical physics step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VerticalContact {
    None,
    /// Came down onto a platform.
    Landed,
    /// Hit a platform from below.
    Bumped,
}

/// Apply gravity, advance by `change_y`, resolve penetration.
pub fn step_vertical(body: &mut Body, walls: &TileGrid, gravity: f32) -> VerticalContact {
    body.change_y -= gravity;
    body.center_y += body.change_y;

    let hits = walls.hits(&body.rect());
    if hits.is_empty() {
        return VerticalContact::None;
    }

    if body.change_y < 0.0 {
        let floor = hits.iter()
            .map(|&(c, r)| walls.cell_rect(c, r).top)
            .fold(f32::NEG_INFINITY, f32::max);
        body.set_bottom(floor);
        body.change_y = 0.0;
        VerticalContact::Landed
    } else if body.change_y > 0.0 {
        let ceiling = hits.iter()
            .map(|&(c, r)| walls.cell_rect(c, r).bottom)
            .fold(f32::INFINITY, f32::min);
        body.set_top(ceiling);
        body.change_y = 0.0;
        VerticalContact::Bumped
    } else {
        VerticalContact::None
    }
}

/// Is the body standing on something? True only when vertically supported.
pub fn can_jump(body: &Body, walls: &TileGrid) -> bool {
    walls.overlaps(&body.rect().shifted(0.0, -JUMP_PROBE))
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
