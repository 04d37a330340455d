/// Enemy AI - horizontal patrol.
///
/// Each tick an enemy advances by its velocity, then reverses if (first
/// match wins):
///   1. it overlaps a wall tile (Platforms) or a Background tile,
///   2. it crossed its left patrol bound,
///   3. it crossed its right patrol bound.
///
/// Reversal only flips the sign of `change_x`; the magnitude is fixed at
/// load time and never changes.

use super::entity::Enemy;
use super::physics::TileGrid;

/// Why an enemy turned around.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Turn {
    Wall,
    LeftBound,
    RightBound,
}

/// Advance one enemy by one tick. Returns the reason it reversed, if it did.
pub fn patrol(enemy: &mut Enemy, walls: &TileGrid, background: &TileGrid) -> Option<Turn> {
    let body = &mut enemy.body;
    body.center_x += body.change_x;
    body.center_y += body.change_y;

    let rect = body.rect();
    let turn = if walls.overlaps(&rect) || background.overlaps(&rect) {
        Some(Turn::Wall)
    } else if enemy.boundary_left.map_or(false, |b| body.left() < b) {
        Some(Turn::LeftBound)
    } else if enemy.boundary_right.map_or(false, |b| body.right() > b) {
        Some(Turn::RightBound)
    } else {
        None
    };

    if turn.is_some() {
        body.change_x = -body.change_x;
    }
    turn
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_from(rows: &[&str]) -> TileGrid {
        let h = rows.len();
        let w = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut g = TileGrid::empty(w, h, 64.0);
        for (i, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    g.set(col, h - 1 - i);
                }
            }
        }
        g
    }

    #[test]
    fn free_patrol_keeps_direction() {
        let walls = grid_from(&["......", "######"]);
        let bg = TileGrid::empty(6, 2, 64.0);
        // Standing on the floor row: touching, not overlapping
        let mut e = Enemy::new(160.0, 96.0, 64.0, 2.0);
        assert_eq!(patrol(&mut e, &walls, &bg), None);
        assert_eq!(e.body.center_x, 162.0);
        assert_eq!(e.body.change_x, 2.0);
    }

    #[test]
    fn reverses_on_wall() {
        let walls = grid_from(&["...#", "####"]);
        let bg = TileGrid::empty(4, 2, 64.0);
        // Right edge at 191; wall begins at 192
        let mut e = Enemy::new(159.0, 96.0, 64.0, 2.0);
        assert_eq!(patrol(&mut e, &walls, &bg), Some(Turn::Wall));
        assert_eq!(e.body.change_x, -2.0);
    }

    #[test]
    fn reverses_on_background_tile() {
        let walls = TileGrid::empty(4, 2, 64.0);
        let bg = grid_from(&["#...", "...."]);
        let mut e = Enemy::new(97.0, 96.0, 64.0, -2.0);
        e.body.change_x = -2.0;
        assert_eq!(patrol(&mut e, &walls, &bg), Some(Turn::Wall));
        assert_eq!(e.body.change_x, 2.0);
    }

    #[test]
    fn reverses_on_bounds() {
        let empty = TileGrid::empty(1, 1, 64.0);
        let mut e = Enemy::new(100.0, 500.0, 64.0, 2.0).with_bounds(Some(60.0), Some(133.0));
        // right edge 132 → 134 > 133
        assert_eq!(patrol(&mut e, &empty, &empty), Some(Turn::RightBound));
        assert_eq!(e.body.change_x, -2.0);

        let mut e = Enemy::new(100.0, 500.0, 64.0, 2.0).with_bounds(Some(67.0), None);
        e.body.change_x = -2.0;
        // left edge 68 → 66 < 67
        assert_eq!(patrol(&mut e, &empty, &empty), Some(Turn::LeftBound));
        assert_eq!(e.body.change_x, 2.0);
    }

    proptest! {
        #[test]
        fn speed_magnitude_is_invariant(
            start in 100.0f32..600.0,
            span in 10.0f32..300.0,
            ticks in 1usize..500,
        ) {
            let walls = grid_from(&[
                "#..........#",
                "############",
            ]);
            let bg = TileGrid::empty(12, 2, 64.0);
            let mut e = Enemy::new(start, 96.0, 64.0, 2.0)
                .with_bounds(Some(start - span), Some(start + span));
            for _ in 0..ticks {
                let before = e.body.change_x;
                let turned = patrol(&mut e, &walls, &bg);
                prop_assert_eq!(e.body.change_x.abs(), 2.0);
                if turned.is_none() {
                    prop_assert_eq!(e.body.change_x, before);
                }
            }
        }
    }
}
