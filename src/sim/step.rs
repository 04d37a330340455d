/// The step function: advances the world by one tick.
///
/// Processing order:
///   0. Input → player velocity (+ jump if supported)
///   1. Enemy patrol
///   2. Player animation + horizontal move
///   3. Gravity + vertical move
///   4. Enemy contact (−5, respawn)
///   5. Flake pickup
///   6. Podium (+100, session over, frame ends)
///   7. Fall out of the world (−5, respawn, camera reset)
///   8. Camera scroll
///
/// At most one enemy penalty per tick no matter how many enemies overlap.
/// Every overlapping flake counts, each exactly once.

use crate::domain::ai;
use crate::domain::entity::{Facing, FrameInput};
use crate::domain::physics;
use crate::domain::rules;
use super::event::{GameEvent, HurtCause};
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: &FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.tick_message();

    apply_input(world, input, &mut events);
    resolve_enemies(world, &mut events);
    resolve_player_movement(world);
    resolve_enemy_contact(world, &mut events);
    resolve_flake_pickup(world, &mut events);
    if resolve_podium(world, &mut events) { return events; }
    let fell = resolve_fall(world, &mut events);
    world.camera.scroll(&world.player.body.rect(), &world.screen, &world.margins, fell);

    events
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

fn apply_input(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let speed = world.physics.movement_speed;
    let body = &mut world.player.body;
    body.change_x = match input.movement {
        Some(Facing::Left) => -speed,
        Some(Facing::Right) => speed,
        None => 0.0,
    };

    if input.jump && physics::can_jump(body, &world.walls) {
        body.change_y = world.physics.jump_speed;
        events.push(GameEvent::Jumped);
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for (index, enemy) in world.enemies.iter_mut().enumerate() {
        if let Some(reason) = ai::patrol(enemy, &world.walls, &world.background) {
            events.push(GameEvent::EnemyTurned { index, reason });
        }
    }
}

fn resolve_player_movement(world: &mut WorldState) {
    world.player.update_animation();
    physics::move_horizontal(&mut world.player.body, &world.walls);
    physics::step_vertical(&mut world.player.body, &world.walls, world.physics.gravity);
}

// ══════════════════════════════════════════════════════════════
// Contacts
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_contact(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let hits = physics::colliding_indices(&world.player.body, world.enemies.iter().map(|e| &e.body));
    if hits.is_empty() { return; }

    world.score = rules::after_damage(world.score);
    world.respawn_player();
    log::debug!("hit by enemy {} (score {})", hits[0], world.score);
    events.push(GameEvent::PlayerHurt { cause: HurtCause::Enemy });
}

fn resolve_flake_pickup(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for flakes in world.flakes.iter_mut() {
        let hits = physics::colliding_indices(&world.player.body, flakes.iter().map(|f| &f.body));
        // Remove back to front so earlier indices stay valid.
        for &i in hits.iter().rev() {
            let flake = flakes.remove(i);
            let points = flake.points();
            world.score += points;
            events.push(GameEvent::FlakeCollected {
                tier: flake.tier,
                points,
                x: flake.body.center_x,
                y: flake.body.center_y,
            });
        }
    }
}

/// Returns true when the session just ended.
fn resolve_podium(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let hits = physics::colliding_indices(&world.player.body, world.podiums.iter().map(|p| &p.body));
    let Some(&first) = hits.first() else { return false };

    world.podiums.remove(first);
    world.score = rules::after_podium(world.score);
    world.game_over = true;
    world.phase = Phase::Complete;
    log::info!("podium reached on tick {}, final score {}", world.tick, world.score);
    events.push(GameEvent::PodiumReached {
        bonus: rules::PODIUM_BONUS,
        final_score: world.score,
    });
    true
}

/// Returns true when the player fell and the camera must be re-applied.
fn resolve_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if !rules::fell_out_of_world(world.player.body.center_y) { return false; }

    world.score = rules::after_damage(world.score);
    world.respawn_player();
    world.camera.reset();
    log::debug!("fell out of the world (score {})", world.score);
    events.push(GameEvent::PlayerHurt { cause: HurtCause::Fell });
    events.push(GameEvent::CameraReset);
    true
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Collectible, Enemy, Podium};
    use crate::domain::physics::TileGrid;
    use crate::domain::tile::FlakeTier;
    use crate::sim::level;

    const RIGHT: FrameInput = FrameInput { movement: Some(Facing::Right), jump: false };
    const IDLE: FrameInput = FrameInput { movement: None, jump: false };
    const JUMP: FrameInput = FrameInput { movement: None, jump: true };

    /// A long flat floor (row 0) and nothing else.
    fn flat_world(cols: usize) -> WorldState {
        let mut w = WorldState::new(&GameConfig::default());
        let mut walls = TileGrid::empty(cols, 8, 64.0);
        for col in 0..cols {
            walls.set(col, 0);
        }
        w.background = TileGrid::empty(cols, 8, 64.0);
        w.decor = TileGrid::empty(cols, 8, 64.0);
        w.walls = walls;
        w
    }

    /// Drop the player onto the floor.
    fn settle(w: &mut WorldState) {
        for _ in 0..20 {
            step(w, &IDLE);
        }
        assert_eq!(w.player.body.bottom(), 64.0);
    }

    #[test]
    fn player_lands_and_stays_on_floor() {
        let mut w = flat_world(10);
        settle(&mut w);
        assert_eq!(w.player.body.change_y, 0.0);
        assert!(physics::can_jump(&w.player.body, &w.walls));
    }

    #[test]
    fn jump_only_when_supported() {
        let mut w = flat_world(10);
        let events = step(&mut w, &JUMP);
        assert!(!events.contains(&GameEvent::Jumped), "mid-air jump");

        settle(&mut w);
        let events = step(&mut w, &JUMP);
        assert!(events.contains(&GameEvent::Jumped));
        assert!(w.player.body.bottom() > 64.0);
        assert_eq!(w.player.body.change_y, 15.0 - 1.0);
    }

    #[test]
    fn fifty_ticks_right_reaches_464_and_camera_follows() {
        let mut w = flat_world(40);
        let mut last_left = None;
        for tick in 1..=50 {
            let before = w.camera.view_left;
            step(&mut w, &RIGHT);
            let right = w.player.body.right();
            if tick > 1 {
                if right > (before + 700) as f32 {
                    assert_ne!(w.camera.view_left, before, "tick {tick}");
                    assert_eq!(w.camera.view_left as f32, right - 700.0);
                } else {
                    assert_eq!(w.camera.view_left, before, "tick {tick}");
                }
            }
            last_left = Some(w.camera.view_left);
        }
        assert_eq!(w.player.body.center_x, 464.0);
        assert_eq!(last_left, Some(496 - 700));
    }

    #[test]
    fn one_flake_of_each_tier_scores_80_once() {
        let mut w = flat_world(10);
        settle(&mut w);
        let (x, y) = (w.player.body.center_x, w.player.body.center_y);
        for tier in FlakeTier::ALL {
            w.flakes[tier.index()].push(Collectible::new(x, y, 64.0, tier));
        }

        let events = step(&mut w, &IDLE);
        assert_eq!(w.score, 80);
        assert_eq!(w.flakes_remaining(), 0);
        let collected = events.iter()
            .filter(|e| matches!(e, GameEvent::FlakeCollected { .. }))
            .count();
        assert_eq!(collected, 3);

        step(&mut w, &IDLE);
        assert_eq!(w.score, 80);
    }

    #[test]
    fn overlapping_flakes_all_count() {
        let mut w = flat_world(10);
        settle(&mut w);
        let (x, y) = (w.player.body.center_x, w.player.body.center_y);
        w.flakes[0].push(Collectible::new(x - 10.0, y, 64.0, FlakeTier::One));
        w.flakes[0].push(Collectible::new(x + 10.0, y, 64.0, FlakeTier::One));
        w.flakes[0].push(Collectible::new(x + 500.0, y, 64.0, FlakeTier::One));

        step(&mut w, &IDLE);
        assert_eq!(w.score, 20);
        assert_eq!(w.flakes_of(FlakeTier::One).len(), 1);
    }

    #[test]
    fn enemy_contact_penalises_once_and_respawns() {
        let mut w = flat_world(20);
        settle(&mut w);
        w.player.body.center_x = 600.0;
        w.player.body.change_x = 8.0;
        let y = w.player.body.center_y;
        w.enemies.push(Enemy::new(600.0, y, 64.0, 2.0));
        w.enemies.push(Enemy::new(610.0, y, 64.0, -2.0));

        let events = step(&mut w, &IDLE);
        assert_eq!(w.score, -5);
        let hurts = events.iter()
            .filter(|e| matches!(e, GameEvent::PlayerHurt { cause: HurtCause::Enemy }))
            .count();
        assert_eq!(hurts, 1);
        assert_eq!((w.player.body.center_x, w.player.body.center_y), (64.0, 128.0));
        assert_eq!((w.player.body.change_x, w.player.body.change_y), (0.0, 0.0));
    }

    #[test]
    fn falling_out_resets_player_and_camera() {
        let mut w = WorldState::new(&GameConfig::default()); // no floor at all
        w.score = 3;
        let mut hurt = None;
        for _ in 0..100 {
            let events = step(&mut w, &IDLE);
            if events.contains(&GameEvent::PlayerHurt { cause: HurtCause::Fell }) {
                hurt = Some(events);
                break;
            }
        }
        let events = hurt.expect("player never fell out");
        assert!(events.contains(&GameEvent::CameraReset));
        assert_eq!(w.score, -2);
        assert_eq!((w.player.body.center_x, w.player.body.center_y), (64.0, 128.0));
        assert_eq!((w.player.body.change_x, w.player.body.change_y), (0.0, 0.0));
        // Forced scroll after the reset, from the origin.
        assert_eq!(w.camera.view_left, -268);
        assert_eq!(w.camera.view_bottom, -4);
    }

    #[test]
    fn podium_ends_session() {
        let mut w = flat_world(10);
        settle(&mut w);
        w.score = 30;
        let (x, y) = (w.player.body.center_x, w.player.body.center_y);
        w.podiums.push(Podium::new(x + 32.0, y, 64.0));
        let camera = w.camera;

        let events = step(&mut w, &IDLE);
        assert_eq!(w.score, 130);
        assert!(w.podiums.is_empty());
        assert!(w.game_over);
        assert_eq!(w.phase, Phase::Complete);
        assert_eq!(events.last(), Some(&GameEvent::PodiumReached { bonus: 100, final_score: 130 }));
        assert_eq!(w.camera, camera);

        // Nothing moves after the session is over, enemies included.
        w.enemies.push(Enemy::new(x + 300.0, y, 64.0, 2.0));
        assert!(step(&mut w, &RIGHT).is_empty());
        assert_eq!(w.player.body.center_x, x);
        assert_eq!(w.enemies[0].body.center_x, x + 300.0);
        assert_eq!(w.tick, 21);
    }

    #[test]
    fn paused_world_does_not_advance() {
        let mut w = flat_world(10);
        w.toggle_pause();
        assert!(step(&mut w, &RIGHT).is_empty());
        assert_eq!(w.tick, 0);
        assert_eq!(w.player.body.center_x, 64.0);
    }

    #[test]
    fn enemies_keep_their_speed_on_a_real_level() {
        let cfg = GameConfig::default();
        let mut w = WorldState::new(&cfg);
        let dir = tempfile::tempdir().unwrap();
        let map = level::load_map(3, dir.path()).unwrap();
        level::install_level(&mut w, 3, map);

        for _ in 0..600 {
            step(&mut w, &IDLE);
            for e in &w.enemies {
                assert_eq!(e.body.change_x.abs(), cfg.physics.enemy_speed);
            }
        }
        // The player settled on the ground at the start.
        assert_eq!(w.player.body.bottom(), 64.0);
        assert_eq!(w.player.body.center_x, 64.0);
    }
}
