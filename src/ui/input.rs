/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous skating while a direction key is held
///   - Edge-triggered jump (only fires on initial press)
///   - Skating and jumping in the same tick
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Facing, FrameInput};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const JUMP_KEYS: [KeyCode; 4] = [
    KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' '),
];
pub const PAUSE_KEYS: [KeyCode; 3] = [KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::F(1)];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain. Used for edge-triggered actions (jump, pause).
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement was successfully pushed.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key);
            }
        }
        self.expire(Instant::now());
    }

    /// Clear per-frame edge state.
    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Release without enhancement is unreliable; rely on the timeout.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Drop keys that timed out. With Release events available keys stay
    /// held until released.
    fn expire(&mut self, now: Instant) {
        if self.honor_release { return; }
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => t.elapsed() < HOLD_TIMEOUT,
            None => false,
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Movement and jump for this frame. Holding both directions cancels out.
    pub fn frame_input(&self) -> FrameInput {
        let left = self.any_held(&LEFT_KEYS);
        let right = self.any_held(&RIGHT_KEYS);
        let movement = match (left, right) {
            (true, false) => Some(Facing::Left),
            (false, true) => Some(Facing::Right),
            _ => None,
        };
        FrameInput { movement, jump: self.any_pressed(&JUMP_KEYS) }
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_pressed(&PAUSE_KEYS)
    }

    /// Esc or Ctrl+C this frame.
    pub fn quit_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Esc) || self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    fn press(s: &mut InputState, code: KeyCode) {
        s.handle_key(key(code, KeyEventKind::Press));
    }

    #[test]
    fn held_direction_moves() {
        let mut s = InputState::new();
        press(&mut s, KeyCode::Right);
        assert_eq!(s.frame_input().movement, Some(Facing::Right));

        s.begin_frame();
        press(&mut s, KeyCode::Char('a'));
        // Both held: no movement
        assert_eq!(s.frame_input().movement, None);
    }

    #[test]
    fn jump_is_edge_triggered() {
        let mut s = InputState::new();
        press(&mut s, KeyCode::Char(' '));
        assert!(s.frame_input().jump);

        // Auto-repeat while held is not a fresh press.
        s.begin_frame();
        s.handle_key(key(KeyCode::Char(' '), KeyEventKind::Repeat));
        assert!(!s.frame_input().jump);
    }

    #[test]
    fn release_honored_only_with_enhancement() {
        let mut s = InputState::new();
        press(&mut s, KeyCode::Left);
        s.handle_key(key(KeyCode::Left, KeyEventKind::Release));
        assert!(s.is_held(KeyCode::Left));

        let mut s = InputState::new();
        s.honor_release = true;
        press(&mut s, KeyCode::Left);
        s.handle_key(key(KeyCode::Left, KeyEventKind::Release));
        assert!(!s.is_held(KeyCode::Left));
    }

    #[test]
    fn keys_expire_without_release_events() {
        let mut s = InputState::new();
        press(&mut s, KeyCode::Right);
        s.expire(Instant::now() + HOLD_TIMEOUT * 2);
        assert!(!s.is_held(KeyCode::Right));
    }

    #[test]
    fn quit_and_pause_keys() {
        let mut s = InputState::new();
        s.handle_key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert!(s.quit_pressed());

        s.begin_frame();
        press(&mut s, KeyCode::F(1));
        assert!(s.pause_pressed());
        assert!(!s.quit_pressed());
    }
}
