//! Input handling for the host window.
//!
//! [`Input`] turns raw winit window events into the two things the rest of
//! the crate cares about:
//!
//! - [`PointerEvent`]s (moves and left clicks, in canvas pixels), queued
//!   until the host hands them to the deck;
//! - key presses, which the host maps to effect selection with
//!   [`effect_for_key`].
//!
//! ```ignore
//! input.handle_event(&event);
//! for pointer in input.drain_pointer() {
//!     deck.pointer(pointer);
//! }
//! if input.key_pressed(KeyCode::Escape) {
//!     deck.deselect_all();
//! }
//! ```

use crate::effects::EffectId;
use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Pointer activity in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Vec2),
    Click(Vec2),
}

impl PointerEvent {
    pub fn position(&self) -> Vec2 {
        match *self {
            PointerEvent::Move(p) | PointerEvent::Click(p) => p,
        }
    }
}

/// The keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Key0, Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9,
    Q, W, E, R, T, Y,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Digit0 => KeyCode::Key0,
            WinitKeyCode::Digit1 => KeyCode::Key1,
            WinitKeyCode::Digit2 => KeyCode::Key2,
            WinitKeyCode::Digit3 => KeyCode::Key3,
            WinitKeyCode::Digit4 => KeyCode::Key4,
            WinitKeyCode::Digit5 => KeyCode::Key5,
            WinitKeyCode::Digit6 => KeyCode::Key6,
            WinitKeyCode::Digit7 => KeyCode::Key7,
            WinitKeyCode::Digit8 => KeyCode::Key8,
            WinitKeyCode::Digit9 => KeyCode::Key9,

            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyE => KeyCode::E,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyT => KeyCode::T,
            WinitKeyCode::KeyY => KeyCode::Y,

            WinitKeyCode::Escape => KeyCode::Escape,

            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Selection keys in catalogue order: `1`–`9`, `0`, then `Q W E R T Y`.
const SELECTION_KEYS: [KeyCode; 16] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
    KeyCode::Key0,
    KeyCode::Q,
    KeyCode::W,
    KeyCode::E,
    KeyCode::R,
    KeyCode::T,
    KeyCode::Y,
];

/// The effect a selection key toggles, if any.
pub fn effect_for_key(key: KeyCode) -> Option<EffectId> {
    SELECTION_KEYS
        .iter()
        .position(|k| *k == key)
        .and_then(|i| EffectId::ALL.get(i).copied())
}

/// Keyboard and pointer state for one window.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    pointer_position: Vec2,
    pointer_queue: Vec<PointerEvent>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Queries ==========

    /// Key went down this frame (auto-repeat ignored).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Last known pointer position in pixels.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Keys pressed since the last [`begin_frame`](Self::begin_frame).
    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_pressed.iter().copied()
    }

    /// Take the queued pointer events, oldest first.
    pub fn drain_pointer(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pointer_queue)
    }

    // ========== Event plumbing ==========

    /// Clear per-frame state. Call after the frame's input has been consumed.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key_event(KeyCode::from(code), event.state);
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.pointer_queue.push(PointerEvent::Click(self.pointer_position));
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_position = Vec2::new(position.x as f32, position.y as f32);
                self.pointer_queue.push(PointerEvent::Move(self.pointer_position));
            }

            _ => {}
        }
    }

    fn key_event(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();
        assert!(!input.key_held(KeyCode::Escape));

        input.key_event(KeyCode::Escape, ElementState::Pressed);
        assert!(input.key_held(KeyCode::Escape));
        assert!(input.key_pressed(KeyCode::Escape));

        // Pressed is cleared but held remains
        input.begin_frame();
        assert!(input.key_held(KeyCode::Escape));
        assert!(!input.key_pressed(KeyCode::Escape));

        // Repeat while held does not re-fire
        input.key_event(KeyCode::Escape, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_selection_keys_follow_catalogue() {
        assert_eq!(effect_for_key(KeyCode::Key1), Some(EffectId::Snow));
        assert_eq!(effect_for_key(KeyCode::Key0), Some(EffectId::Glitch));
        assert_eq!(effect_for_key(KeyCode::Y), Some(EffectId::WaterRipple));
        assert_eq!(effect_for_key(KeyCode::Escape), None);
    }

    #[test]
    fn test_pointer_queue_drains() {
        let mut input = Input::new();
        input.pointer_position = Vec2::new(5.0, 6.0);
        input.pointer_queue.push(PointerEvent::Click(input.pointer_position));
        let events = input.drain_pointer();
        assert_eq!(events, vec![PointerEvent::Click(Vec2::new(5.0, 6.0))]);
        assert!(input.drain_pointer().is_empty());
    }
}
