//! Platform-agnostic input handling.
//!
//! Platform callbacks never touch game state: they push [`InputEvent`]s
//! through an [`InputSender`], and the frame tick drains the matching
//! [`InputQueue`] into [`InputState`] exactly once per frame.
use std::collections::HashSet;

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Keys currently held and mouse motion not yet consumed
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Key identifiers are stored lowercase.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.to_lowercase());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&key.to_lowercase());
            }
            InputEvent::MouseMove { dx, dy } => {
                self.look_delta.0 += dx;
                self.look_delta.1 += dy;
            }
            InputEvent::FocusLost => self.clear_keys(),
            InputEvent::VisibilityChanged { visible } => {
                if !visible {
                    self.clear_keys();
                }
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    /// Take the accumulated mouse delta, leaving (0, 0) behind
    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

/// Producer half of the input queue. Cheap to clone, `Send`.
#[derive(Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Queue an event. Events sent after the queue is dropped are discarded.
    pub fn send(&self, event: InputEvent) {
        if let Err(TrySendError::Disconnected(event)) = self.tx.try_send(event) {
            tracing::debug!("input queue closed, dropping {event:?}");
        }
    }
}

/// Consumer half of the input queue, owned by the game state
pub struct InputQueue {
    rx: Receiver<InputEvent>,
}

impl InputQueue {
    /// Apply every queued event to `state`, returning how many were applied
    pub fn drain_into(&self, state: &mut InputState) -> usize {
        let mut n = 0;
        for event in self.rx.try_iter() {
            state.process_event(&event);
            n += 1;
        }
        n
    }
}

pub fn channel() -> (InputSender, InputQueue) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (InputSender { tx }, InputQueue { rx })
}

/// Key mapping configuration. Identifiers are lowercase `KeyboardEvent.key`
/// values, so space is `" "`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub release_pointer: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
            release_pointer: "escape".to_string(),
        }
    }
}

impl KeyBindings {
    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.forward)
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.backward)
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.left)
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.right)
    }

    pub fn is_jumping(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.jump)
    }

    pub fn is_release_pointer(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.release_pointer)
    }

    /// Keys whose browser default action (scrolling) should be suppressed
    pub fn is_game_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        [&self.forward, &self.backward, &self.left, &self.right, &self.jump]
            .iter()
            .any(|k| **k == key)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::keyboard::{Key, NamedKey};

    /// Translate a winit logical key into the browser-style identifier the
    /// bindings use. Dead and unidentified keys are dropped.
    pub fn key_to_input(key: &Key, pressed: bool) -> Option<InputEvent> {
        let id = match key {
            Key::Character(c) => c.to_string(),
            Key::Named(NamedKey::Space) => " ".to_string(),
            Key::Named(named) => format!("{named:?}"),
            Key::Unidentified(_) | Key::Dead(_) => return None,
        };
        Some(if pressed { InputEvent::KeyDown(id) } else { InputEvent::KeyUp(id) })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_lowercased() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("W".to_string()));
        assert!(input.is_key_pressed("w"));

        input.process_event(&InputEvent::KeyUp("w".to_string()));
        assert!(!input.is_key_pressed("w"));
    }

    #[test]
    fn test_mouse_delta_accumulates_until_consumed() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 });
        input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: 4.0 });

        assert_eq!(input.consume_look(), (5.0, 3.0));
        assert_eq!(input.look_delta, (0.0, 0.0));
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn test_focus_loss_releases_keys() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("a".to_string()));
        input.process_event(&InputEvent::KeyDown(" ".to_string()));

        input.process_event(&InputEvent::VisibilityChanged { visible: true });
        assert_eq!(input.pressed_keys.len(), 2);

        input.process_event(&InputEvent::VisibilityChanged { visible: false });
        assert!(input.pressed_keys.is_empty());

        input.process_event(&InputEvent::KeyDown("d".to_string()));
        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed_keys.is_empty());
    }

    #[test]
    fn test_queue_drains_in_order() {
        let (tx, queue) = channel();
        let mut input = InputState::new();

        tx.send(InputEvent::KeyDown("s".to_string()));
        tx.send(InputEvent::KeyUp("s".to_string()));
        tx.send(InputEvent::KeyDown("d".to_string()));

        assert_eq!(queue.drain_into(&mut input), 3);
        assert!(!input.is_key_pressed("s"));
        assert!(input.is_key_pressed("d"));
        assert_eq!(queue.drain_into(&mut input), 0);
    }

    #[test]
    fn test_queue_accepts_events_from_other_threads() {
        let (tx, queue) = channel();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        tx.send(InputEvent::MouseMove { dx: 1.0, dy: 2.0 });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut input = InputState::new();
        assert_eq!(queue.drain_into(&mut input), 100);
        assert_eq!(input.consume_look(), (100.0, 200.0));
    }

    #[test]
    fn test_send_after_queue_dropped_is_harmless() {
        let (tx, queue) = channel();
        drop(queue);
        tx.send(InputEvent::FocusLost);
    }

    #[test]
    fn test_bindings() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("W".to_string()));
        input.process_event(&InputEvent::KeyDown(" ".to_string()));

        assert!(bindings.is_moving_forward(&input));
        assert!(bindings.is_jumping(&input));
        assert!(!bindings.is_moving_left(&input));
        assert!(bindings.is_game_key("D"));
        assert!(!bindings.is_game_key("q"));
        assert!(bindings.is_release_pointer("Escape"));
    }
}
