use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::ActionStates;
use crate::{InputAction, InputSnapshot};

/// Turns raw key events into one press per key-down. Holding a key does not
/// repeat the action.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    held: ActionStates,
    pressed_edges: ActionStates,
    quit_requested: bool,
}

impl InputCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_key(key_event.physical_key, key_event.state);
    }

    pub(crate) fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let Some(action) = action_for_key(key) else {
            return;
        };

        match state {
            ElementState::Pressed => {
                if !self.held.is_set(action) {
                    self.pressed_edges.set(action, true);
                }
                self.held.set(action, true);
                if action == InputAction::Quit {
                    self.mark_quit_requested();
                }
            }
            ElementState::Released => self.held.set(action, false),
        }
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Presses since the previous call.
    pub(crate) fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::from_states(self.pressed_edges);
        self.pressed_edges = ActionStates::default();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) => {
            Some(InputAction::Confirm)
        }
        PhysicalKey::Code(KeyCode::Backspace) => Some(InputAction::Back),
        PhysicalKey::Code(KeyCode::KeyR) => Some(InputAction::Retry),
        PhysicalKey::Code(KeyCode::Escape) => Some(InputAction::Quit),
        _ => None,
    }
}
