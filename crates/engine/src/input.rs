#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Confirm,
    Back,
    Retry,
    Quit,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_set(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::Confirm => 0,
            InputAction::Back => 1,
            InputAction::Retry => 2,
            InputAction::Quit => 3,
        }
    }
}

/// Edge-triggered actions for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_states(pressed: ActionStates) -> Self {
        Self { pressed }
    }

    pub fn with_pressed(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self
    }

    pub fn pressed(&self, action: InputAction) -> bool {
        self.pressed.is_set(action)
    }
}
