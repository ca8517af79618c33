use thiserror::Error;
use tracing::{debug, info};

use crate::Viewport;

use super::screens::ErrorScreen;
use super::{Screen, ScreenName, ScreenView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("screen already registered: {name}")]
    Duplicate { name: ScreenName },
    #[error("screen not registered: {name}")]
    Unknown { name: ScreenName },
}

struct ScreenSlot {
    screen: Box<dyn Screen>,
    visible: bool,
}

/// Mutually exclusive UI screens. At most one slot is visible at a time.
#[derive(Default)]
pub struct ScreenRegistry {
    slots: Vec<ScreenSlot>,
}

impl std::fmt::Debug for ScreenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenRegistry")
            .field("registered", &self.names())
            .field("visible", &self.visible())
            .finish()
    }
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, screen: Box<dyn Screen>) -> Result<(), ScreenError> {
        let name = screen.name();
        if self.contains(name) {
            return Err(ScreenError::Duplicate { name });
        }
        debug!(screen = %name, "screen_registered");
        self.slots.push(ScreenSlot {
            screen,
            visible: false,
        });
        Ok(())
    }

    /// Makes `name` the only visible screen. Returns whether visibility changed.
    pub fn show(&mut self, name: ScreenName) -> Result<bool, ScreenError> {
        let Some(target) = self.index_of(name) else {
            return Err(ScreenError::Unknown { name });
        };
        if self.slots[target].visible {
            return Ok(false);
        }

        self.hide_all();
        let slot = &mut self.slots[target];
        slot.visible = true;
        slot.screen.on_show();
        info!(screen = %name, "screen_shown");
        Ok(true)
    }

    pub fn hide_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.visible) {
            slot.visible = false;
            slot.screen.on_hide();
        }
    }

    /// Shows the error screen with `message`, registering one first if the
    /// failure happened before any screens existed.
    pub fn show_error(&mut self, message: &str) {
        if !self.contains(ScreenName::Error) {
            self.slots.push(ScreenSlot {
                screen: Box::new(ErrorScreen::new()),
                visible: false,
            });
        }
        if let Some(index) = self.index_of(ScreenName::Error) {
            self.slots[index].screen.set_message(message);
        }
        // Registered just above, so `show` cannot fail here.
        let _ = self.show(ScreenName::Error);
    }

    pub fn visible(&self) -> Option<ScreenName> {
        self.slots
            .iter()
            .find(|slot| slot.visible)
            .map(|slot| slot.screen.name())
    }

    pub fn is_visible(&self, name: ScreenName) -> bool {
        self.visible() == Some(name)
    }

    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.visible).count()
    }

    pub fn contains(&self, name: ScreenName) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> Vec<ScreenName> {
        self.slots.iter().map(|slot| slot.screen.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn visible_view(&self) -> Option<ScreenView> {
        self.slots
            .iter()
            .find(|slot| slot.visible)
            .map(|slot| ScreenView {
                name: slot.screen.name(),
                caption: slot.screen.caption(),
                progress: slot.screen.progress(),
            })
    }

    pub fn update_visible(&mut self, dt_seconds: f32) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.visible) {
            slot.screen.update(dt_seconds);
        }
    }

    pub fn resize_all(&mut self, viewport: Viewport) {
        for slot in &mut self.slots {
            slot.screen.resize(viewport);
        }
    }

    /// Drops every screen together.
    pub fn clear(&mut self) {
        self.hide_all();
        self.slots.clear();
    }

    fn index_of(&self, name: ScreenName) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.screen.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    struct Calls {
        shows: u32,
        hides: u32,
        updates: u32,
        resizes: u32,
    }

    struct TestScreen {
        name: ScreenName,
        calls: Rc<RefCell<Calls>>,
    }

    impl Screen for TestScreen {
        fn name(&self) -> ScreenName {
            self.name
        }

        fn caption(&self) -> String {
            format!("test {}", self.name)
        }

        fn on_show(&mut self) {
            self.calls.borrow_mut().shows += 1;
        }

        fn on_hide(&mut self) {
            self.calls.borrow_mut().hides += 1;
        }

        fn update(&mut self, _dt_seconds: f32) {
            self.calls.borrow_mut().updates += 1;
        }

        fn resize(&mut self, _viewport: Viewport) {
            self.calls.borrow_mut().resizes += 1;
        }
    }

    fn registry_with(names: &[ScreenName]) -> (ScreenRegistry, Vec<Rc<RefCell<Calls>>>) {
        let mut registry = ScreenRegistry::new();
        let mut calls = Vec::new();
        for &name in names {
            let counter = Rc::new(RefCell::new(Calls::default()));
            registry
                .register(Box::new(TestScreen {
                    name,
                    calls: Rc::clone(&counter),
                }))
                .expect("register");
            calls.push(counter);
        }
        (registry, calls)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (mut registry, _) = registry_with(&[ScreenName::Login]);
        let error = registry
            .register(Box::new(TestScreen {
                name: ScreenName::Login,
                calls: Rc::default(),
            }))
            .expect_err("duplicate");
        assert_eq!(
            error,
            ScreenError::Duplicate {
                name: ScreenName::Login
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn nothing_is_visible_before_first_show() {
        let (registry, _) = registry_with(&[ScreenName::Login, ScreenName::Home]);
        assert_eq!(registry.visible(), None);
        assert_eq!(registry.visible_count(), 0);
    }

    #[test]
    fn show_leaves_exactly_one_visible_regardless_of_prior_state() {
        let (mut registry, _) =
            registry_with(&[ScreenName::Login, ScreenName::Home, ScreenName::Hud]);

        for prior in [None, Some(ScreenName::Login), Some(ScreenName::Hud)] {
            registry.hide_all();
            if let Some(prior) = prior {
                registry.show(prior).expect("show prior");
            }
            registry.show(ScreenName::Home).expect("show home");
            assert_eq!(registry.visible_count(), 1);
            assert!(registry.is_visible(ScreenName::Home));
        }
    }

    #[test]
    fn unknown_show_fails_and_keeps_visibility() {
        let (mut registry, _) = registry_with(&[ScreenName::Login, ScreenName::Home]);
        registry.show(ScreenName::Home).expect("show home");

        let error = registry.show(ScreenName::Death).expect_err("unknown");
        assert_eq!(
            error,
            ScreenError::Unknown {
                name: ScreenName::Death
            }
        );
        assert!(registry.is_visible(ScreenName::Home));
        assert_eq!(registry.visible_count(), 1);
    }

    #[test]
    fn repeated_show_does_not_repeat_side_effects() {
        let (mut registry, calls) = registry_with(&[ScreenName::Login, ScreenName::Home]);

        assert!(registry.show(ScreenName::Login).expect("first show"));
        assert!(!registry.show(ScreenName::Login).expect("second show"));

        assert_eq!(calls[0].borrow().shows, 1);
        assert_eq!(calls[0].borrow().hides, 0);
    }

    #[test]
    fn hide_all_is_idempotent() {
        let (mut registry, calls) = registry_with(&[ScreenName::Login]);
        registry.show(ScreenName::Login).expect("show");
        registry.hide_all();
        registry.hide_all();

        assert_eq!(registry.visible(), None);
        assert_eq!(calls[0].borrow().hides, 1);
    }

    #[test]
    fn switching_hides_previous_screen() {
        let (mut registry, calls) = registry_with(&[ScreenName::Login, ScreenName::Home]);
        registry.show(ScreenName::Login).expect("login");
        registry.show(ScreenName::Home).expect("home");

        assert_eq!(calls[0].borrow().hides, 1);
        assert_eq!(calls[1].borrow().shows, 1);
    }

    #[test]
    fn only_visible_screen_is_updated_but_all_are_resized() {
        let (mut registry, calls) = registry_with(&[ScreenName::Hud, ScreenName::Home]);
        registry.show(ScreenName::Hud).expect("hud");
        registry.update_visible(0.016);
        registry.resize_all(Viewport::new(800, 600));

        assert_eq!(calls[0].borrow().updates, 1);
        assert_eq!(calls[1].borrow().updates, 0);
        assert_eq!(calls[0].borrow().resizes, 1);
        assert_eq!(calls[1].borrow().resizes, 1);
    }

    #[test]
    fn show_error_registers_error_screen_on_demand() {
        let (mut registry, _) = registry_with(&[ScreenName::Login]);
        registry.show(ScreenName::Login).expect("login");

        registry.show_error("disk on fire");

        let view = registry.visible_view().expect("visible view");
        assert_eq!(view.name, ScreenName::Error);
        assert!(view.caption.contains("disk on fire"));
        assert_eq!(registry.visible_count(), 1);
    }

    #[test]
    fn clear_drops_all_screens() {
        let (mut registry, calls) = registry_with(&[ScreenName::Login, ScreenName::Home]);
        registry.show(ScreenName::Home).expect("home");
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(calls[1].borrow().hides, 1);
    }
}
