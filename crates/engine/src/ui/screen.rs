use std::fmt;

use crate::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScreenName {
    Login,
    Home,
    Hud,
    Loading,
    Death,
    Error,
}

impl ScreenName {
    pub const ALL: [ScreenName; 6] = [
        ScreenName::Login,
        ScreenName::Home,
        ScreenName::Hud,
        ScreenName::Loading,
        ScreenName::Death,
        ScreenName::Error,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ScreenName::Login => "login",
            ScreenName::Home => "home",
            ScreenName::Hud => "hud",
            ScreenName::Loading => "loading",
            ScreenName::Death => "death",
            ScreenName::Error => "error",
        }
    }
}

impl fmt::Display for ScreenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    None,
    Show(ScreenName),
}

/// What a host needs to draw the visible screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub name: ScreenName,
    pub caption: String,
    pub progress: Option<f32>,
}

/// A UI screen. Screens own whatever they display and are built once at
/// registration; the registry drives their visibility.
pub trait Screen {
    fn name(&self) -> ScreenName;
    fn caption(&self) -> String;
    fn progress(&self) -> Option<f32> {
        None
    }
    fn on_show(&mut self) {}
    fn on_hide(&mut self) {}
    fn update(&mut self, _dt_seconds: f32) {}
    fn resize(&mut self, _viewport: Viewport) {}
    fn set_message(&mut self, _message: &str) {}
}
