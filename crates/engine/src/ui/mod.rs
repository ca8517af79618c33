mod registry;
mod screen;
mod screens;

pub use registry::{ScreenError, ScreenRegistry};
pub use screen::{Screen, ScreenCommand, ScreenName, ScreenView};
pub use screens::{loading_status_text, ErrorScreen, LoadingScreen, DEFAULT_LOADING_TIP};
