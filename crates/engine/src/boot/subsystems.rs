use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::clock::FrameInfo;
use crate::ui::{Screen, ScreenCommand, ScreenName};
use crate::{InputSnapshot, Viewport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubsystemError {
    message: String,
}

impl SubsystemError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The rendering, UI and input collaborators the boot sequence drives. The
/// core never looks inside them.
pub trait Subsystems {
    fn init_scene(&mut self, viewport: Viewport) -> LocalBoxFuture<'_, Result<(), SubsystemError>>;

    /// Builds the game's own screens. The loading and error screens belong to
    /// the core and must not be returned here.
    fn init_ui(&mut self) -> LocalBoxFuture<'_, Result<Vec<Box<dyn Screen>>, SubsystemError>>;

    fn init_input(&mut self) -> LocalBoxFuture<'_, Result<(), SubsystemError>>;

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        visible: Option<ScreenName>,
    ) -> Result<ScreenCommand, SubsystemError>;

    fn render(&mut self, frame: &FrameInfo) -> Result<(), SubsystemError>;

    fn resize(&mut self, _viewport: Viewport) {}

    fn shutdown(&mut self) {}
}
