use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use fw_engine::{
    FrameInfo, InputAction, InputSnapshot, Screen, ScreenCommand, ScreenName, SubsystemError,
    Subsystems, Viewport,
};
use tracing::{debug, info};

use super::screens::{build_game_screens, Session};

/// Screen routing and the placeholder scene for Future World. Rendering of
/// the world itself is out of scope; the scene only tracks the viewport.
#[derive(Debug, Default)]
pub(crate) struct GameSubsystems {
    session: Rc<Session>,
    viewport: Option<Viewport>,
    input_ready: bool,
    frames_rendered: u64,
}

impl GameSubsystems {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn route(&self, visible: Option<ScreenName>, input: &InputSnapshot) -> ScreenCommand {
        let confirm = input.pressed(InputAction::Confirm);
        let back = input.pressed(InputAction::Back);

        match visible {
            Some(ScreenName::Login) if confirm => {
                info!("guest_login");
                ScreenCommand::Show(ScreenName::Home)
            }
            Some(ScreenName::Home) if confirm => {
                self.session.begin_run();
                info!(run = self.session.runs_started(), "game_started");
                ScreenCommand::Show(ScreenName::Hud)
            }
            Some(ScreenName::Hud) if confirm => {
                self.session.end_run();
                info!(
                    survival_seconds = self.session.last_survival_seconds(),
                    "player_died"
                );
                ScreenCommand::Show(ScreenName::Death)
            }
            Some(ScreenName::Hud) if back => ScreenCommand::Show(ScreenName::Home),
            Some(ScreenName::Death) if confirm => {
                self.session.begin_run();
                info!(run = self.session.runs_started(), "player_respawned");
                ScreenCommand::Show(ScreenName::Hud)
            }
            Some(ScreenName::Death) if back => ScreenCommand::Show(ScreenName::Home),
            _ => ScreenCommand::None,
        }
    }
}

impl Subsystems for GameSubsystems {
    fn init_scene(&mut self, viewport: Viewport) -> LocalBoxFuture<'_, Result<(), SubsystemError>> {
        let result = if viewport.is_empty() {
            Err(SubsystemError::new(format!(
                "cannot create a {}x{} scene",
                viewport.width, viewport.height
            )))
        } else {
            self.viewport = Some(viewport);
            info!(
                width = viewport.width,
                height = viewport.height,
                "scene_initialized"
            );
            Ok(())
        };
        future::ready(result).boxed_local()
    }

    fn init_ui(&mut self) -> LocalBoxFuture<'_, Result<Vec<Box<dyn Screen>>, SubsystemError>> {
        future::ready(Ok(build_game_screens(&self.session))).boxed_local()
    }

    fn init_input(&mut self) -> LocalBoxFuture<'_, Result<(), SubsystemError>> {
        self.input_ready = true;
        future::ready(Ok(())).boxed_local()
    }

    fn update(
        &mut self,
        _dt_seconds: f32,
        input: &InputSnapshot,
        visible: Option<ScreenName>,
    ) -> Result<ScreenCommand, SubsystemError> {
        if !self.input_ready {
            return Err(SubsystemError::new("input was not initialized"));
        }
        Ok(self.route(visible, input))
    }

    fn render(&mut self, _frame: &FrameInfo) -> Result<(), SubsystemError> {
        if self.viewport.is_none() {
            return Err(SubsystemError::new("scene was not initialized"));
        }
        self.frames_rendered = self.frames_rendered.saturating_add(1);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "scene_resized"
        );
        self.viewport = Some(viewport);
    }

    fn shutdown(&mut self) {
        info!(frames = self.frames_rendered, "scene_shutdown");
        self.session.reset();
        self.viewport = None;
        self.input_ready = false;
        self.frames_rendered = 0;
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    fn ready_systems() -> GameSubsystems {
        let mut systems = GameSubsystems::new();
        block_on(systems.init_scene(Viewport::new(1280, 720))).expect("scene");
        block_on(systems.init_input()).expect("input");
        systems
    }

    fn step(
        systems: &mut GameSubsystems,
        visible: ScreenName,
        action: Option<InputAction>,
    ) -> ScreenCommand {
        let input = match action {
            Some(action) => InputSnapshot::empty().with_pressed(action),
            None => InputSnapshot::empty(),
        };
        systems
            .update(0.016, &input, Some(visible))
            .expect("update")
    }

    #[test]
    fn menu_flow_follows_confirm_and_back() {
        let mut systems = ready_systems();
        let cases = [
            (ScreenName::Login, InputAction::Confirm, ScreenName::Home),
            (ScreenName::Home, InputAction::Confirm, ScreenName::Hud),
            (ScreenName::Hud, InputAction::Back, ScreenName::Home),
            (ScreenName::Hud, InputAction::Confirm, ScreenName::Death),
            (ScreenName::Death, InputAction::Confirm, ScreenName::Hud),
            (ScreenName::Death, InputAction::Back, ScreenName::Home),
        ];
        for (visible, action, expected) in cases {
            assert_eq!(
                step(&mut systems, visible, Some(action)),
                ScreenCommand::Show(expected),
                "{visible} + {action:?}"
            );
        }
    }

    #[test]
    fn no_input_or_unmapped_input_keeps_screen() {
        let mut systems = ready_systems();
        assert_eq!(step(&mut systems, ScreenName::Hud, None), ScreenCommand::None);
        assert_eq!(
            step(&mut systems, ScreenName::Login, Some(InputAction::Back)),
            ScreenCommand::None
        );
        assert_eq!(
            step(&mut systems, ScreenName::Loading, Some(InputAction::Confirm)),
            ScreenCommand::None
        );
    }

    #[test]
    fn starting_a_game_begins_a_run() {
        let mut systems = ready_systems();
        step(&mut systems, ScreenName::Home, Some(InputAction::Confirm));
        step(&mut systems, ScreenName::Death, Some(InputAction::Confirm));
        assert_eq!(systems.session.runs_started(), 2);
    }

    #[test]
    fn empty_viewport_fails_scene_init() {
        let mut systems = GameSubsystems::new();
        let error = block_on(systems.init_scene(Viewport::new(0, 0))).expect_err("empty");
        assert!(error.message().contains("0x0"));
    }

    #[test]
    fn update_before_input_init_is_an_error() {
        let mut systems = GameSubsystems::new();
        assert!(systems
            .update(0.016, &InputSnapshot::empty(), Some(ScreenName::Login))
            .is_err());
    }

    #[test]
    fn shutdown_resets_session() {
        let mut systems = ready_systems();
        step(&mut systems, ScreenName::Home, Some(InputAction::Confirm));
        systems
            .render(&FrameInfo {
                index: 1,
                dt_seconds: 0.016,
                elapsed: std::time::Duration::from_millis(16),
            })
            .expect("render");
        assert_eq!(systems.frames_rendered, 1);

        systems.shutdown();
        assert_eq!(systems.session.runs_started(), 0);
        assert_eq!(systems.frames_rendered, 0);
    }
}
