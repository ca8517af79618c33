use std::cell::Cell;
use std::rc::Rc;

use fw_engine::{Screen, ScreenName};

/// Run timing shared between the HUD, the death screen and the routing logic.
#[derive(Debug, Default)]
pub(crate) struct Session {
    run_seconds: Cell<f32>,
    last_survival_seconds: Cell<f32>,
    runs_started: Cell<u32>,
}

impl Session {
    pub(crate) fn begin_run(&self) {
        self.run_seconds.set(0.0);
        self.runs_started.set(self.runs_started.get().saturating_add(1));
    }

    pub(crate) fn end_run(&self) {
        self.last_survival_seconds.set(self.run_seconds.get());
    }

    pub(crate) fn tick(&self, dt_seconds: f32) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.run_seconds.set(self.run_seconds.get() + dt_seconds);
        }
    }

    pub(crate) fn run_seconds(&self) -> f32 {
        self.run_seconds.get()
    }

    pub(crate) fn last_survival_seconds(&self) -> f32 {
        self.last_survival_seconds.get()
    }

    pub(crate) fn runs_started(&self) -> u32 {
        self.runs_started.get()
    }

    pub(crate) fn reset(&self) {
        self.run_seconds.set(0.0);
        self.last_survival_seconds.set(0.0);
        self.runs_started.set(0);
    }
}

/// `mm:ss`, minutes uncapped.
pub(crate) fn format_survival_time(seconds: f32) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

pub(crate) struct LoginScreen;

impl Screen for LoginScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Login
    }

    fn caption(&self) -> String {
        "Login - Enter: play as guest".to_string()
    }
}

pub(crate) struct HomeScreen {
    session: Rc<Session>,
}

impl HomeScreen {
    pub(crate) fn new(session: Rc<Session>) -> Self {
        Self { session }
    }
}

impl Screen for HomeScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Home
    }

    fn caption(&self) -> String {
        format!(
            "Home - runs played: {} - Enter: start game",
            self.session.runs_started()
        )
    }
}

pub(crate) struct HudScreen {
    session: Rc<Session>,
}

impl HudScreen {
    pub(crate) fn new(session: Rc<Session>) -> Self {
        Self { session }
    }
}

impl Screen for HudScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Hud
    }

    fn caption(&self) -> String {
        format!(
            "Time {} - Enter: end run, Backspace: menu",
            format_survival_time(self.session.run_seconds())
        )
    }

    fn update(&mut self, dt_seconds: f32) {
        self.session.tick(dt_seconds);
    }
}

pub(crate) struct DeathScreen {
    session: Rc<Session>,
}

impl DeathScreen {
    pub(crate) fn new(session: Rc<Session>) -> Self {
        Self { session }
    }
}

impl Screen for DeathScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Death
    }

    fn caption(&self) -> String {
        format!(
            "You died - survived {} - Enter: respawn, Backspace: quit to menu",
            format_survival_time(self.session.last_survival_seconds())
        )
    }
}

pub(crate) fn build_game_screens(session: &Rc<Session>) -> Vec<Box<dyn Screen>> {
    vec![
        Box::new(LoginScreen),
        Box::new(HomeScreen::new(Rc::clone(session))),
        Box::new(HudScreen::new(Rc::clone(session))),
        Box::new(DeathScreen::new(Rc::clone(session))),
    ]
}
