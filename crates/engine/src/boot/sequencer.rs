use std::task::{Context, Poll};
use std::time::Instant;

use futures::future;
use tracing::{debug, error, info, warn};

use crate::assets::{AssetCache, AssetLoader, AssetManifest, LoadBatch};
use crate::clock::{FrameInfo, FrameReport, FrameSink, FrameStatsHandle, GameClock};
use crate::config::BootConfig;
use crate::progress::{ProgressHandle, ProgressObserver, ProgressTracker, ProgressUpdate};
use crate::ui::{
    ErrorScreen, LoadingScreen, Screen, ScreenCommand, ScreenName, ScreenRegistry, ScreenView,
};
use crate::{InputSnapshot, Viewport};

use super::{BootError, BootPhase, InitStage, SubsystemError, Subsystems};

/// Drives one boot attempt from `uninitialized` to `running`, and owns the
/// screens, progress, asset cache and clock that the attempt produces.
pub struct BootSequencer<S, L> {
    config: BootConfig,
    subsystems: S,
    loader: L,
    manifest: AssetManifest,
    phase: BootPhase,
    phase_history: Vec<BootPhase>,
    viewport: Viewport,
    screens: ScreenRegistry,
    progress: ProgressTracker,
    loading_status: ProgressHandle,
    assets: AssetCache,
    batch: Option<LoadBatch>,
    clock: GameClock,
    failure: Option<String>,
    attempt: u32,
}

impl<S, L> std::fmt::Debug for BootSequencer<S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootSequencer")
            .field("phase", &self.phase)
            .field("attempt", &self.attempt)
            .field("viewport", &self.viewport)
            .field("screens", &self.screens)
            .field("progress", &self.progress)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl<S: Subsystems, L: AssetLoader> BootSequencer<S, L> {
    pub fn new(
        config: BootConfig,
        viewport: Viewport,
        subsystems: S,
        loader: L,
        manifest: AssetManifest,
    ) -> Self {
        let config = config.normalized();
        let loading_status = ProgressHandle::default();
        let mut progress = ProgressTracker::new();
        progress.subscribe(Box::new(loading_status.clone()));
        let clock = new_clock(&config);

        Self {
            config,
            subsystems,
            loader,
            manifest,
            phase: BootPhase::Uninitialized,
            phase_history: vec![BootPhase::Uninitialized],
            viewport,
            screens: ScreenRegistry::new(),
            progress,
            loading_status,
            assets: AssetCache::new(),
            batch: None,
            clock,
            failure: None,
            attempt: 1,
        }
    }

    /// Sets up the collaborators in order: scene, UI, assets, input.
    pub async fn init_systems(&mut self) -> Result<(), BootError> {
        self.expect_phase(BootPhase::Uninitialized, "initialize systems")?;
        info!(attempt = self.attempt, "boot_init_systems");

        match self.run_init_steps().await {
            Ok(()) => {
                self.enter(BootPhase::SystemsReady);
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn run_init_steps(&mut self) -> Result<(), BootError> {
        self.subsystems
            .init_scene(self.viewport)
            .await
            .map_err(|error| BootError::init(InitStage::Scene, error))?;

        let screens = self
            .subsystems
            .init_ui()
            .await
            .map_err(|error| BootError::init(InitStage::Ui, error))?;
        self.register_screens(screens)?;

        self.manifest
            .validate()
            .map_err(|error| BootError::init(InitStage::Assets, error))?;
        self.assets.clear();

        self.subsystems
            .init_input()
            .await
            .map_err(|error| BootError::init(InitStage::Input, error))?;
        Ok(())
    }

    fn register_screens(&mut self, extra: Vec<Box<dyn Screen>>) -> Result<(), BootError> {
        let owned: [Box<dyn Screen>; 2] = [
            Box::new(
                LoadingScreen::new(self.loading_status.clone())
                    .with_tip(self.config.loading_tip.clone()),
            ),
            Box::new(ErrorScreen::new()),
        ];
        for screen in owned.into_iter().chain(extra) {
            self.screens
                .register(screen)
                .map_err(|error| BootError::init(InitStage::Ui, error))?;
        }
        self.screens.resize_all(self.viewport);
        self.screens.hide_all();
        Ok(())
    }

    /// Shows the loading screen and starts every unit in the manifest at once.
    pub fn start_loading(&mut self) -> Result<(), BootError> {
        self.expect_phase(BootPhase::SystemsReady, "start loading")?;

        if let Err(error) = self.screens.show(ScreenName::Loading) {
            return Err(self.fail(error.into()));
        }
        let units = self
            .manifest
            .resolved_units(self.config.default_load_timeout);
        self.progress.begin(units.len());
        self.batch = Some(LoadBatch::spawn(&self.loader, &units));
        info!(units = units.len(), "asset_loading_started");
        self.enter(BootPhase::AssetsLoading);
        Ok(())
    }

    /// Drains finished loads. `Ready(Ok)` once all units resolved; the first
    /// failure drops the rest and moves to `errored`.
    pub fn poll_loading(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), BootError>> {
        if self.phase != BootPhase::AssetsLoading {
            return Poll::Ready(Err(BootError::transition("poll loading", self.phase)));
        }

        loop {
            let next = match self.batch.as_mut() {
                Some(batch) => batch.poll_next(cx),
                None => Poll::Ready(None),
            };
            match next {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(asset))) => {
                    let kind = asset.payload.kind();
                    let key = asset.key.clone();
                    self.assets.insert(asset);
                    match self.progress.advance() {
                        Ok(update) => debug!(
                            kind = %kind,
                            key = key.as_str(),
                            completed = update.completed,
                            total = update.total,
                            "asset_loaded"
                        ),
                        Err(error) => return Poll::Ready(Err(self.fail(error.into()))),
                    }
                }
                Poll::Ready(Some(Err(load_error))) => {
                    warn!(
                        key = load_error.key(),
                        error = %load_error,
                        "asset_load_failed"
                    );
                    return Poll::Ready(Err(self.fail(load_error.into())));
                }
                Poll::Ready(None) => {
                    self.batch = None;
                    self.screens.hide_all();
                    info!(assets = self.assets.len(), "asset_loading_finished");
                    self.enter(BootPhase::AssetsReady);
                    return Poll::Ready(Ok(()));
                }
            }
        }
    }

    pub async fn finish_loading(&mut self) -> Result<(), BootError> {
        future::poll_fn(|cx| self.poll_loading(cx)).await
    }

    /// Shows the entry screen and starts the clock.
    pub fn present_entry(&mut self, now: Instant) -> Result<(), BootError> {
        self.expect_phase(BootPhase::AssetsReady, "present entry screen")?;

        if let Err(error) = self.screens.show(self.config.entry_screen) {
            return Err(self.fail(error.into()));
        }
        self.clock.start(now);
        self.enter(BootPhase::Running);
        Ok(())
    }

    /// The whole boot attempt: init, load everything, present the entry screen.
    pub async fn boot(&mut self) -> Result<(), BootError> {
        self.init_systems().await?;
        self.start_loading()?;
        self.finish_loading().await?;
        self.present_entry(Instant::now())
    }

    /// One update/render step. Only runs while `running`.
    pub fn frame(&mut self, now: Instant, input: &InputSnapshot) -> Option<FrameReport> {
        if self.phase != BootPhase::Running {
            return None;
        }
        let mut sink = RunningFrame {
            subsystems: &mut self.subsystems,
            screens: &mut self.screens,
            input,
        };
        self.clock.frame(now, &mut sink)
    }

    /// Returns `false` for zero-area sizes, which are ignored.
    pub fn handle_resize(&mut self, viewport: Viewport) -> bool {
        if viewport.is_empty() {
            debug!(
                width = viewport.width,
                height = viewport.height,
                "resize_ignored"
            );
            return false;
        }
        self.viewport = viewport;
        self.subsystems.resize(viewport);
        self.screens.resize_all(viewport);
        true
    }

    /// Discards everything this attempt produced and returns to
    /// `uninitialized`. The only way out of `errored`.
    pub fn restart(&mut self) {
        self.teardown();
        self.progress.reset();
        self.loading_status.publish(ProgressUpdate::default());
        self.clock.reset();
        self.failure = None;
        self.phase = BootPhase::Uninitialized;
        self.phase_history = vec![BootPhase::Uninitialized];
        self.attempt = self.attempt.saturating_add(1);
        info!(attempt = self.attempt, "boot_restarted");
    }

    pub fn shutdown(&mut self) {
        self.teardown();
        info!(attempt = self.attempt, phase = %self.phase, "boot_shutdown");
    }

    fn teardown(&mut self) {
        self.batch = None;
        self.clock.stop();
        self.subsystems.shutdown();
        self.screens.clear();
        self.assets.clear();
    }

    pub fn subscribe_progress(&mut self, observer: Box<dyn ProgressObserver>) {
        self.progress.subscribe(observer);
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Every phase entered during this attempt, oldest first.
    pub fn phase_history(&self) -> &[BootPhase] {
        &self.phase_history
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn screens(&self) -> &ScreenRegistry {
        &self.screens
    }

    pub fn visible_view(&self) -> Option<ScreenView> {
        self.screens.visible_view()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn loading_status(&self) -> ProgressHandle {
        self.loading_status.clone()
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn frame_stats(&self) -> FrameStatsHandle {
        self.clock.stats()
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn subsystems(&self) -> &S {
        &self.subsystems
    }

    pub fn subsystems_mut(&mut self) -> &mut S {
        &mut self.subsystems
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn expect_phase(&self, expected: BootPhase, action: &'static str) -> Result<(), BootError> {
        if self.phase == expected {
            return Ok(());
        }
        warn!(action, phase = %self.phase, "boot_transition_rejected");
        Err(BootError::transition(action, self.phase))
    }

    fn enter(&mut self, next: BootPhase) {
        debug_assert!(self.phase.can_enter(next), "{} -> {}", self.phase, next);
        info!(
            from = %self.phase,
            to = %next,
            attempt = self.attempt,
            "boot_phase_changed"
        );
        self.phase = next;
        self.phase_history.push(next);
    }

    /// Moves to `errored` (once) and puts the message on the error screen.
    fn fail(&mut self, cause: BootError) -> BootError {
        self.batch = None;
        self.assets.clear();
        self.clock.stop();

        if self.phase.can_enter(BootPhase::Errored) {
            let message = cause.to_string();
            error!(
                phase = %self.phase,
                attempt = self.attempt,
                error = message.as_str(),
                "boot_failed"
            );
            self.enter(BootPhase::Errored);
            self.screens.show_error(&message);
            self.failure = Some(message);
        }
        cause
    }
}

fn new_clock(config: &BootConfig) -> GameClock {
    GameClock::new(config.max_frame_delta, config.stats_log_interval)
        .with_stats_logging(config.debug)
}

struct RunningFrame<'a, S> {
    subsystems: &'a mut S,
    screens: &'a mut ScreenRegistry,
    input: &'a InputSnapshot,
}

impl<S: Subsystems> FrameSink for RunningFrame<'_, S> {
    fn update(&mut self, dt_seconds: f32) -> Result<(), SubsystemError> {
        let visible = self.screens.visible();
        let command = self.subsystems.update(dt_seconds, self.input, visible)?;
        self.screens.update_visible(dt_seconds);
        if let ScreenCommand::Show(name) = command {
            self.screens
                .show(name)
                .map_err(|error| SubsystemError::new(error.to_string()))?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &FrameInfo) -> Result<(), SubsystemError> {
        self.subsystems.render(frame)
    }
}
