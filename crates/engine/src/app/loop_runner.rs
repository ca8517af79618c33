use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use futures::task::noop_waker_ref;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::assets::{AssetLoader, AssetManifest, ManifestError};
use crate::boot::{BootPhase, BootSequencer, Subsystems};
use crate::config::BootConfig;
use crate::ui::ScreenView;
use crate::{InputAction, InputSnapshot, StartupError, Viewport};

use super::input::InputCollector;
use super::Renderer;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and runs boot plus the frame loop until the user quits.
/// Boot failures stay on the error screen; pressing R restarts the attempt.
pub fn run_app<S, L>(
    config: BootConfig,
    subsystems: S,
    loader: L,
    manifest: AssetManifest,
) -> Result<(), AppError>
where
    S: Subsystems + 'static,
    L: AssetLoader + 'static,
{
    let config = config.normalized();
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let render_fps_cap = config.render_fps_cap();
    let render_frame_target = target_frame_duration(render_fps_cap);
    info!(
        max_frame_delta_ms = config.max_frame_delta.as_millis() as u64,
        default_load_timeout_ms = config
            .default_load_timeout
            .map(|timeout| timeout.as_millis() as u64),
        render_fps_cap = %format_render_cap(render_fps_cap),
        entry_screen = %config.entry_screen,
        debug = config.debug,
        units = manifest.len(),
        "loop_config"
    );

    let base_title = config.window_title.clone();
    let mut sequencer =
        BootSequencer::new(config, renderer.viewport(), subsystems, loader, manifest);
    let mut input_collector = InputCollector::new();
    let mut last_present_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                        return;
                    }
                    sequencer.handle_resize(Viewport::new(new_size.width, new_size.height));
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                        return;
                    }
                    sequencer.handle_resize(Viewport::new(size.width, size.height));
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested() {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let input = input_collector.snapshot_for_frame();
                    drive_boot(&mut sequencer, Instant::now(), &input);

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let view = sequencer.visible_view();
                    if let Err(error) = renderer.render_screen(view.as_ref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = window_title_for(&base_title, view.as_ref());
                    if last_applied_title.as_deref() != Some(next_title.as_str()) {
                        window.set_title(&next_title);
                        last_applied_title = Some(next_title);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                sequencer.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Advances boot by at most one step per redraw, or runs a frame once running.
fn drive_boot<S, L>(sequencer: &mut BootSequencer<S, L>, now: Instant, input: &InputSnapshot)
where
    S: Subsystems,
    L: AssetLoader,
{
    let result = match sequencer.phase() {
        BootPhase::Uninitialized => block_on(sequencer.init_systems()),
        BootPhase::SystemsReady => sequencer.start_loading(),
        BootPhase::AssetsLoading => {
            let mut cx = Context::from_waker(noop_waker_ref());
            match sequencer.poll_loading(&mut cx) {
                Poll::Pending => Ok(()),
                Poll::Ready(result) => result,
            }
        }
        BootPhase::AssetsReady => sequencer.present_entry(now),
        BootPhase::Running => {
            sequencer.frame(now, input);
            Ok(())
        }
        BootPhase::Errored => {
            if input.pressed(InputAction::Retry) {
                info!(attempt = sequencer.attempt(), "boot_retry_requested");
                sequencer.restart();
            }
            Ok(())
        }
    };

    // The sequencer already logged the failure when it entered `errored`.
    if let Err(error) = result {
        debug!(error = %error, "boot_step_failed");
    }
}

fn window_title_for(base: &str, view: Option<&ScreenView>) -> String {
    match view {
        Some(view) => format!("{base} | {}", view.caption),
        None => base.to_string(),
    }
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
