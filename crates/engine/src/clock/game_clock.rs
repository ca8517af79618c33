use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::boot::SubsystemError;

use super::stats::{FrameStatsAccumulator, FrameStatsHandle};

/// Per-frame work driven by the clock: update first, then render.
pub trait FrameSink {
    fn update(&mut self, dt_seconds: f32) -> Result<(), SubsystemError>;
    fn render(&mut self, frame: &FrameInfo) -> Result<(), SubsystemError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    pub dt_seconds: f32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: FrameInfo,
    pub raw_delta: Duration,
    pub clamped: bool,
    pub update_ok: bool,
    pub render_ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Idle,
    Running {
        started_at: Instant,
        last_frame: Instant,
    },
    Stopped,
}

#[derive(Debug)]
pub struct GameClock {
    max_frame_delta: Duration,
    state: ClockState,
    frame_index: u64,
    stats: FrameStatsAccumulator,
    stats_handle: FrameStatsHandle,
    log_stats: bool,
}

impl GameClock {
    pub fn new(max_frame_delta: Duration, stats_interval: Duration) -> Self {
        Self {
            max_frame_delta,
            state: ClockState::Idle,
            frame_index: 0,
            stats: FrameStatsAccumulator::new(stats_interval),
            stats_handle: FrameStatsHandle::default(),
            log_stats: false,
        }
    }

    pub fn with_stats_logging(mut self, enabled: bool) -> Self {
        self.log_stats = enabled;
        self
    }

    /// Starts the clock once per boot attempt. Later calls, including after
    /// `stop`, do nothing and return `false`.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != ClockState::Idle {
            debug!("game_clock_start_ignored");
            return false;
        }
        self.state = ClockState::Running {
            started_at: now,
            last_frame: now,
        };
        self.stats.begin(now);
        info!(
            max_frame_delta_ms = self.max_frame_delta.as_millis() as u64,
            "game_clock_started"
        );
        true
    }

    pub fn stop(&mut self) {
        if let ClockState::Running { .. } = self.state {
            self.state = ClockState::Stopped;
            info!(frames = self.frame_index, "game_clock_stopped");
        }
    }

    /// Back to a never-started clock for a fresh boot attempt.
    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
        self.frame_index = 0;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.state {
            ClockState::Running { started_at, .. } => Some(started_at),
            ClockState::Idle | ClockState::Stopped => None,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    pub fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }

    pub fn stats(&self) -> FrameStatsHandle {
        self.stats_handle.clone()
    }

    /// Runs one frame if the clock is running. Update and render errors are
    /// logged and counted; the frame still completes.
    pub fn frame<S: FrameSink + ?Sized>(
        &mut self,
        now: Instant,
        sink: &mut S,
    ) -> Option<FrameReport> {
        let ClockState::Running {
            started_at,
            last_frame,
        } = self.state
        else {
            return None;
        };

        let raw_delta = now.saturating_duration_since(last_frame);
        let dt = clamp_frame_delta(raw_delta, self.max_frame_delta);
        self.state = ClockState::Running {
            started_at,
            last_frame: now.max(last_frame),
        };
        self.frame_index = self.frame_index.saturating_add(1);
        let frame = FrameInfo {
            index: self.frame_index,
            dt_seconds: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(started_at),
        };

        let update_ok = match sink.update(frame.dt_seconds) {
            Ok(()) => true,
            Err(error) => {
                warn!(frame = frame.index, error = %error, "frame_update_failed");
                self.stats.record_update_failure();
                false
            }
        };
        let render_ok = match sink.render(&frame) {
            Ok(()) => true,
            Err(error) => {
                warn!(frame = frame.index, error = %error, "frame_render_failed");
                self.stats.record_render_failure();
                false
            }
        };

        self.stats.record_frame(raw_delta);
        if let Some(snapshot) = self.stats.maybe_snapshot(now) {
            self.stats_handle.publish(snapshot);
            if self.log_stats {
                info!(
                    fps = snapshot.fps,
                    frame_time_ms = snapshot.frame_time_ms,
                    update_failures = snapshot.update_failures,
                    render_failures = snapshot.render_failures,
                    "frame_stats"
                );
            }
        }

        Some(FrameReport {
            frame,
            raw_delta,
            clamped: raw_delta > dt,
            update_ok,
            render_ok,
        })
    }
}

pub(crate) fn clamp_frame_delta(raw_delta: Duration, max_frame_delta: Duration) -> Duration {
    raw_delta.min(max_frame_delta)
}
