use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static STATS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_stats_lock_poison_once(operation: &'static str) {
    if STATS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "frame stats lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStatsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub update_failures: u32,
    pub render_failures: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FrameStatsHandle {
    snapshot: Arc<RwLock<FrameStatsSnapshot>>,
}

impl FrameStatsHandle {
    pub fn snapshot(&self) -> FrameStatsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_stats_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: FrameStatsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_stats_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

/// Per-interval frame counters. Frame times are the unclamped deltas.
#[derive(Debug)]
pub(crate) struct FrameStatsAccumulator {
    interval_start: Option<Instant>,
    interval: Duration,
    frames: u32,
    frame_time_sum: Duration,
    update_failures: u32,
    render_failures: u32,
}

impl FrameStatsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: None,
            interval,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            update_failures: 0,
            render_failures: 0,
        }
    }

    pub(crate) fn begin(&mut self, now: Instant) {
        self.interval_start = Some(now);
        self.reset_counters();
    }

    pub(crate) fn record_frame(&mut self, raw_delta: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(raw_delta);
    }

    pub(crate) fn record_update_failure(&mut self) {
        self.update_failures = self.update_failures.saturating_add(1);
    }

    pub(crate) fn record_render_failure(&mut self) {
        self.render_failures = self.render_failures.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<FrameStatsSnapshot> {
        let start = self.interval_start?;
        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() / self.frames as f32 * 1000.0
        };
        let snapshot = FrameStatsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            update_failures: self.update_failures,
            render_failures: self.render_failures,
        };

        self.interval_start = Some(now);
        self.reset_counters();
        Some(snapshot)
    }

    fn reset_counters(&mut self) {
        self.frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.update_failures = 0;
        self.render_failures = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn snapshot_computes_rates_and_failures() {
        let base = Instant::now();
        let mut accumulator = FrameStatsAccumulator::new(Duration::from_secs(1));
        accumulator.begin(base);
        for _ in 0..4 {
            accumulator.record_frame(Duration::from_millis(20));
        }
        accumulator.record_update_failure();
        accumulator.record_render_failure();
        accumulator.record_render_failure();

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("snapshot after interval");

        assert!((snapshot.fps - 2.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.001);
        assert_eq!(snapshot.update_failures, 1);
        assert_eq!(snapshot.render_failures, 2);
    }

    #[test]
    fn no_snapshot_before_interval_or_before_begin() {
        let base = Instant::now();
        let mut accumulator = FrameStatsAccumulator::new(Duration::from_secs(1));
        assert!(accumulator.maybe_snapshot(base).is_none());

        accumulator.begin(base);
        accumulator.record_frame(Duration::from_millis(16));
        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn counters_reset_between_intervals() {
        let base = Instant::now();
        let mut accumulator = FrameStatsAccumulator::new(Duration::from_secs(1));
        accumulator.begin(base);
        accumulator.record_update_failure();
        let _ = accumulator.maybe_snapshot(base + Duration::from_secs(1));

        let next = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second snapshot");
        assert_eq!(next.update_failures, 0);
        assert_eq!(next.fps, 0.0);
    }

    #[test]
    fn handle_recovers_after_poison_without_panic() {
        let handle = FrameStatsHandle::default();
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = handle.snapshot.write().expect("write guard");
                    panic!("poison stats lock");
                })
                .join();
        });

        handle.publish(FrameStatsSnapshot {
            fps: 30.0,
            ..FrameStatsSnapshot::default()
        });
        assert_eq!(handle.snapshot().fps, 30.0);
    }
}
