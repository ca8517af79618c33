use std::env;
use std::time::Duration;

use tracing::warn;

use crate::ui::{ScreenName, DEFAULT_LOADING_TIP};

pub const MAX_FRAME_DELTA_ENV_VAR: &str = "FW_MAX_FRAME_DELTA_MS";
pub const LOAD_TIMEOUT_ENV_VAR: &str = "FW_LOAD_TIMEOUT_MS";
pub const MAX_RENDER_FPS_ENV_VAR: &str = "FW_MAX_RENDER_FPS";
pub const DEBUG_ENV_VAR: &str = "FW_DEBUG";

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
const DEFAULT_STATS_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct BootConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Upper bound on the delta handed to `update`.
    pub max_frame_delta: Duration,
    /// Applied to units whose manifest entry carries no timeout of its own.
    pub default_load_timeout: Option<Duration>,
    pub entry_screen: ScreenName,
    pub stats_log_interval: Duration,
    /// Zero disables the cap.
    pub max_render_fps: u32,
    pub debug: bool,
    /// Shown under the loading bar.
    pub loading_tip: String,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            window_title: "Future World".to_string(),
            window_width: 1280,
            window_height: 720,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            default_load_timeout: None,
            entry_screen: ScreenName::Login,
            stats_log_interval: DEFAULT_STATS_LOG_INTERVAL,
            max_render_fps: 60,
            debug: false,
            loading_tip: DEFAULT_LOADING_TIP.to_string(),
        }
    }
}

impl BootConfig {
    /// Defaults with `FW_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|var| env::var(var))
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&'static str) -> Result<String, env::VarError>,
    {
        if let Some(ms) = read_u64(&lookup, MAX_FRAME_DELTA_ENV_VAR) {
            self.max_frame_delta = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64(&lookup, LOAD_TIMEOUT_ENV_VAR) {
            self.default_load_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(fps) = read_u64(&lookup, MAX_RENDER_FPS_ENV_VAR) {
            self.max_render_fps = u32::try_from(fps).unwrap_or(u32::MAX);
        }
        if let Some(debug) = read_flag(&lookup, DEBUG_ENV_VAR) {
            self.debug = debug;
        }
        self.normalized()
    }

    /// Zero durations fall back to their defaults.
    pub fn normalized(mut self) -> Self {
        self.max_frame_delta =
            normalize_non_zero_duration(self.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
        self.stats_log_interval =
            normalize_non_zero_duration(self.stats_log_interval, DEFAULT_STATS_LOG_INTERVAL);
        self.default_load_timeout = self.default_load_timeout.filter(|value| !value.is_zero());
        self
    }

    pub fn render_fps_cap(&self) -> Option<u32> {
        Some(self.max_render_fps).filter(|fps| *fps > 0)
    }
}

pub(crate) fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn read_var<F>(lookup: &F, var: &'static str) -> Option<String>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    match lookup(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read config env var; falling back to config"
            );
            None
        }
    }
}

fn read_u64<F>(lookup: &F, var: &'static str) -> Option<u64>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    let value = read_var(lookup, var)?;
    match value.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(
                env_var = var,
                value = value.as_str(),
                "invalid config env var value; falling back to config"
            );
            None
        }
    }
}

fn read_flag<F>(lookup: &F, var: &'static str) -> Option<bool>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    let value = read_var(lookup, var)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => {
            warn!(
                env_var = var,
                value = value.as_str(),
                "invalid config env var value; falling back to config"
            );
            None
        }
    }
}
