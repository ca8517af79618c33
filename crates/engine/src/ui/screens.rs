use crate::progress::ProgressHandle;

use super::{Screen, ScreenName};

const LOADING_TITLE: &str = "Loading Future World";
pub const DEFAULT_LOADING_TIP: &str = "Tip: Complete daily challenges for extra rewards!";
const DEFAULT_ERROR_MESSAGE: &str = "Failed to initialize game";
const RETRY_HINT: &str = "Press R to retry";

/// Status line shown under the loading bar for a given ratio.
pub fn loading_status_text(ratio: f32) -> &'static str {
    if ratio > 0.8 {
        "Almost there..."
    } else if ratio > 0.6 {
        "Loading textures..."
    } else if ratio > 0.3 {
        "Loading models..."
    } else {
        "Initializing..."
    }
}

fn progress_percent(ratio: f32) -> u32 {
    (ratio * 100.0).clamp(0.0, 100.0).round() as u32
}

#[derive(Debug, Clone)]
pub struct LoadingScreen {
    progress: ProgressHandle,
    tip: String,
}

impl LoadingScreen {
    pub fn new(progress: ProgressHandle) -> Self {
        Self {
            progress,
            tip: DEFAULT_LOADING_TIP.to_string(),
        }
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = tip.into();
        self
    }

    pub fn tip(&self) -> &str {
        &self.tip
    }
}

impl Screen for LoadingScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Loading
    }

    fn caption(&self) -> String {
        let ratio = self.progress.snapshot().ratio;
        format!(
            "{LOADING_TITLE} - {} {}% - {}",
            loading_status_text(ratio),
            progress_percent(ratio),
            self.tip
        )
    }

    fn progress(&self) -> Option<f32> {
        Some(self.progress.snapshot().ratio.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone)]
pub struct ErrorScreen {
    message: String,
}

impl ErrorScreen {
    pub fn new() -> Self {
        Self {
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for ErrorScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for ErrorScreen {
    fn name(&self) -> ScreenName {
        ScreenName::Error
    }

    fn caption(&self) -> String {
        format!("Error: {} ({RETRY_HINT})", self.message)
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }
}

#[cfg(test)]
mod tests {
    use crate::progress::{ProgressObserver, ProgressUpdate};

    use super::*;

    #[test]
    fn status_text_follows_progress_thresholds() {
        assert_eq!(loading_status_text(0.0), "Initializing...");
        assert_eq!(loading_status_text(0.3), "Initializing...");
        assert_eq!(loading_status_text(0.31), "Loading models...");
        assert_eq!(loading_status_text(0.61), "Loading textures...");
        assert_eq!(loading_status_text(0.81), "Almost there...");
        assert_eq!(loading_status_text(1.0), "Almost there...");
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(progress_percent(-0.5), 0);
        assert_eq!(progress_percent(0.444), 44);
        assert_eq!(progress_percent(1.7), 100);
    }

    #[test]
    fn loading_caption_reads_shared_progress() {
        let mut handle = ProgressHandle::default();
        let screen = LoadingScreen::new(handle.clone());
        handle.on_progress(ProgressUpdate {
            completed: 1,
            total: 2,
            ratio: 0.5,
        });

        assert_eq!(screen.progress(), Some(0.5));
        assert_eq!(
            screen.caption(),
            "Loading Future World - Loading models... 50% - Tip: Complete daily challenges for extra rewards!"
        );
    }

    #[test]
    fn custom_tip_replaces_default() {
        let screen = LoadingScreen::new(ProgressHandle::default()).with_tip("Tip: hold R to retry");
        assert_eq!(screen.tip(), "Tip: hold R to retry");
        assert!(screen.caption().ends_with("0% - Tip: hold R to retry"));
    }

    #[test]
    fn error_screen_shows_latest_message() {
        let mut screen = ErrorScreen::new();
        assert!(screen.caption().contains(DEFAULT_ERROR_MESSAGE));
        screen.set_message("texture terrain missing");
        assert_eq!(screen.message(), "texture terrain missing");
        assert!(screen.caption().contains("Press R to retry"));
    }
}
