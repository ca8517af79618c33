use std::fmt;

use thiserror::Error;

use crate::assets::{AssetLoadError, ManifestError};
use crate::progress::ProgressError;
use crate::ui::ScreenError;

use super::{BootPhase, SubsystemError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Scene,
    Ui,
    Assets,
    Input,
}

impl InitStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            InitStage::Scene => "scene",
            InitStage::Ui => "ui",
            InitStage::Assets => "assets",
            InitStage::Input => "input",
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum InitFailure {
    #[error(transparent)]
    Subsystem(#[from] SubsystemError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Error)]
pub enum InvalidStateError {
    #[error("cannot {action} while {phase}")]
    Transition {
        action: &'static str,
        phase: BootPhase,
    },
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("{stage} initialization failed: {source}")]
    Initialization {
        stage: InitStage,
        #[source]
        source: InitFailure,
    },
    #[error("asset load failed: {0}")]
    AssetLoad(#[from] AssetLoadError),
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidStateError),
}

impl BootError {
    pub(crate) fn init(stage: InitStage, source: impl Into<InitFailure>) -> Self {
        BootError::Initialization {
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn transition(action: &'static str, phase: BootPhase) -> Self {
        BootError::InvalidState(InvalidStateError::Transition { action, phase })
    }
}

impl From<ScreenError> for BootError {
    fn from(error: ScreenError) -> Self {
        BootError::InvalidState(error.into())
    }
}

impl From<ProgressError> for BootError {
    fn from(error: ProgressError) -> Self {
        BootError::InvalidState(error.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::ScreenName;

    use super::*;

    #[test]
    fn messages_name_the_failing_piece() {
        let init = BootError::init(InitStage::Scene, SubsystemError::new("no gpu adapter"));
        assert_eq!(
            init.to_string(),
            "scene initialization failed: no gpu adapter"
        );

        let state: BootError = ScreenError::Unknown {
            name: ScreenName::Death,
        }
        .into();
        assert_eq!(
            state.to_string(),
            "invalid state: screen not registered: death"
        );

        let transition = BootError::transition("start loading", BootPhase::Uninitialized);
        assert_eq!(
            transition.to_string(),
            "invalid state: cannot start loading while uninitialized"
        );
    }
}
