use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;
pub mod boot;
pub mod clock;
pub mod config;
mod input;
pub mod progress;
pub mod ui;
mod viewport;

pub use app::{run_app, AppError, Renderer};
pub use assets::{
    parse_manifest, read_manifest, AssetCache, AssetKind, AssetLoadError, AssetLoader,
    AssetManifest, AssetPayload, FsAssetLoader, LoadFuture, LoadUnit, LoadedAsset, ManifestError,
    ModelData, SoundData, TextureData,
};
pub use boot::{
    BootError, BootPhase, BootSequencer, InitFailure, InitStage, InvalidStateError,
    SubsystemError, Subsystems,
};
pub use clock::{FrameInfo, FrameReport, FrameSink, FrameStatsHandle, FrameStatsSnapshot, GameClock};
pub use config::BootConfig;
pub use input::{InputAction, InputSnapshot};
pub use progress::{ProgressError, ProgressHandle, ProgressObserver, ProgressTracker, ProgressUpdate};
pub use ui::{
    loading_status_text, ErrorScreen, LoadingScreen, Screen, ScreenCommand, ScreenError,
    ScreenName, ScreenRegistry, ScreenView,
};
pub use viewport::Viewport;

pub const ROOT_ENV_VAR: &str = "FW_ROOT";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub asset_root: PathBuf,
}

impl AppPaths {
    pub fn manifest_path(&self) -> PathBuf {
        self.asset_root.join(MANIFEST_FILE_NAME)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "FW_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/future-world\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let asset_root = root.join("assets");
    Ok(AppPaths { root, asset_root })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
