use fw_engine::{
    read_manifest, resolve_app_paths, AppError, AssetManifest, BootConfig, FsAssetLoader,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::systems::GameSubsystems;

pub(crate) struct AppWiring {
    pub(crate) config: BootConfig,
    pub(crate) subsystems: GameSubsystems,
    pub(crate) loader: FsAssetLoader,
    pub(crate) manifest: AssetManifest,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Future World Startup ===");

    let paths = resolve_app_paths()?;
    let manifest_path = paths.manifest_path();
    let manifest = read_manifest(&manifest_path)?;
    info!(
        root = %paths.root.display(),
        asset_root = %paths.asset_root.display(),
        manifest = %manifest_path.display(),
        units = manifest.len(),
        "startup"
    );

    Ok(AppWiring {
        config: BootConfig::from_env(),
        subsystems: GameSubsystems::new(),
        loader: FsAssetLoader::new(paths.asset_root),
        manifest,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
