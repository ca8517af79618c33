mod batch;
mod cache;
mod fs_loader;
mod hashing;
mod loader;
mod manifest;
mod unit;

pub(crate) use batch::LoadBatch;
pub use cache::{AssetCache, ModelData, SoundData, TextureData};
pub use fs_loader::FsAssetLoader;
pub use loader::{AssetLoadError, AssetLoader, AssetPayload, LoadFuture, LoadedAsset};
pub use manifest::{parse_manifest, read_manifest, AssetManifest, ManifestError};
pub use unit::{AssetKind, LoadUnit};
