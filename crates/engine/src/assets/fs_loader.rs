use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use futures::channel::oneshot;
use futures::future::{self, FutureExt};
use tracing::debug;

use super::cache::{ModelData, SoundData, TextureData};
use super::hashing::sha256_hex;
use super::loader::{AssetLoadError, AssetLoader, AssetPayload, LoadFuture};
use super::unit::{AssetKind, LoadUnit};

/// Loads units from files under `root`, one worker thread per unit. Results
/// come back through a oneshot channel so the caller stays single-threaded.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsAssetLoader {
    fn load(&self, unit: &LoadUnit) -> LoadFuture {
        let kind = unit.kind();
        let key = unit.key().to_string();
        let path = self.root.join(unit.path());
        let (sender, receiver) = oneshot::channel();

        let worker_unit = unit.clone();
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name(format!("asset-load-{key}"))
            .spawn(move || {
                let result = load_from_disk(&worker_unit, &worker_path);
                // The receiver is gone once the batch has failed elsewhere.
                let _ = sender.send(result);
            });

        if let Err(source) = spawned {
            return future::ready(Err(AssetLoadError::Io {
                kind,
                key,
                path,
                source,
            }))
            .boxed_local();
        }

        async move {
            match receiver.await {
                Ok(result) => result,
                Err(oneshot::Canceled) => Err(AssetLoadError::Abandoned { kind, key }),
            }
        }
        .boxed_local()
    }
}

fn load_from_disk(unit: &LoadUnit, path: &Path) -> Result<AssetPayload, AssetLoadError> {
    let bytes = fs::read(path).map_err(|source| AssetLoadError::Io {
        kind: unit.kind(),
        key: unit.key().to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    verify_checksum(unit, &bytes)?;
    debug!(kind = %unit.kind(), key = unit.key(), byte_count = bytes.len(), "asset_read");
    decode_payload(unit, bytes)
}

fn verify_checksum(unit: &LoadUnit, bytes: &[u8]) -> Result<(), AssetLoadError> {
    let Some(expected) = unit.sha256() else {
        return Ok(());
    };
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(AssetLoadError::ChecksumMismatch {
            kind: unit.kind(),
            key: unit.key().to_string(),
            expected: expected.to_ascii_lowercase(),
            actual,
        })
    }
}

fn decode_payload(unit: &LoadUnit, bytes: Vec<u8>) -> Result<AssetPayload, AssetLoadError> {
    match unit.kind() {
        AssetKind::Model => Ok(AssetPayload::Model(ModelData { bytes })),
        AssetKind::Sound => Ok(AssetPayload::Sound(SoundData { bytes })),
        AssetKind::Texture => {
            let image = image::load_from_memory(&bytes)
                .map_err(|source| AssetLoadError::Decode {
                    key: unit.key().to_string(),
                    source,
                })?
                .to_rgba8();
            let (width, height) = image.dimensions();
            Ok(AssetPayload::Texture(TextureData {
                width,
                height,
                rgba: image.into_raw(),
            }))
        }
    }
}
