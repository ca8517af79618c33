use std::path::PathBuf;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use thiserror::Error;

use super::cache::{ModelData, SoundData, TextureData};
use super::unit::{AssetKind, LoadUnit};

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read {kind} {key} from {path}: {source}")]
    Io {
        kind: AssetKind,
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} {key} did not load within {}ms", .timeout.as_millis())]
    Timeout {
        kind: AssetKind,
        key: String,
        timeout: Duration,
    },
    #[error("{kind} {key} checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        kind: AssetKind,
        key: String,
        expected: String,
        actual: String,
    },
    #[error("failed to decode texture {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },
    #[error("loader for {kind} {key} stopped without a result")]
    Abandoned { kind: AssetKind, key: String },
    #[error("{kind} {key}: {message}")]
    Rejected {
        kind: AssetKind,
        key: String,
        message: String,
    },
}

impl AssetLoadError {
    pub fn key(&self) -> &str {
        match self {
            AssetLoadError::Io { key, .. }
            | AssetLoadError::Timeout { key, .. }
            | AssetLoadError::ChecksumMismatch { key, .. }
            | AssetLoadError::Decode { key, .. }
            | AssetLoadError::Abandoned { key, .. }
            | AssetLoadError::Rejected { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    Model(ModelData),
    Texture(TextureData),
    Sound(SoundData),
}

impl AssetPayload {
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetPayload::Model(_) => AssetKind::Model,
            AssetPayload::Texture(_) => AssetKind::Texture,
            AssetPayload::Sound(_) => AssetKind::Sound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    pub key: String,
    pub payload: AssetPayload,
}

pub type LoadFuture = LocalBoxFuture<'static, Result<AssetPayload, AssetLoadError>>;

/// Asset-load collaborator. Each call starts one independent load and hands
/// back a future that resolves once it succeeds or fails.
pub trait AssetLoader {
    fn load(&self, unit: &LoadUnit) -> LoadFuture;
}
