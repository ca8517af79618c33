use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hashing::is_sha256_hex;
use super::unit::{AssetKind, LoadUnit};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read asset manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse asset manifest at {location}: {message}")]
    Parse { location: String, message: String },
    #[error("asset unit #{index} has an empty key")]
    EmptyKey { index: usize },
    #[error("{kind} asset {key} has an empty path")]
    EmptyPath { kind: AssetKind, key: String },
    #[error("duplicate {kind} asset key: {key}")]
    DuplicateKey { kind: AssetKind, key: String },
    #[error("{kind} asset {key} has a malformed sha256 checksum")]
    InvalidChecksum { kind: AssetKind, key: String },
}

/// Ordered list of load units declared before loading begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timeout_ms: Option<u64>,
    #[serde(default)]
    pub units: Vec<LoadUnit>,
}

impl AssetManifest {
    pub fn new(units: Vec<LoadUnit>) -> Self {
        Self {
            default_timeout_ms: None,
            units,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::<(AssetKind, &str)>::new();
        for (index, unit) in self.units.iter().enumerate() {
            let key = unit.key();
            if key.trim().is_empty() {
                return Err(ManifestError::EmptyKey { index });
            }
            if unit.path().as_os_str().is_empty() {
                return Err(ManifestError::EmptyPath {
                    kind: unit.kind(),
                    key: key.to_string(),
                });
            }
            if let Some(checksum) = unit.sha256() {
                if !is_sha256_hex(checksum) {
                    return Err(ManifestError::InvalidChecksum {
                        kind: unit.kind(),
                        key: key.to_string(),
                    });
                }
            }
            if !seen.insert((unit.kind(), key)) {
                return Err(ManifestError::DuplicateKey {
                    kind: unit.kind(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Units in declaration order with the manifest timeout, then `fallback`,
    /// filled in where a unit has none of its own. A zero manifest default
    /// disables timeouts for those units.
    pub fn resolved_units(&self, fallback: Option<Duration>) -> Vec<LoadUnit> {
        let default_timeout = match self.default_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => fallback,
        };
        self.units
            .iter()
            .cloned()
            .map(|unit| unit.or_timeout(default_timeout))
            .collect()
    }
}

pub fn read_manifest(path: &Path) -> Result<AssetManifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&raw)
}

pub fn parse_manifest(raw: &str) -> Result<AssetManifest, ManifestError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, AssetManifest>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        ManifestError::Parse {
            location,
            message: error.into_inner().to_string(),
        }
    })
}
