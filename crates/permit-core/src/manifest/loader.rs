//! Manifest Loader
//!
//! Finds the first existing manifest among the candidates and extracts the
//! capability set for one entry identity.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use super::jsonc;
use super::types::{CapabilitySet, ManifestDocument};
use crate::common::ManifestLoadError;

/// Largest manifest we are willing to read
pub const MAX_MANIFEST_BYTES: u64 = 1_000_000;

/// Resolve the capability set for `entry`
///
/// Candidates are tried in order. A candidate that is missing, unreadable
/// or unparseable is skipped. The first one that parses ends the scan,
/// whether or not it mentions `entry`.
pub fn resolve<P: AsRef<Path>>(entry: &str, candidates: &[P]) -> Option<CapabilitySet> {
    for candidate in candidates {
        let path = candidate.as_ref();

        let document = match load_manifest_file(path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("No manifest at {:?}", path);
                continue;
            }
            Err(e) => {
                warn!("Skipping manifest candidate: {}", e);
                continue;
            }
        };

        info!("Found permissions manifest: {}", path.display());

        return match document.capabilities_for(entry) {
            Ok(Some(capabilities)) => Some(capabilities),
            Ok(None) => {
                info!("No permissions for {} in {}", entry, path.display());
                None
            }
            Err(message) => {
                warn!(
                    "{}",
                    ManifestLoadError::Decode {
                        path: path.to_path_buf(),
                        message,
                    }
                );
                None
            }
        };
    }

    None
}

/// Read and parse one candidate; `Ok(None)` when it does not exist
pub fn load_manifest_file(path: &Path) -> Result<Option<ManifestDocument>, ManifestLoadError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ManifestLoadError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.is_file() {
        return Ok(None);
    }

    if metadata.len() > MAX_MANIFEST_BYTES {
        return Err(ManifestLoadError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: MAX_MANIFEST_BYTES,
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ManifestLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        jsonc::from_str(&content).map_err(|source| ManifestLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    // A parsed file that is not an object still counts as found
    let document = match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => ManifestDocument::default(),
    };
    Ok(Some(document))
}
