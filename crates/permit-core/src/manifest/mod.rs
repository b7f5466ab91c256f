//! Manifest System
//!
//! Locates the permissions manifest and extracts an entry's capability set.

pub mod jsonc;
pub mod loader;
pub mod types;

pub use loader::{load_manifest_file, resolve, MAX_MANIFEST_BYTES};
pub use types::{CapabilityEntry, CapabilitySet, ManifestDocument};
