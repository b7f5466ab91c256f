//! Runtime permission reconciliation
//!
//! Reads the permissions an entry script declares in its manifest, then
//! either reports which of them the current process lacks or re-launches the
//! runtime carrying exactly those permissions.

pub mod common;
pub mod config;
pub mod manifest;
pub mod permissions;
pub mod reconcile;

pub use common::{ErrorCode, PermitError, PermitResult};
pub use config::{Mode, PermitConfig};
pub use manifest::{CapabilityEntry, CapabilitySet};
pub use permissions::{
    Capability, GrantTable, PermissionDescriptor, PermissionQuery, PermissionState,
};
pub use reconcile::{Outcome, ProcessSpawner, Reconciler, Reconciliation, Spawner};
