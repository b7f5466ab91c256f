//! Capability Introspection
//!
//! Compares a required capability set against the live grant state and
//! yields the minimal flags that would close the gap.

use tracing::{debug, warn};

use super::{build_flag, PermissionDescriptor, PermissionQuery};
use crate::common::resolve_token;
use crate::config::PermitConfig;
use crate::manifest::{CapabilityEntry, CapabilitySet};

/// Missing flags for one capability
///
/// Unscoped entries cost one query and yield at most the bare flag. Scoped
/// entries cost one query per value, and each ungranted value yields a flag
/// carrying only that value. Names outside the known set are never queried
/// and always reported missing.
pub fn missing(
    entry: &CapabilityEntry,
    query: &dyn PermissionQuery,
    config: &PermitConfig,
) -> Vec<String> {
    let Some(capability) = entry.capability() else {
        warn!(
            "Cannot query unknown capability '{}', reporting it as missing",
            entry.name
        );
        if entry.is_unscoped() {
            return vec![build_flag::<&str>(&entry.name, &[], config)];
        }
        return entry
            .scopes
            .iter()
            .map(|scope| build_flag(&entry.name, &[resolve_token(scope, config)], config))
            .collect();
    };

    if entry.is_unscoped() {
        let descriptor = PermissionDescriptor::Unscoped(capability);
        let state = query.query(&descriptor);
        debug!("{} -> {}", descriptor, state.as_str());
        if state.is_granted() {
            return Vec::new();
        }
        return vec![build_flag::<&str>(&entry.name, &[], config)];
    }

    let mut flags = Vec::new();
    for scope in &entry.scopes {
        let value = resolve_token(scope, config);
        let descriptor = PermissionDescriptor::scoped(capability, &value);
        let state = query.query(&descriptor);
        debug!("{} -> {}", descriptor, state.as_str());
        if !state.is_granted() {
            flags.push(build_flag(&entry.name, &[value], config));
        }
    }
    flags
}

/// Missing flags for a whole set, in manifest order
pub fn missing_flags(
    capabilities: &CapabilitySet,
    query: &dyn PermissionQuery,
    config: &PermitConfig,
) -> Vec<String> {
    capabilities
        .iter()
        .flat_map(|entry| missing(entry, query, config))
        .collect()
}
