//! Capability Flags
//!
//! Renders capability sets as `--allow-*` command-line flags.

use crate::common::resolve_token;
use crate::config::PermitConfig;
use crate::manifest::CapabilitySet;

pub const FLAG_PREFIX: &str = "--allow-";

/// Build one flag; scopes are token-resolved and kept in order
///
/// An empty scope list yields the bare, unscoped flag.
pub fn build_flag<S: AsRef<str>>(name: &str, scopes: &[S], config: &PermitConfig) -> String {
    if scopes.is_empty() {
        return format!("{}{}", FLAG_PREFIX, name);
    }

    let values: Vec<String> = scopes
        .iter()
        .map(|scope| resolve_token(scope.as_ref(), config))
        .collect();

    format!("{}{}={}", FLAG_PREFIX, name, values.join(","))
}

/// The full flag set, one flag per capability in manifest order
pub fn build_flags(capabilities: &CapabilitySet, config: &PermitConfig) -> Vec<String> {
    capabilities
        .iter()
        .map(|entry| build_flag(&entry.name, &entry.scopes, config))
        .collect()
}

/// Space-joined form reported as the full permissions string
pub fn join_flags<S: AsRef<str>>(flags: &[S]) -> String {
    flags.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}
