//! Grant Table
//!
//! Answers permission queries from the `--allow-*` flags a process was
//! started with.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{Capability, PermissionQuery, PermissionState, FLAG_PREFIX};

const ALLOW_ALL: &str = "--allow-all";
const ALLOW_ALL_SHORT: &str = "-A";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Grant {
    Unscoped,
    Scoped(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    all: bool,
    grants: HashMap<String, Grant>,
}

impl GrantTable {
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for flag in flags {
            table.add_flag(flag.as_ref());
        }
        table
    }

    /// Record one granted flag; anything that is not an allow flag is ignored
    pub fn add_flag(&mut self, flag: &str) {
        if flag == ALLOW_ALL || flag == ALLOW_ALL_SHORT {
            self.all = true;
            return;
        }

        let Some(rest) = flag.strip_prefix(FLAG_PREFIX) else {
            debug!("Ignoring non-permission flag: {}", flag);
            return;
        };

        let (name, values) = match rest.split_once('=') {
            Some((name, values)) if !values.is_empty() => (name, Some(values)),
            Some((name, _)) => (name, None),
            None => (rest, None),
        };

        if name.is_empty() {
            return;
        }

        match values {
            None => {
                self.grants.insert(name.to_string(), Grant::Unscoped);
            }
            Some(values) => {
                let grant = self
                    .grants
                    .entry(name.to_string())
                    .or_insert_with(|| Grant::Scoped(Vec::new()));
                if let Grant::Scoped(existing) = grant {
                    existing.extend(values.split(',').filter(|v| !v.is_empty()).map(str::to_string));
                }
            }
        }
    }

    fn grant(&self, name: &str) -> Option<&Grant> {
        self.grants.get(name)
    }

    fn check<F>(&self, name: &str, matches: F) -> PermissionState
    where
        F: Fn(&str) -> bool,
    {
        if self.all {
            return PermissionState::Granted;
        }
        let granted = match self.grant(name) {
            Some(Grant::Unscoped) => true,
            Some(Grant::Scoped(values)) => values.iter().any(|v| matches(v.as_str())),
            None => false,
        };
        state(granted)
    }
}

fn state(granted: bool) -> PermissionState {
    if granted {
        PermissionState::Granted
    } else {
        PermissionState::Prompt
    }
}

/// Split `host[:port]`, leaving bare IPv6 addresses whole
fn split_host(host: &str) -> (&str, Option<&str>) {
    if let Some(rest) = host.strip_prefix('[') {
        if let Some((addr, tail)) = rest.split_once(']') {
            return (addr, tail.strip_prefix(':'));
        }
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
            (name, Some(port))
        }
        _ => (host, None),
    }
}

fn host_matches(granted: &str, queried: &str) -> bool {
    let (granted_name, granted_port) = split_host(granted);
    let (queried_name, queried_port) = split_host(queried);
    granted_name == queried_name && (granted_port.is_none() || granted_port == queried_port)
}

/// Resolves `.` and `..` without touching the filesystem; `..` never climbs
/// above the root
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl PermissionQuery for GrantTable {
    fn query_unscoped(&self, capability: Capability) -> PermissionState {
        let granted = self.all || self.grant(capability.as_str()) == Some(&Grant::Unscoped);
        state(granted)
    }

    fn query_path(&self, capability: Capability, path: &str) -> PermissionState {
        let queried = normalize(Path::new(path));
        self.check(capability.as_str(), |granted| {
            queried.starts_with(normalize(Path::new(granted)))
        })
    }

    fn query_host(&self, host: &str) -> PermissionState {
        self.check(Capability::Net.as_str(), |granted| host_matches(granted, host))
    }

    fn query_variable(&self, variable: &str) -> PermissionState {
        self.check(Capability::Env.as_str(), |granted| granted == variable)
    }

    fn query_command(&self, command: &str) -> PermissionState {
        self.check(Capability::Run.as_str(), |granted| granted == command)
    }

    fn query_kind(&self, kind: &str) -> PermissionState {
        self.check(Capability::Sys.as_str(), |granted| granted == kind)
    }

    fn query_hrtime(&self) -> PermissionState {
        self.query_unscoped(Capability::Hrtime)
    }
}
