//! Runtime Permission Model
//!
//! Capability kinds, the sandbox's answer to a permission query, and the
//! query interface the introspector talks to.

pub mod flags;
pub mod grants;
pub mod introspect;

use std::fmt;
use std::str::FromStr;

pub use flags::{build_flag, build_flags, join_flags, FLAG_PREFIX};
pub use grants::GrantTable;
pub use introspect::{missing, missing_flags};

/// Permission state as reported by the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    Granted,
    #[default]
    Prompt,
    Denied,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Granted => "granted",
            PermissionState::Prompt => "prompt",
            PermissionState::Denied => "denied",
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == PermissionState::Granted
    }
}

/// Capability names
pub mod names {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const NET: &str = "net";
    pub const ENV: &str = "env";
    pub const RUN: &str = "run";
    pub const SYS: &str = "sys";
    pub const HRTIME: &str = "hrtime";
    pub const FFI: &str = "ffi";
}

/// The capabilities the sandbox knows how to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Net,
    Env,
    Run,
    Sys,
    Hrtime,
    Ffi,
}

/// What a scope value means for a given capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeShape {
    Path,
    Host,
    Variable,
    Command,
    Kind,
    /// The capability takes no parameter
    Nothing,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Read,
        Capability::Write,
        Capability::Net,
        Capability::Env,
        Capability::Run,
        Capability::Sys,
        Capability::Hrtime,
        Capability::Ffi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => names::READ,
            Capability::Write => names::WRITE,
            Capability::Net => names::NET,
            Capability::Env => names::ENV,
            Capability::Run => names::RUN,
            Capability::Sys => names::SYS,
            Capability::Hrtime => names::HRTIME,
            Capability::Ffi => names::FFI,
        }
    }

    pub fn shape(&self) -> ScopeShape {
        match self {
            Capability::Env => ScopeShape::Variable,
            Capability::Run => ScopeShape::Command,
            Capability::Net => ScopeShape::Host,
            Capability::Sys => ScopeShape::Kind,
            Capability::Hrtime => ScopeShape::Nothing,
            Capability::Read | Capability::Write | Capability::Ffi => ScopeShape::Path,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a name outside [`Capability::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCapability(pub String);

impl fmt::Display for UnknownCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown capability: {}", self.0)
    }
}

impl std::error::Error for UnknownCapability {}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// A single permission query, shaped by capability kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDescriptor {
    Unscoped(Capability),
    Path(Capability, String),
    Host(String),
    Variable(String),
    Command(String),
    Kind(String),
    Hrtime,
}

impl PermissionDescriptor {
    /// Descriptor for one resolved scope value of `capability`
    pub fn scoped(capability: Capability, value: &str) -> Self {
        match capability.shape() {
            ScopeShape::Path => PermissionDescriptor::Path(capability, value.to_string()),
            ScopeShape::Host => PermissionDescriptor::Host(value.to_string()),
            ScopeShape::Variable => PermissionDescriptor::Variable(value.to_string()),
            ScopeShape::Command => PermissionDescriptor::Command(value.to_string()),
            ScopeShape::Kind => PermissionDescriptor::Kind(value.to_string()),
            ScopeShape::Nothing => PermissionDescriptor::Hrtime,
        }
    }
}

impl fmt::Display for PermissionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionDescriptor::Unscoped(c) => write!(f, "{{ name: {} }}", c),
            PermissionDescriptor::Path(c, path) => write!(f, "{{ name: {}, path: {} }}", c, path),
            PermissionDescriptor::Host(host) => write!(f, "{{ name: net, host: {} }}", host),
            PermissionDescriptor::Variable(v) => write!(f, "{{ name: env, variable: {} }}", v),
            PermissionDescriptor::Command(c) => write!(f, "{{ name: run, command: {} }}", c),
            PermissionDescriptor::Kind(k) => write!(f, "{{ name: sys, kind: {} }}", k),
            PermissionDescriptor::Hrtime => f.write_str("{ name: hrtime }"),
        }
    }
}

/// Live permission state of the current process
///
/// One method per query shape. Implemented by whatever hosts the sandbox;
/// [`GrantTable`] is the stock implementation for the CLI.
pub trait PermissionQuery {
    fn query_unscoped(&self, capability: Capability) -> PermissionState;
    fn query_path(&self, capability: Capability, path: &str) -> PermissionState;
    fn query_host(&self, host: &str) -> PermissionState;
    fn query_variable(&self, variable: &str) -> PermissionState;
    fn query_command(&self, command: &str) -> PermissionState;
    fn query_kind(&self, kind: &str) -> PermissionState;
    fn query_hrtime(&self) -> PermissionState;

    fn query(&self, descriptor: &PermissionDescriptor) -> PermissionState {
        match descriptor {
            PermissionDescriptor::Unscoped(c) => self.query_unscoped(*c),
            PermissionDescriptor::Path(c, path) => self.query_path(*c, path),
            PermissionDescriptor::Host(host) => self.query_host(host),
            PermissionDescriptor::Variable(v) => self.query_variable(v),
            PermissionDescriptor::Command(c) => self.query_command(c),
            PermissionDescriptor::Kind(k) => self.query_kind(k),
            PermissionDescriptor::Hrtime => self.query_hrtime(),
        }
    }
}
