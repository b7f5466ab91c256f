//! Configuration
//!
//! Everything the reconciler would otherwise read ad hoc from the process
//! environment, captured once at start-up.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::common::{default_cache_dir, default_exec_path, PermitError, PermitResult};

/// Overrides the runtime executable (and the `///<exec_path>` token)
pub const ENV_EXEC_PATH: &str = "PERMIT_EXEC_PATH";
/// Overrides the cache root (and the `///<cache_path>` token prefix)
pub const ENV_CACHE_DIR: &str = "PERMIT_CACHE_DIR";
/// A single manifest path that replaces the default candidate list
pub const ENV_MANIFEST: &str = "PERMIT_MANIFEST";
/// `launch` or `report`
pub const ENV_MODE: &str = "PERMIT_MODE";
/// Whitespace-separated `--allow-*` flags held by the current process
pub const ENV_GRANTED: &str = "PERMIT_GRANTED";

/// Manifest candidates, highest priority first
pub const DEFAULT_MANIFEST_CANDIDATES: &[&str] = &[
    "deno.jsonc",
    "deno.json",
    "permissions.jsonc",
    "permissions.json",
];

/// Suffix that marks the entry script among the pass-through arguments
pub const SCRIPT_SUFFIX: &str = ".ts";

/// Which branch of the reconciler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Re-launch the runtime carrying the full flag set
    #[default]
    Launch,
    /// Already inside a permissioned process: report what is missing
    Report,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Launch => "launch",
            Mode::Report => "report",
        }
    }
}

impl FromStr for Mode {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launch" => Ok(Mode::Launch),
            "report" => Ok(Mode::Report),
            other => Err(PermitError::config(format!(
                "{} must be 'launch' or 'report', got '{}'",
                ENV_MODE, other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitConfig {
    pub home: PathBuf,
    pub exec_path: PathBuf,
    pub cache_dir: PathBuf,
    pub manifest_candidates: Vec<PathBuf>,
    pub mode: Mode,
    pub granted: Vec<String>,
    pub script_suffix: String,
}

impl PermitConfig {
    /// Defaults for a given home directory, ignoring the environment
    pub fn for_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            exec_path: default_exec_path(home),
            cache_dir: default_cache_dir(home),
            manifest_candidates: DEFAULT_MANIFEST_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .collect(),
            mode: Mode::default(),
            granted: Vec::new(),
            script_suffix: SCRIPT_SUFFIX.to_string(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> PermitResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| PermitError::config("Could not determine home directory"))?;
        Self::from_lookup(&home, |key| env::var(key).ok())
    }

    /// Build from `home` plus an arbitrary variable lookup
    pub fn from_lookup<F>(home: &Path, lookup: F) -> PermitResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::for_home(home);
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(exec_path) = lookup(ENV_EXEC_PATH) {
            config.exec_path = PathBuf::from(exec_path);
        }
        if let Some(cache_dir) = lookup(ENV_CACHE_DIR) {
            config.cache_dir = PathBuf::from(cache_dir);
        }
        if let Some(manifest) = lookup(ENV_MANIFEST) {
            config.manifest_candidates = vec![PathBuf::from(manifest)];
        }
        if let Some(mode) = lookup(ENV_MODE) {
            config.mode = mode.trim().parse()?;
        }
        if let Some(granted) = lookup(ENV_GRANTED) {
            config.granted = granted.split_whitespace().map(str::to_string).collect();
        }

        Ok(config)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_manifest_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.manifest_candidates = candidates;
        self
    }

    pub fn with_granted<I, S>(mut self, granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.granted = granted.into_iter().map(Into::into).collect();
        self
    }
}
