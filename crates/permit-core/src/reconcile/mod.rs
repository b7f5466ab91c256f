//! Reconciler
//!
//! Resolves an entry script's capabilities, then either reports which of them
//! the current process is missing or re-launches the runtime carrying all of
//! them.

pub mod launcher;

use std::io::Write;
use tracing::{debug, error};

use crate::common::{PermitError, PermitResult};
use crate::config::{Mode, PermitConfig};
use crate::manifest::{self, CapabilitySet};
use crate::permissions::{build_flags, join_flags, missing_flags, PermissionQuery};

pub use launcher::{exit_code_of, launch_args, ProcessSpawner, Spawner, RUN_SUBCOMMAND};

/// Required flags versus what is missing from the live grant state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub full: Vec<String>,
    pub missing: Vec<String>,
}

impl Reconciliation {
    pub fn full_string(&self) -> String {
        join_flags(&self.full)
    }

    pub fn is_fully_granted(&self) -> bool {
        self.missing.is_empty()
    }

    /// Human-readable report, as printed in report mode
    pub fn write_report<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "\nfull permissions string\n")?;
        writeln!(out, "{}", self.full_string())?;

        if self.is_fully_granted() {
            writeln!(out, "\nAll permissions granted\n")?;
        } else {
            writeln!(out, "\nMissing permissions:\n")?;
            writeln!(out, "{}", self.missing.join("\n"))?;
        }
        Ok(())
    }
}

/// How a reconciliation pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reported(Reconciliation),
    /// The launched child's status
    Exited(i32),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Reported(_) => 0,
            Outcome::Exited(code) => *code,
        }
    }
}

/// First argument naming the entry script, used verbatim as the manifest key
pub fn entry_identity<'a>(args: &'a [String], suffix: &str) -> Option<&'a str> {
    args.iter()
        .map(String::as_str)
        .find(|arg| arg.ends_with(suffix))
}

pub struct Reconciler<'a> {
    config: &'a PermitConfig,
    query: &'a dyn PermissionQuery,
    spawner: &'a dyn Spawner,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a PermitConfig,
        query: &'a dyn PermissionQuery,
        spawner: &'a dyn Spawner,
    ) -> Self {
        Self {
            config,
            query,
            spawner,
        }
    }

    /// Capability set for the entry script named in `args`
    pub fn resolve_capabilities(&self, args: &[String]) -> PermitResult<CapabilitySet> {
        let Some(entry) = entry_identity(args, &self.config.script_suffix) else {
            error!(
                "No entry script ending in '{}' among the arguments",
                self.config.script_suffix
            );
            return Err(PermitError::ManifestNotFound);
        };

        manifest::resolve(entry, &self.config.manifest_candidates)
            .ok_or(PermitError::ManifestNotFound)
    }

    /// Full and missing flag sets for `capabilities`
    pub fn reconcile(&self, capabilities: &CapabilitySet) -> Reconciliation {
        Reconciliation {
            full: build_flags(capabilities, self.config),
            missing: missing_flags(capabilities, self.query, self.config),
        }
    }

    /// Spawn the runtime with `full_flags` plus `args` and wait for it
    pub fn launch(&self, full_flags: &[String], args: &[String]) -> PermitResult<i32> {
        let argv = launch_args(full_flags, args);
        debug!("{} {:?}", self.config.exec_path.display(), argv);

        self.spawner
            .spawn_and_wait(&self.config.exec_path, &argv)
            .map_err(|source| PermitError::Spawn {
                program: self.config.exec_path.clone(),
                source,
            })
    }

    /// One full pass in the configured mode
    pub fn run<W: Write + ?Sized>(&self, args: &[String], out: &mut W) -> PermitResult<Outcome> {
        let capabilities = self.resolve_capabilities(args)?;

        match self.config.mode {
            Mode::Report => {
                let reconciliation = self.reconcile(&capabilities);
                reconciliation.write_report(out)?;
                Ok(Outcome::Reported(reconciliation))
            }
            Mode::Launch => {
                let full = build_flags(&capabilities, self.config);
                let code = self.launch(&full, args)?;
                Ok(Outcome::Exited(code))
            }
        }
    }
}
