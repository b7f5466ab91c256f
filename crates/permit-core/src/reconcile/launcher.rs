//! Process Launcher
//!
//! Re-launches the runtime with the resolved flags and waits for it.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Sub-command the runtime is started with
pub const RUN_SUBCOMMAND: &str = "run";

/// Starts a program and blocks until it exits
pub trait Spawner {
    /// Returns the exit status the caller should propagate
    fn spawn_and_wait(&self, program: &Path, args: &[String]) -> io::Result<i32>;
}

/// Spawns a real child process that inherits stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn_and_wait(&self, program: &Path, args: &[String]) -> io::Result<i32> {
        info!("Launching {} with {} arguments", program.display(), args.len());
        let status = Command::new(program).args(args).status()?;
        debug!("Child exited: {}", status);
        Ok(exit_code_of(status))
    }
}

/// `run`, the full flags, then every pass-through argument
pub fn launch_args(full_flags: &[String], passthrough: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(1 + full_flags.len() + passthrough.len());
    args.push(RUN_SUBCOMMAND.to_string());
    args.extend(full_flags.iter().cloned());
    args.extend(passthrough.iter().cloned());
    args
}

/// Map a child's status to the code this process exits with
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
