//! permit
//!
//! Run a script with exactly the permissions its manifest declares.
//!
//! Every argument, `--` included, is passed through to the runtime untouched;
//! the first one ending in `.ts` names the manifest entry.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use permit_core::{GrantTable, PermitConfig, ProcessSpawner, Reconciler};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Arguments after the program name, in order and unchanged
fn passthrough_args<I>(argv: I) -> anyhow::Result<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    argv.into_iter()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow!("argument is not valid UTF-8: {:?}", raw))
        })
        .collect()
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = passthrough_args(env::args_os())?;

    let config = match PermitConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("permit: {}", e);
            return Ok(exit_code(e.exit_code()));
        }
    };
    tracing::debug!("mode: {}", config.mode.as_str());

    let grants = GrantTable::from_flags(&config.granted);
    let reconciler = Reconciler::new(&config, &grants, &ProcessSpawner);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match reconciler.run(&args, &mut out) {
        Ok(outcome) => {
            out.flush().context("failed to flush report")?;
            Ok(exit_code(outcome.exit_code()))
        }
        Err(e) => {
            eprintln!("permit: {}", e);
            Ok(exit_code(e.exit_code()))
        }
    }
}

/// Exit statuses outside 0..=255 are truncated the way the OS would
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}
