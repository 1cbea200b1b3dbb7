use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use nix::sys::signal::Signal;
use std::env;
use std::ffi::OsString;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use which::which_in;

use crate::env::EnvPair;

/// Run `command` with exactly `env` as its environment and wait for it.
///
/// stdio is inherited. Returns the exit code the parent should mirror.
pub fn run(command: &[String], env: &[EnvPair]) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| anyhow!("Missing command to run"))?;

    let binary_path = resolve(program, env)?;
    info!("Executing: {} with args: {:?}", binary_path.display(), args);
    debug!(
        "Environment keys: {:?}",
        env.iter().map(|p| p.key.as_os_str()).collect::<Vec<_>>()
    );

    let status = Command::new(&binary_path)
        .args(args)
        .env_clear()
        .envs(env.iter().map(|p| (&p.key, &p.value)))
        .status()
        .with_context(|| format!("Failed to execute command: {}", program))?;

    Ok(exit_code(status))
}

/// Find the binary using the child's PATH, or ours if the child has none.
///
/// A `PATH` injected from the parameter store therefore decides which binary runs.
fn resolve(program: &str, env: &[EnvPair]) -> Result<PathBuf> {
    let search_path: Option<OsString> = env
        .iter()
        .find(|p| p.key == "PATH")
        .map(|p| p.value.clone())
        .or_else(|| env::var_os("PATH"));
    let cwd = env::current_dir().context("Failed to read current directory")?;

    which_in(program, search_path, cwd).with_context(|| format!("Failed to find binary: {}", program))
}

/// Signalled children map to 128 + signal, like a shell reports them.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        debug!("Command exited with status {}", code);
        return code;
    }

    match status.signal() {
        Some(signo) => {
            match Signal::try_from(signo) {
                Ok(signal) => warn!("Command terminated by {}", signal.as_str()),
                Err(_) => warn!("Command terminated by signal {}", signo),
            }
            128 + signo
        }
        None => 1,
    }
}
