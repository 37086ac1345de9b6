//! Bounded execution of the interpreter under test.
//!
//! Each execution spawns `<binary> -f <case> <flags...>` in its own process
//! group and waits up to a fixed deadline. The child is held by a
//! [`ChildGuard`] that kills the whole group and reaps the leader on every
//! exit path, so no interpreter (or anything it forked) outlives the call.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::outcome::Execution;
use crate::core::variant::Variant;
use crate::error::ConfigError;

/// Runs one (case, variant) pair. Never fails: every problem is an [`Execution`].
pub trait Executor {
    fn execute(&mut self, case: &Path, variant: &Variant) -> Execution;
}

/// Executes the real interpreter binary as a subprocess.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    binary: PathBuf,
    timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Executor for ProcessExecutor {
    #[instrument(skip_all, fields(case = %case.display(), variant = %variant.name))]
    fn execute(&mut self, case: &Path, variant: &Variant) -> Execution {
        let cmd = interpreter_command(&self.binary, case, &variant.flags);
        match run_with_deadline(cmd, self.timeout) {
            Ok(execution) => execution,
            Err(err) => {
                let message = format!("{err:#}");
                error!(err = %message, "execution aborted");
                Execution::Aborted(message)
            }
        }
    }
}

/// Resolve the interpreter binary before any case runs.
///
/// Bare names go through `PATH`; anything with a directory component is
/// checked relative to the current directory.
pub fn resolve_binary(binary: &Path) -> Result<PathBuf, ConfigError> {
    if binary.components().count() > 1 {
        if binary.is_file() {
            return Ok(binary.to_path_buf());
        }
        return Err(ConfigError::BinaryNotFound(binary.to_path_buf()));
    }
    which::which(binary).map_err(|_| ConfigError::BinaryNotFound(binary.to_path_buf()))
}

/// `<binary> -f <case> <flags...>`, stdio inherited except stdin.
pub fn interpreter_command(binary: &Path, case: &Path, flags: &[String]) -> Command {
    let mut cmd = Command::new(binary);
    cmd.arg("-f").arg(case).args(flags);
    cmd
}

/// Spawn `cmd` and wait at most `timeout` for it.
///
/// A spawn failure is returned as [`Execution::Aborted`]; an `Err` means the
/// child was started but could not be waited on (it has still been killed).
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs_f64()))]
pub fn run_with_deadline(mut cmd: Command, timeout: Duration) -> Result<Execution> {
    cmd.stdin(Stdio::null());
    isolate(&mut cmd);

    debug!("spawning interpreter");
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(err = %err, "failed to spawn interpreter");
            return Ok(Execution::Aborted(format!("spawn interpreter: {err}")));
        }
    };
    let mut guard = ChildGuard::new(child);

    match guard.wait_timeout(timeout).context("wait for interpreter")? {
        Some(status) => {
            let code = exit_code(status);
            debug!(exit_code = code, "interpreter finished");
            Ok(Execution::Completed(code))
        }
        None => {
            warn!(
                timeout_secs = timeout.as_secs_f64(),
                "interpreter timed out, killing"
            );
            guard.kill().context("kill interpreter")?;
            Ok(Execution::DeadlineExceeded)
        }
    }
}

/// Exit code, or `128 + signal` for a child killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// A spawned interpreter and the process group it leads.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<Option<ExitStatus>> {
        let status = self.child.wait_timeout(timeout)?;
        self.reaped = status.is_some();
        Ok(status)
    }

    fn kill(&mut self) -> io::Result<()> {
        kill_process_group(self.child.id());
        // The leader is already dead if the group kill landed; this only
        // matters where process groups are unavailable.
        let _ = self.child.kill();
        self.child.wait()?;
        self.reaped = true;
        Ok(())
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Also sweeps up anything the interpreter left running in the
        // background after a normal exit.
        kill_process_group(self.child.id());
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Put the child in a fresh process group, and on Linux have the kernel kill
/// it if the runner itself dies first.
#[cfg(unix)]
#[allow(unsafe_code)]
fn isolate(cmd: &mut Command) {
    use std::os::unix::process::CommandExt as _;

    cmd.process_group(0);

    #[cfg(target_os = "linux")]
    {
        let Ok(runner) = libc::pid_t::try_from(std::process::id()) else {
            return;
        };
        let arm_death_signal = move || -> io::Result<()> {
            // SAFETY: prctl(PR_SET_PDEATHSIG) and getppid touch only the
            // calling process and are async-signal-safe.
            if unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) } != 0 {
                return Err(io::Error::last_os_error());
            }
            // The runner may have died between fork and prctl, in which case
            // the signal will never come.
            if unsafe { libc::getppid() } != runner {
                return Err(io::Error::from_raw_os_error(libc::ESRCH));
            }
            Ok(())
        };
        // SAFETY: the hook runs between fork and exec and only calls prctl
        // and getppid.
        unsafe {
            cmd.pre_exec(arm_death_signal);
        }
    }
}

#[cfg(not(unix))]
fn isolate(_cmd: &mut Command) {}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(leader: u32) {
    let Ok(pgid) = libc::pid_t::try_from(leader) else {
        return;
    };
    // SAFETY: killpg only sends a signal. A group with no members left fails
    // with ESRCH, which is the common case after a clean exit.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        debug!(pgid, err = %io::Error::last_os_error(), "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_leader: u32) {}
