//! Process-group launcher
//!
//! Children are started so that they and everything they spawn can later be
//! signalled as one unit. On Unix the child becomes a session leader via
//! `setsid()`; on Windows it is created with `CREATE_NEW_PROCESS_GROUP`.

use crate::error::{ProctlError, Result};
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};
use tracing::{debug, error};

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

/// Interval between exit checks while waiting with a timeout
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A child process that leads its own process group
#[derive(Debug)]
pub struct GroupChild {
    child: Child,
    program: String,
}

impl GroupChild {
    /// Process id of the child (also its process group id)
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Program name the child was started from
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Access the underlying handle, e.g. to take piped stdio
    pub fn inner_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Check for exit without blocking
    ///
    /// Returns Some(exit_code) if the process has exited, None if still running
    pub fn try_wait(&mut self) -> Result<Option<i32>> {
        let pid = self.id();
        self.child
            .try_wait()
            .map(|status| status.map(exit_code))
            .map_err(|source| ProctlError::Wait { pid, source })
    }

    /// Wait for the child to exit (blocking)
    pub fn wait(&mut self) -> Result<i32> {
        let pid = self.id();
        self.child
            .wait()
            .map(exit_code)
            .map_err(|source| ProctlError::Wait { pid, source })
    }

    /// Wait up to `timeout` for the child to exit
    ///
    /// Returns None when the timeout elapsed with the child still running.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<i32>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(code) = self.try_wait()? {
                return Ok(Some(code));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Start `command` in a new process group
///
/// Spawn failures (missing executable, permissions, ...) are returned to the
/// caller unchanged inside [`ProctlError::Spawn`].
pub fn spawn_in_new_group(command: &mut Command) -> Result<GroupChild> {
    spawn_in_new_group_with_flags(command, 0)
}

/// Like [`spawn_in_new_group`], OR-ing `extra_flags` into the Windows
/// process creation flags
///
/// `Command::creation_flags` replaces rather than merges, so callers that
/// need their own flags pass them here. Ignored on Unix.
pub fn spawn_in_new_group_with_flags(
    command: &mut Command,
    extra_flags: u32,
) -> Result<GroupChild> {
    let program = command.get_program().to_string_lossy().into_owned();

    #[cfg(unix)]
    {
        let _ = extra_flags;
        unix::configure_new_session(command);
    }
    #[cfg(windows)]
    windows::configure_new_group(command, extra_flags);

    match command.spawn() {
        Ok(child) => {
            debug!(pid = child.id(), program = %program, "spawned in new process group");
            Ok(GroupChild { child, program })
        }
        Err(source) => {
            error!(program = %program, "failed to spawn: {}", source);
            Err(ProctlError::Spawn { program, source })
        }
    }
}

/// Map an exit status to a shell-style exit code
///
/// Children terminated by a signal report `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    status.code().unwrap_or(255)
}
