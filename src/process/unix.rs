//! Unix process groups via `setsid()` and `killpg()`

use super::GroupChild;
use crate::error::Result;
use crate::stop::ProcessTree;
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::{setsid, Pid};
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::time::Duration;

/// Make the child a session leader before it execs
pub(super) fn configure_new_session(command: &mut Command) {
    // SAFETY: setsid() is async-signal-safe and touches no parent state
    unsafe {
        command.pre_exec(|| setsid().map(drop).map_err(std::io::Error::from));
    }
}

impl GroupChild {
    fn nix_pid(&self) -> Pid {
        Pid::from_raw(self.id() as i32)
    }

    /// Send `signal` to the process group led by the child
    ///
    /// The group id equals the child's pid because of `setsid()`, so this still
    /// reaches descendants after the leader itself has exited and been reaped.
    /// An empty group (ESRCH) is not an error.
    pub fn signal_group(&self, signal: Signal) -> Result<()> {
        let pgid = self.nix_pid();
        match killpg(pgid, signal) {
            Ok(()) => {
                tracing::debug!(pgid = pgid.as_raw(), "sent {:?} to process group", signal);
                Ok(())
            }
            Err(Errno::ESRCH) => {
                tracing::debug!(pgid = pgid.as_raw(), "process group already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl ProcessTree for GroupChild {
    fn pid(&self) -> u32 {
        self.id()
    }

    fn signal_graceful(&mut self) -> Result<()> {
        self.signal_group(Signal::SIGINT)
    }

    fn terminate(&mut self) -> Result<()> {
        kill(self.nix_pid(), Signal::SIGTERM)?;
        Ok(())
    }

    fn signal_kill(&mut self) -> Result<()> {
        self.signal_group(Signal::SIGKILL)
    }

    fn kill(&mut self) -> Result<()> {
        self.child.kill()?;
        Ok(())
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<i32>> {
        GroupChild::wait_timeout(self, timeout)
    }

    fn wait(&mut self) -> Result<i32> {
        GroupChild::wait(self)
    }
}
