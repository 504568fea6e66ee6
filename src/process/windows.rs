//! Windows process groups via `CREATE_NEW_PROCESS_GROUP` and console events

use super::GroupChild;
use crate::error::{ProctlError, Result};
use crate::stop::ProcessTree;
use std::os::windows::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Duration;
use windows::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT};
use windows::Win32::System::Threading::CREATE_NEW_PROCESS_GROUP;

/// Request a new console process group, keeping any caller flags
pub(super) fn configure_new_group(command: &mut Command, extra_flags: u32) {
    command.creation_flags(extra_flags | CREATE_NEW_PROCESS_GROUP.0);
}

impl GroupChild {
    /// Deliver CTRL_BREAK to the console process group led by the child
    pub fn send_ctrl_break(&self) -> Result<()> {
        unsafe {
            GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, self.id()).map_err(|err| {
                ProctlError::WindowsError(format!(
                    "Failed to send CTRL_BREAK to group {}: {}",
                    self.id(),
                    err
                ))
            })
        }
    }

    /// Force-terminate the child and its descendants with `taskkill /T /F`
    pub fn kill_tree(&self) -> Result<()> {
        let status = Command::new("taskkill")
            .args(["/T", "/F", "/PID", &self.id().to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(ProctlError::WindowsError(format!(
                "taskkill exited with {} for PID {}",
                status,
                self.id()
            )))
        }
    }
}

impl ProcessTree for GroupChild {
    fn pid(&self) -> u32 {
        self.id()
    }

    fn signal_graceful(&mut self) -> Result<()> {
        self.send_ctrl_break()
    }

    fn terminate(&mut self) -> Result<()> {
        self.child.kill()?;
        Ok(())
    }

    fn signal_kill(&mut self) -> Result<()> {
        self.kill_tree()
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
