//! Graceful stop with forced-kill escalation
//!
//! The state machine is the same on every platform:
//!
//! ```text
//! Running --graceful signal--> AwaitingExit --exit--> Exited (Graceful)
//!                                   |
//!                                timeout --forced kill--> wait --> Exited (Forced)
//! ```
//!
//! Only the [`ProcessTree`] implementation differs between Unix and Windows.

use crate::error::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default time granted to a process tree between the graceful signal and
/// the forced kill
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(15);

/// Signalling and waiting primitives for a process and its group
pub trait ProcessTree {
    /// Process id used in log output
    fn pid(&self) -> u32;

    /// Ask the whole group to shut down (Unix: SIGINT to the group,
    /// Windows: CTRL_BREAK to the console process group)
    fn signal_graceful(&mut self) -> Result<()>;

    /// Direct terminate request on the process alone
    fn terminate(&mut self) -> Result<()>;

    /// Unconditionally kill the whole group
    fn signal_kill(&mut self) -> Result<()>;

    /// Unconditionally kill the process alone
    fn kill(&mut self) -> Result<()>;

    /// Wait up to `timeout`; None means the process is still running
    fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<i32>>;

    /// Block until the process exits
    fn wait(&mut self) -> Result<i32>;
}

/// How a process tree ended up stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process exited within the timeout after the graceful signal
    Graceful,
    /// The timeout elapsed and the tree was force-killed
    Forced,
}

/// Timing for [`stop_process_tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopConfig {
    pub timeout: Duration,
}

impl StopConfig {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn stop<T: ProcessTree + ?Sized>(&self, tree: &mut T) -> StopOutcome {
        stop_process_tree(tree, self.timeout)
    }
}

impl Default for StopConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_TIMEOUT)
    }
}

/// Gracefully stop `tree` and its group, force-killing after `timeout`
///
/// The graceful signal is sent even when the group leader has already exited,
/// so descendants left in the group still get it.
///
/// Never fails: every error on the way is logged and the next step is taken.
/// When this returns the process has been reaped, except in the unlikely case
/// where waiting itself kept failing.
pub fn stop_process_tree<T: ProcessTree + ?Sized>(tree: &mut T, timeout: Duration) -> StopOutcome {
    let pid = tree.pid();

    if let Err(e) = tree.signal_graceful() {
        debug!(pid, "graceful group signal failed ({}), terminating process directly", e);
        if let Err(e) = tree.terminate() {
            debug!(pid, "direct terminate failed: {}", e);
        }
    }

    match tree.wait_timeout(timeout) {
        Ok(Some(code)) => {
            info!(pid, code, "process tree stopped gracefully");
            return StopOutcome::Graceful;
        }
        Ok(None) => {
            warn!(pid, "process tree still running after {:?}, force-killing", timeout);
        }
        Err(e) => {
            warn!(pid, "waiting for process failed ({}), force-killing", e);
        }
    }

    if let Err(e) = tree.signal_kill() {
        debug!(pid, "group kill failed ({}), killing process directly", e);
        if let Err(e) = tree.kill() {
            debug!(pid, "direct kill failed: {}", e);
        }
    }

    match tree.wait() {
        Ok(code) => info!(pid, code, "process tree force-killed"),
        Err(e) => warn!(pid, "waiting after forced kill failed: {}", e),
    }
    StopOutcome::Forced
}
