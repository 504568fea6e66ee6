//! Termination requests received by the supervising `proctl run` process
//!
//! Handlers only flip atomic flags; the supervision loop polls them and turns
//! a request into a graceful stop of the child's process group.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flags set from signal (Unix) or console control (Windows) handlers
#[derive(Clone, Debug)]
pub struct SignalFlags {
    pub sigterm_received: Arc<AtomicBool>,
    pub sigint_received: Arc<AtomicBool>,
    pub sighup_received: Arc<AtomicBool>,
}

/// Which termination request arrived first, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermRequest {
    Terminate,
    Interrupt,
    Hangup,
}

impl SignalFlags {
    pub fn new() -> Self {
        Self {
            sigterm_received: Arc::new(AtomicBool::new(false)),
            sigint_received: Arc::new(AtomicBool::new(false)),
            sighup_received: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn check_sigterm(&self) -> bool {
        self.sigterm_received.load(Ordering::SeqCst)
    }

    pub fn check_sigint(&self) -> bool {
        self.sigint_received.load(Ordering::SeqCst)
    }

    pub fn check_sighup(&self) -> bool {
        self.sighup_received.load(Ordering::SeqCst)
    }

    /// Check if any termination request was received
    pub fn should_terminate(&self) -> bool {
        self.check_sigterm() || self.check_sigint() || self.check_sighup()
    }

    pub fn term_request(&self) -> Option<TermRequest> {
        if self.check_sigterm() {
            Some(TermRequest::Terminate)
        } else if self.check_sigint() {
            Some(TermRequest::Interrupt)
        } else if self.check_sighup() {
            Some(TermRequest::Hangup)
        } else {
            None
        }
    }
}

impl Default for SignalFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::setup_signal_handlers;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::setup_signal_handlers;
