//! POSIX signal registration through `signal-hook`

use super::SignalFlags;
use crate::error::{ProctlError, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn register(signal: i32, name: &str, flag: &Arc<AtomicBool>) -> Result<()> {
    signal_hook::flag::register(signal, Arc::clone(flag))
        .map(drop)
        .map_err(|e| ProctlError::SignalSetup(format!("{}: {}", name, e)))
}

/// Register SIGTERM, SIGINT and SIGHUP handlers that set the returned flags
pub fn setup_signal_handlers() -> Result<SignalFlags> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

    let flags = SignalFlags::new();
    register(SIGTERM, "SIGTERM", &flags.sigterm_received)?;
    register(SIGINT, "SIGINT", &flags.sigint_received)?;
    register(SIGHUP, "SIGHUP", &flags.sighup_received)?;
    Ok(flags)
}
