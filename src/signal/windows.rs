//! Console control events mapped onto the Unix-style flags

use super::SignalFlags;
use crate::error::{ProctlError, Result};
use std::sync::atomic::Ordering;
use std::sync::OnceLock;
use windows::Win32::Foundation::BOOL;
use windows::Win32::System::Console::{
    SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
};

static SIGNAL_STATE: OnceLock<SignalFlags> = OnceLock::new();

/// Register the console handler and return the shared flags
pub fn setup_signal_handlers() -> Result<SignalFlags> {
    if let Some(flags) = SIGNAL_STATE.get() {
        return Ok(flags.clone());
    }

    let flags = SignalFlags::new();
    SIGNAL_STATE
        .set(flags.clone())
        .map_err(|_| ProctlError::SignalSetup("console handler already registered".into()))?;

    unsafe {
        SetConsoleCtrlHandler(Some(console_handler), BOOL(1)).map_err(|err| {
            ProctlError::WindowsError(format!(
                "Failed to register console control handler: {}",
                err
            ))
        })?;
    }

    Ok(flags)
}

unsafe extern "system" fn console_handler(ctrl_type: u32) -> BOOL {
    let Some(flags) = SIGNAL_STATE.get() else {
        return BOOL(0);
    };
    let flag = match ctrl_type {
        CTRL_C_EVENT => &flags.sigint_received,
        CTRL_BREAK_EVENT => &flags.sigterm_received,
        CTRL_CLOSE_EVENT => &flags.sighup_received,
        _ => return BOOL(0),
    };
    flag.store(true, Ordering::SeqCst);
    BOOL(1)
}
