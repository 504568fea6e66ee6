//! Best-effort eviction of whatever process is listening on a port
//!
//! Discovery relies on external tools: `lsof` on macOS, `fuser` on other Unix
//! systems, `netstat` + `taskkill` on Windows. When a tool is missing or fails
//! the eviction silently becomes a no-op.

use crate::platform::Platform;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::{debug, info};

/// Pause after each kill so the OS can release the socket before the caller
/// tries to bind again
pub const PORT_RELEASE_DELAY: Duration = Duration::from_secs(1);

/// Kill whatever process is listening on TCP `port`
///
/// Never fails; a port without a listener is left untouched.
pub fn kill_port_holder(port: u16) {
    debug!(port, platform = %Platform::HOST, "looking for port holder");
    match Platform::HOST {
        Platform::MacOs => kill_with_lsof(port),
        Platform::Unix => kill_with_fuser(port),
        Platform::Windows => kill_with_netstat(port),
    }
}

fn run_quiet(program: &str, args: &[&str]) -> Option<Output> {
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => Some(output),
        Err(e) => {
            debug!("{} unavailable: {}", program, e);
            None
        }
    }
}

fn kill_with_lsof(port: u16) {
    let spec = format!("tcp:{}", port);
    let Some(output) = run_quiet("lsof", &["-t", "-i", &spec, "-sTCP:LISTEN"]) else {
        return;
    };
    // lsof exits 1 when nothing matches
    if !output.status.success() || output.stdout.is_empty() {
        debug!(port, "no listener found by lsof");
        return;
    }

    for pid in parse_lsof_pids(&String::from_utf8_lossy(&output.stdout)) {
        if force_kill_pid(pid) {
            info!(port, pid, "killed port holder");
        }
        std::thread::sleep(PORT_RELEASE_DELAY);
    }
}

fn kill_with_fuser(port: u16) {
    let spec = format!("{}/tcp", port);
    if let Some(output) = run_quiet("fuser", &["-k", &spec]) {
        if output.status.success() {
            info!(port, "fuser killed port holder");
        } else {
            debug!(port, "fuser found no holder");
        }
    }
}

fn kill_with_netstat(port: u16) {
    let Some(output) = run_quiet("netstat", &["-ano"]) else {
        return;
    };

    for pid in parse_netstat_listeners(&String::from_utf8_lossy(&output.stdout), port) {
        if force_kill_pid(pid) {
            info!(port, pid, "killed port holder");
        }
        std::thread::sleep(PORT_RELEASE_DELAY);
    }
}

#[cfg(unix)]
fn force_kill_pid(pid: u32) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => true,
        Err(e) => {
            debug!(pid, "SIGKILL failed: {}", e);
            false
        }
    }
}

#[cfg(windows)]
fn force_kill_pid(pid: u32) -> bool {
    let pid_arg = pid.to_string();
    match run_quiet("taskkill", &["/F", "/PID", &pid_arg]) {
        Some(out) if out.status.success() => true,
        Some(out) => {
            debug!(pid, "taskkill failed with {}", out.status);
            false
        }
        None => false,
    }
}

/// Parse the terse (`-t`) output of lsof: one pid per whitespace-separated token
pub fn parse_lsof_pids(output: &str) -> Vec<u32> {
    let mut pids = Vec::new();
    for pid in output
        .split_whitespace()
        .filter_map(|token| token.parse::<u32>().ok())
        .filter(|pid| *pid != 0)
    {
        if !pids.contains(&pid) {
            pids.push(pid);
        }
    }
    pids
}

/// Extract pids of `LISTENING` rows bound to `port` from `netstat -ano` output
///
/// The local address column must end with `:<port>` exactly, so `:80` does
/// not match `:8080`. Rows for IPv4 and IPv6 sockets of the same process are
/// reported once.
pub fn parse_netstat_listeners(output: &str, port: u16) -> Vec<u32> {
    let suffix = format!(":{}", port);
    let mut pids = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // Proto  Local Address  Foreign Address  State  PID
        if fields.len() < 5 || !fields[0].eq_ignore_ascii_case("TCP") {
            continue;
        }
        if fields[3] != "LISTENING" || !fields[1].ends_with(&suffix) {
            continue;
        }
        let Some(pid) = fields.last().and_then(|f| f.parse::<u32>().ok()) else {
            continue;
        };
        if pid != 0 && !pids.contains(&pid) {
            pids.push(pid);
        }
    }
    pids
}
