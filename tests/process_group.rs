//! Integration tests for process-group launch and shutdown on Unix
//!
//! These run real `sh`/`sleep` children and check that:
//! - spawned commands lead their own process group
//! - a cooperative child stops on the graceful signal alone
//! - a child ignoring SIGINT is force-killed together with its descendants
//! - descendants still get the graceful signal after the leader has exited
//! - a real TCP listener is evicted by `kill_port_holder`

#![cfg(unix)]

use nix::sys::signal::kill;
use nix::unistd::{getpgid, getpgrp, Pid};
use proctl::{
    find_binary, kill_port_holder, spawn_in_new_group, stop_process_tree, GroupChild,
    ProctlError, StopOutcome,
};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Spawn `sh -c script` with stdout piped and wait for its first line
fn spawn_shell(script: &str) -> (GroupChild, String) {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", script]).stdout(Stdio::piped());
    let mut child = spawn_in_new_group(&mut cmd).expect("Failed to spawn sh");

    let stdout = child.inner_mut().stdout.take().expect("stdout is piped");
    let mut line = String::new();
    BufReader::new(stdout)
        .read_line(&mut line)
        .expect("Failed to read readiness line");
    (child, line.trim().to_string())
}

/// Whether `program` can be started at all
fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// True once `pid` no longer exists or is only a zombie awaiting reaping
fn is_gone(pid: i32) -> bool {
    if kill(Pid::from_raw(pid), None).is_err() {
        return true;
    }
    std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .and_then(|stat| {
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next().map(|s| s == "Z"))
        })
        .unwrap_or(false)
}

fn wait_until_gone(pid: i32, limit: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if is_gone(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    is_gone(pid)
}

#[test]
fn test_spawned_process_leads_new_group() {
    let mut cmd = Command::new("sleep");
    cmd.arg("30");
    let mut child = spawn_in_new_group(&mut cmd).expect("Failed to spawn sleep");

    let pid = Pid::from_raw(child.id() as i32);
    assert_eq!(getpgid(Some(pid)).unwrap(), pid);
    assert_ne!(pid, getpgrp());

    assert_eq!(
        stop_process_tree(&mut child, Duration::from_secs(5)),
        StopOutcome::Graceful
    );
}

#[test]
fn test_cooperative_child_stops_without_forced_kill() {
    let mut cmd = Command::new("sleep");
    cmd.arg("30");
    let mut child = spawn_in_new_group(&mut cmd).expect("Failed to spawn sleep");

    let started = Instant::now();
    let outcome = stop_process_tree(&mut child, Duration::from_secs(10));

    assert_eq!(outcome, StopOutcome::Graceful);
    assert!(started.elapsed() < Duration::from_secs(10));
    // sleep dies from the SIGINT itself, not from SIGKILL
    assert_eq!(child.try_wait().unwrap(), Some(128 + 2));
}

#[test]
fn test_child_ignoring_sigint_is_force_killed_within_timeout() {
    let (mut child, ready) = spawn_shell("trap '' INT; echo ready; exec sleep 30");
    assert_eq!(ready, "ready");

    let timeout = Duration::from_millis(500);
    let started = Instant::now();
    let outcome = stop_process_tree(&mut child, timeout);

    assert_eq!(outcome, StopOutcome::Forced);
    assert!(started.elapsed() >= timeout);
    assert!(started.elapsed() < timeout + Duration::from_secs(5));
    assert_eq!(child.try_wait().unwrap(), Some(128 + 9));
}

#[test]
fn test_forced_kill_reaches_grandchildren() {
    // Background jobs of a non-interactive shell ignore SIGINT, so the
    // grandchild survives the graceful phase and must go with the group kill.
    let (mut child, grandchild) = spawn_shell("trap '' INT; sleep 30 & echo $!; wait");
    let grandchild: i32 = grandchild.parse().expect("grandchild pid");
    assert_eq!(
        getpgid(Some(Pid::from_raw(grandchild))).unwrap().as_raw(),
        child.id() as i32
    );

    let outcome = stop_process_tree(&mut child, Duration::from_millis(300));

    assert_eq!(outcome, StopOutcome::Forced);
    assert!(
        wait_until_gone(grandchild, Duration::from_secs(5)),
        "grandchild {} survived the group kill",
        grandchild
    );
}

#[test]
fn test_exited_leader_group_still_gets_graceful_signal() {
    if !tool_available("python3") {
        eprintln!("skipping: python3 not available");
        return;
    }
    // The grandchild restores the default SIGINT action (background jobs of
    // sh start with it ignored) and reports its pid once it has done so.
    let (mut child, grandchild) = spawn_shell(
        "python3 -c 'import os, signal, time; \
signal.signal(signal.SIGINT, signal.SIG_DFL); \
print(os.getpid(), flush=True); time.sleep(30)' & exit 0",
    );
    let grandchild: i32 = grandchild.parse().expect("grandchild pid");

    // Leader exits on its own and is reaped before the stop request.
    assert_eq!(child.wait().unwrap(), 0);
    assert!(!is_gone(grandchild));

    let outcome = stop_process_tree(&mut child, Duration::from_millis(300));

    assert_eq!(outcome, StopOutcome::Graceful);
    assert!(
        wait_until_gone(grandchild, Duration::from_secs(5)),
        "grandchild {} survived the graceful group signal",
        grandchild
    );
}

#[test]
fn test_spawn_failure_propagates() {
    let mut cmd = Command::new("proctl-no-such-program-anywhere");
    match spawn_in_new_group(&mut cmd) {
        Err(ProctlError::Spawn { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("spawning a missing program succeeded"),
    }
}

#[test]
fn test_kill_port_holder_without_listener() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    kill_port_holder(port);
}

#[test]
fn test_kill_port_holder_kills_listener() {
    let finder = if cfg!(target_os = "macos") { "lsof" } else { "fuser" };
    if !tool_available("python3") || !tool_available(finder) {
        eprintln!("skipping: python3 or {} not available", finder);
        return;
    }
    let (mut listener, port) = spawn_shell(
        "exec python3 -c 'import socket, time; s = socket.socket(); \
s.setsockopt(socket.SOL_SOCKET, socket.SO_REUSEADDR, 1); \
s.bind((\"127.0.0.1\", 0)); s.listen(1); \
print(s.getsockname()[1], flush=True); time.sleep(60)'",
    );
    let port: u16 = port.parse().expect("listener port");

    kill_port_holder(port);

    let code = listener.wait_timeout(Duration::from_secs(5)).unwrap();
    if code.is_none() {
        let _ = listener.inner_mut().kill();
        let _ = listener.wait();
    }
    assert_eq!(code, Some(128 + 9), "listener on port {} was not killed", port);
}

#[test]
fn test_find_binary_layout() {
    let path = find_binary("/nonexistent/target", "release", "server");
    assert_eq!(
        path,
        std::path::Path::new("/nonexistent/target/release/server")
    );
}
