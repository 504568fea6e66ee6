//! Process-lifecycle helpers for build and CI harnesses
//!
//! - [`find_binary`] / [`binary_name`] resolve Cargo-produced executables
//! - [`spawn_in_new_group`] launches a command as the leader of its own
//!   process group
//! - [`stop_process_tree`] stops a group gracefully, force-killing it after a
//!   timeout
//! - [`kill_port_holder`] evicts whatever process listens on a TCP port

#[cfg(not(any(unix, windows)))]
compile_error!("proctl supports Unix-like systems and Windows only");

pub mod binary;
pub mod cli;
pub mod error;
pub mod platform;
pub mod port;
pub mod process;
pub mod signal;
pub mod stop;

pub use binary::{binary_name, find_binary};
pub use error::{ProctlError, Result};
pub use platform::Platform;
pub use port::kill_port_holder;
pub use process::{spawn_in_new_group, spawn_in_new_group_with_flags, GroupChild};
pub use stop::{stop_process_tree, ProcessTree, StopConfig, StopOutcome, DEFAULT_STOP_TIMEOUT};
