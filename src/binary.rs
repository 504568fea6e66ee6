//! Resolution of Cargo-produced binary paths

use crate::platform::Platform;
use std::path::{Path, PathBuf};

impl Platform {
    /// Return `name` with this platform's executable suffix
    pub fn binary_name(self, name: &str) -> String {
        format!("{}{}", name, self.exe_suffix())
    }

    /// Join `target_dir/profile/<binary name>` for this platform
    pub fn find_binary(self, target_dir: &Path, profile: &str, name: &str) -> PathBuf {
        target_dir.join(profile).join(self.binary_name(name))
    }
}

/// Return `name` with `.exe` appended on Windows
pub fn binary_name(name: &str) -> String {
    Platform::HOST.binary_name(name)
}

/// Resolve the full path to a binary built into `target_dir` under `profile`
///
/// `name` is given without a platform extension. The path is not checked for
/// existence.
pub fn find_binary(target_dir: impl AsRef<Path>, profile: &str, name: &str) -> PathBuf {
    Platform::HOST.find_binary(target_dir.as_ref(), profile, name)
}
