//! Host platform selection
//!
//! The platform is fixed at compile time. Code paths that need to reason about
//! another platform (path helpers, tests) take a [`Platform`] explicitly.

/// Operating-system family that decides which process-control strategy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Any other POSIX system (Linux, the BSDs, ...)
    Unix,
}

impl Platform {
    /// The platform this binary was built for
    #[cfg(windows)]
    pub const HOST: Platform = Platform::Windows;
    #[cfg(target_os = "macos")]
    pub const HOST: Platform = Platform::MacOs;
    #[cfg(all(unix, not(target_os = "macos")))]
    pub const HOST: Platform = Platform::Unix;

    pub const fn is_windows(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Suffix appended to executables produced by the toolchain
    pub const fn exe_suffix(self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Unix => "unix",
        };
        f.write_str(name)
    }
}
