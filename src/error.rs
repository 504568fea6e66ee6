//! Error type and process exit codes for proctl

use thiserror::Error;

/// Exit codes reported by the `proctl` binary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    NoError = 0,
    InvalidArguments = 1,
    RuntimeError = 3,
    CommandNotFound = 127,
}

impl ReturnCode {
    pub fn as_exit_code(self) -> i32 {
        self as i32
    }
}

/// Main error type for proctl operations
#[derive(Error, Debug)]
pub enum ProctlError {
    #[error("Invalid command line arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register signal handler: {0}")]
    SignalSetup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(unix)]
    #[error("System error: {0}")]
    SystemError(#[from] nix::Error),

    #[cfg(windows)]
    #[error("Windows error: {0}")]
    WindowsError(String),
}

impl ProctlError {
    /// Convert error to the appropriate return code
    pub fn to_return_code(&self) -> ReturnCode {
        match self {
            ProctlError::InvalidArguments(_) => ReturnCode::InvalidArguments,
            ProctlError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                ReturnCode::CommandNotFound
            }
            ProctlError::Spawn { .. } => ReturnCode::RuntimeError,
            ProctlError::Wait { .. } => ReturnCode::RuntimeError,
            ProctlError::SignalSetup(_) => ReturnCode::RuntimeError,
            ProctlError::IoError(_) => ReturnCode::RuntimeError,
            #[cfg(unix)]
            ProctlError::SystemError(_) => ReturnCode::RuntimeError,
            #[cfg(windows)]
            ProctlError::WindowsError(_) => ReturnCode::RuntimeError,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.to_return_code().as_exit_code()
    }

    /// The underlying I/O error kind, if this error wraps one
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ProctlError::Spawn { source, .. } | ProctlError::Wait { source, .. } => {
                Some(source.kind())
            }
            ProctlError::IoError(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result type alias for proctl operations
pub type Result<T> = std::result::Result<T, ProctlError>;

impl From<ProctlError> for i32 {
    fn from(error: ProctlError) -> Self {
        error.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn missing_program_maps_to_127() {
        let err = ProctlError::Spawn {
            program: "nope".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), 127);
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn other_spawn_failures_are_runtime_errors() {
        let err = ProctlError::Spawn {
            program: "/etc".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_return_code(), ReturnCode::RuntimeError);
        assert_eq!(i32::from(err), 3);
    }

    #[test]
    fn invalid_arguments_exit_code() {
        let err = ProctlError::InvalidArguments("no command".into());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.io_kind(), None);
    }
}
