//! Error types for the guest tools installer.
//!
//! Component code returns [`InstallerError`]; only the orchestrators decide
//! whether a failure aborts cleanly or triggers a rollback.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result alias used throughout the installer library.
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Failure of an external command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be spawned at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited with a non-zero status.
    #[error("{command} failed, status: {status}, stdout: {stdout:?}, stderr: {stderr:?}")]
    Failed {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

/// Errors raised by installer components.
#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(String),

    #[error("guest tools cannot be installed on a container host")]
    ContainerHost,

    #[error("permission denied: installer must run as root")]
    PermissionDenied,

    #[error("host validation failed")]
    ValidationFailed,

    #[error("unable to read version from {0}")]
    VersionUnavailable(PathBuf),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    /// A failure after mutation began; cleanup has already been run.
    #[error("installation rolled back: {0}")]
    RolledBack(#[source] Box<InstallerError>),
}

impl InstallerError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach context to raw `std::io` results.
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| InstallerError::io(f(), e))
    }
}
