//! Error types for lavadeploy
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Config file exists but could not be parsed
    #[error("invalid config file {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// No remote host configured
    #[error("no remote host configured - set 'host' in the config file")]
    MissingHost,

    /// The transport binary could not be spawned
    #[error("failed to start ssh: {0}")]
    Connection(String),

    /// A remote command exited non-zero
    #[error("command '{command}' failed in {dir} (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        dir: String,
        code: i32,
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
