//! lavadeploy - remote deployment runner for the Lavaboom API service
//!
//! One invocation clones the API and runner repositories into a freshly
//! named scratch directory on the remote host, builds the container image
//! for the target branch, replaces the running container, and removes the
//! scratch directory again.

pub mod config;
pub mod error;
pub mod plan;
pub mod runner;
pub mod transport;
pub mod workdir;

// Re-exports for convenience
pub use config::Config;
pub use error::{DeployError, DeployResult};
pub use plan::{Plan, Step};
pub use runner::{execute, DeployReport};
pub use transport::{ExecOutput, SshTransport, Transport};
pub use workdir::scratch_dir;
