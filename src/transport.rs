//! Remote command transport
//!
//! Commands run on the remote host through the system `ssh` binary; each
//! invocation opens a fresh session, changes into the requested working
//! directory, and runs one command line. The key path is constructor state
//! on the transport, never process-global.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};

/// Captured result of one remote command
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub success: bool,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Abstract remote command execution
///
/// The deploy runner only needs "run this command line in that directory
/// and tell me how it went"; everything SSH-specific stays behind this.
pub trait Transport {
    /// Run `command` on the remote host with `dir` as working directory
    fn run(&self, dir: &str, command: &str) -> DeployResult<ExecOutput>;

    /// Human-readable target (for progress output)
    fn target(&self) -> String;
}

/// Transport backed by the system `ssh` client
pub struct SshTransport {
    /// Remote host (e.g. "deploy@build-1.lavaboom.io")
    host: String,
    /// Private key passed as `-i`; ssh falls back to its own defaults when unset
    key_file: Option<PathBuf>,
}

impl SshTransport {
    pub fn new(host: impl Into<String>, key_file: Option<PathBuf>) -> Self {
        Self {
            host: host.into(),
            key_file,
        }
    }

    /// Check that an `ssh` client is present on this machine
    pub fn is_available() -> bool {
        Command::new("ssh")
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn shell_quote(s: &str) -> String {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

impl Transport for SshTransport {
    fn run(&self, dir: &str, command: &str) -> DeployResult<ExecOutput> {
        let mut cmd = Command::new("ssh");
        if let Some(key) = &self.key_file {
            cmd.arg("-i").arg(key);
        }
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg(&self.host);
        cmd.arg(format!("cd {} && {}", Self::shell_quote(dir), command));

        let output = cmd
            .output()
            .map_err(|e| DeployError::Connection(e.to_string()))?;

        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn target(&self) -> String {
        self.host.clone()
    }
}

/// Recording transport for tests
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and shared.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Every (dir, command) pair issued, in order
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<(String, String)>>>,
    /// Commands containing any of these substrings report failure
    pub failing: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, needle: &str) -> Self {
        self.failing.lock().unwrap().push(needle.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    fn run(&self, dir: &str, command: &str) -> DeployResult<ExecOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((dir.to_string(), command.to_string()));

        let fails = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| command.contains(needle.as_str()));

        if fails {
            Ok(ExecOutput {
                success: false,
                code: 1,
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
            })
        } else {
            Ok(ExecOutput {
                success: true,
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    fn target(&self) -> String {
        "mock".to_string()
    }
}
