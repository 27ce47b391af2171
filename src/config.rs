//! Configuration module for lavadeploy
//!
//! Implements the configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (`DRONE_BRANCH`, `DRONE_COMMIT`)
//! 3. Config file (`deploy.toml`)
//! 4. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};

/// Environment variable carrying the branch to deploy
pub const BRANCH_ENV: &str = "DRONE_BRANCH";

/// Environment variable carrying the commit to pin
pub const COMMIT_ENV: &str = "DRONE_COMMIT";

fn default_ref() -> String {
    "master".to_string()
}

fn default_registry() -> String {
    "registry.lavaboom.io".to_string()
}

fn default_namespace() -> String {
    "lavaboom".to_string()
}

fn default_service() -> String {
    "api".to_string()
}

fn default_api_repo() -> String {
    "git@github.com:lavab/api.git".to_string()
}

fn default_runner_repo() -> String {
    "git@github.com:lavab/docker.git".to_string()
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote host to deploy on (e.g. "deploy@build-1.lavaboom.io")
    #[serde(default)]
    pub host: String,

    /// SSH private key path; defaults to `~/.ssh/id_rsa` when unset
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Image registry prefix
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Registry namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Service name; image tags and container names derive from it
    #[serde(default = "default_service")]
    pub service: String,

    /// Git URL of the service source repository
    #[serde(default = "default_api_repo")]
    pub api_repo: String,

    /// Git URL of the repository holding the per-branch runner scripts
    #[serde(default = "default_runner_repo")]
    pub runner_repo: String,

    /// Branch to deploy
    #[serde(default = "default_ref")]
    pub branch: String,

    /// Commit to pin when `pin_commit` is set
    #[serde(default = "default_ref")]
    pub commit: String,

    /// Check out `commit` after cloning instead of building the branch tip
    #[serde(default)]
    pub pin_commit: bool,

    /// Explicitly `mkdir -p` the scratch directory before using it
    #[serde(default = "default_true")]
    pub create_workdir: bool,

    /// Tolerate a failing `docker rm -f` (no previous container running)
    #[serde(default = "default_true")]
    pub ignore_rm_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            key_file: None,
            registry: default_registry(),
            namespace: default_namespace(),
            service: default_service(),
            api_repo: default_api_repo(),
            runner_repo: default_runner_repo(),
            branch: default_ref(),
            commit: default_ref(),
            pin_commit: false,
            create_workdir: true,
            ignore_rm_failure: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DeployError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from the config file if it exists, defaults otherwise
    ///
    /// A present-but-invalid file is an error; a missing file is not.
    pub fn load_or_default(path: &Path) -> DeployResult<Self> {
        if path.exists() {
            Ok(Self::load(path)?.with_env_overrides())
        } else {
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Apply environment variable overrides (`DRONE_*`)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(branch) = std::env::var(BRANCH_ENV) {
            if !branch.is_empty() {
                self.branch = branch;
            }
        }
        if let Ok(commit) = std::env::var(COMMIT_ENV) {
            if !commit.is_empty() {
                self.commit = commit;
            }
        }
        self
    }

    /// Apply CLI flag overrides (highest priority)
    pub fn with_flag_overrides(mut self, branch: Option<String>, commit: Option<String>) -> Self {
        if let Some(branch) = branch {
            self.branch = branch;
        }
        if let Some(commit) = commit {
            self.commit = commit;
        }
        self
    }

    /// Full image reference: `{registry}/{namespace}/{service}-{branch}`
    pub fn image_tag(&self) -> String {
        format!(
            "{}/{}/{}-{}",
            self.registry, self.namespace, self.service, self.branch
        )
    }

    /// Name of the running container: `{service}-{branch}`
    pub fn container_name(&self) -> String {
        format!("{}-{}", self.service, self.branch)
    }

    /// Per-branch runner script inside the runner repository
    pub fn runner_script(&self) -> String {
        format!("./{}.sh", self.container_name())
    }

    /// Directory the service repository clones into
    pub fn api_dir(&self) -> String {
        repo_dir_name(&self.api_repo)
    }

    /// Directory the runner repository clones into
    pub fn runner_dir(&self) -> String {
        repo_dir_name(&self.runner_repo)
    }

    /// SSH key path, falling back to `~/.ssh/id_rsa`
    pub fn resolved_key_file(&self) -> Option<PathBuf> {
        self.key_file
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".ssh/id_rsa")))
    }
}

/// Directory name `git clone` picks for a repository URL
fn repo_dir_name(url: &str) -> String {
    let tail = url
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(url);
    tail.trim_end_matches(".git").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_lavaboom_setup() {
        let config = Config::default();
        assert_eq!(config.branch, "master");
        assert_eq!(config.commit, "master");
        assert_eq!(config.registry, "registry.lavaboom.io");
        assert_eq!(config.namespace, "lavaboom");
        assert_eq!(config.service, "api");
        assert!(config.create_workdir);
        assert!(config.ignore_rm_failure);
        assert!(!config.pin_commit);
    }

    #[test]
    fn image_tag_combines_registry_namespace_and_branch() {
        let config = Config {
            branch: "develop".to_string(),
            ..Config::default()
        };
        assert_eq!(config.image_tag(), "registry.lavaboom.io/lavaboom/api-develop");
        assert_eq!(config.container_name(), "api-develop");
        assert_eq!(config.runner_script(), "./api-develop.sh");
    }

    #[test]
    fn repo_dir_name_strips_git_suffix() {
        assert_eq!(repo_dir_name("git@github.com:lavab/api.git"), "api");
        assert_eq!(repo_dir_name("git@github.com:lavab/docker.git"), "docker");
        assert_eq!(repo_dir_name("https://github.com/lavab/api.git"), "api");
        assert_eq!(repo_dir_name("api"), "api");
    }

    #[test]
    fn flag_overrides_beat_config_values() {
        let config = Config::default()
            .with_flag_overrides(Some("feature-x".to_string()), None);
        assert_eq!(config.branch, "feature-x");
        assert_eq!(config.commit, "master");
    }

    #[test]
    fn load_parses_a_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(
            &path,
            "host = \"deploy@build-1\"\nbranch = \"develop\"\npin_commit = true\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.host, "deploy@build-1");
        assert_eq!(config.branch, "develop");
        assert!(config.pin_commit);
        assert_eq!(config.registry, "registry.lavaboom.io");
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(&path, "host = [not toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, DeployError::InvalidConfig { .. }));
    }

    #[test]
    fn load_or_default_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.branch, "master");
    }
}
