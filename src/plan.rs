//! Deploy plan construction
//!
//! A `Plan` is the exact ordered list of remote commands one deploy run
//! issues. Building it is pure - no I/O, no randomness - so the sequence is
//! fully unit-testable and printable before anything touches the remote.

use serde::Serialize;

use crate::config::Config;

/// One remote command with its working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Remote working directory the command runs in
    pub dir: String,
    /// Shell command line
    pub command: String,
    /// Continue the run even if this command exits non-zero
    pub tolerate_failure: bool,
}

impl Step {
    fn new(dir: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            command: command.into(),
            tolerate_failure: false,
        }
    }

    fn tolerated(mut self, tolerate: bool) -> Self {
        self.tolerate_failure = tolerate;
        self
    }
}

/// Ordered command sequence for one deploy run
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Scratch directory all steps work under
    pub workdir: String,
    /// Main sequence; aborts on the first non-tolerated failure
    pub steps: Vec<Step>,
    /// Scratch removal; issued last on every exit path
    pub cleanup: Step,
}

impl Plan {
    /// Build the command sequence for `config` inside `workdir`
    pub fn build(config: &Config, workdir: &str) -> Self {
        let api_dir = format!("{}/{}", workdir, config.api_dir());
        let runners_dir = format!("{}/{}/runners", workdir, config.runner_dir());

        let mut steps = Vec::new();

        if config.create_workdir {
            steps.push(Step::new("/tmp", format!("mkdir -p {workdir}")));
        }

        steps.push(Step::new(workdir, format!("git clone {}", config.api_repo)));

        if config.pin_commit {
            steps.push(Step::new(
                api_dir.as_str(),
                format!("git checkout {}", config.commit),
            ));
        }

        steps.push(Step::new(
            api_dir.as_str(),
            format!("docker build -t {} .", config.image_tag()),
        ));

        steps.push(Step::new(
            workdir,
            format!("git clone {}", config.runner_repo),
        ));

        steps.push(
            Step::new(workdir, format!("docker rm -f {}", config.container_name()))
                .tolerated(config.ignore_rm_failure),
        );

        steps.push(Step::new(runners_dir.as_str(), config.runner_script()));

        Self {
            workdir: workdir.to_string(),
            steps,
            cleanup: Step::new("/tmp", format!("rm -r {workdir}")),
        }
    }

    /// Main steps followed by the cleanup step, in issue order
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().chain(std::iter::once(&self.cleanup))
    }
}
