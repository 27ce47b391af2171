//! Deploy run execution
//!
//! Executes a `Plan` over a `Transport`: strictly sequential, abort on the
//! first non-tolerated failure, and the scratch directory is removed on
//! every exit path - including after a mid-sequence failure.

use crate::error::{DeployError, DeployResult};
use crate::plan::{Plan, Step};
use crate::transport::Transport;

/// Outcome of one deploy run
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Commands that completed successfully, in order
    pub completed: Vec<String>,
    /// Tolerated failures as (command, stderr) pairs
    pub tolerated: Vec<(String, String)>,
}

/// Execute `plan` over `transport`
///
/// `progress` is called with each step just before it is issued.
pub fn execute<T: Transport>(
    transport: &T,
    plan: &Plan,
    mut progress: impl FnMut(&Step),
) -> DeployResult<DeployReport> {
    let mut report = DeployReport::default();
    let mut failure: Option<DeployError> = None;

    for step in &plan.steps {
        progress(step);
        match transport.run(&step.dir, &step.command) {
            Ok(out) if out.success => {
                report.completed.push(step.command.clone());
            }
            Ok(out) if step.tolerate_failure => {
                report.tolerated.push((step.command.clone(), out.stderr));
            }
            Ok(out) => {
                failure = Some(DeployError::CommandFailed {
                    command: step.command.clone(),
                    dir: step.dir.clone(),
                    code: out.code,
                    stderr: out.stderr,
                });
                break;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    // Scratch removal runs no matter how the sequence ended. After a step
    // failure the original error wins; a cleanup problem only surfaces when
    // everything else worked.
    progress(&plan.cleanup);
    let cleanup = transport.run(&plan.cleanup.dir, &plan.cleanup.command);

    if let Some(err) = failure {
        return Err(err);
    }

    match cleanup {
        Ok(out) if out.success => {
            report.completed.push(plan.cleanup.command.clone());
            Ok(report)
        }
        Ok(out) => Err(DeployError::CommandFailed {
            command: plan.cleanup.command.clone(),
            dir: plan.cleanup.dir.clone(),
            code: out.code,
            stderr: out.stderr,
        }),
        Err(e) => Err(e),
    }
}
