//! Post-generation steps and the closing instructions.
//!
//! After a successful run kiln can install the generated project's packages
//! and run its test suite. Both steps run one after the other in the target
//! directory with inherited stdio; a failing step is reported as a warning
//! and never turns a successful generation into a failure.

use crate::context::RenderContext;
use log::{info, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// One command run in the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostStep {
    pub label: &'static str,
    pub command: String,
}

/// Outcome of a post-generation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
    /// Not attempted because an earlier step failed.
    Skipped,
}

/// Install, then test, with the chosen package manager.
pub fn post_steps(context: &RenderContext) -> Vec<PostStep> {
    vec![
        PostStep { label: "install", command: context.package_manager.install.to_string() },
        PostStep { label: "test", command: context.package_manager.test.to_string() },
    ]
}

/// Runs `steps` in `directory`, stopping at the first failure.
pub fn run_post_steps(directory: &Path, steps: &[PostStep]) -> Vec<(PostStep, StepOutcome)> {
    let mut failed = false;
    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        if failed {
            outcomes.push((step.clone(), StepOutcome::Skipped));
            continue;
        }
        info!("Running {}: {}", step.label, step.command);
        let outcome = match run_command(directory, &step.command) {
            Ok(()) => StepOutcome::Succeeded,
            Err(reason) => {
                warn!("{} step failed: {reason}", step.label);
                failed = true;
                StepOutcome::Failed(reason)
            }
        };
        outcomes.push((step.clone(), outcome));
    }
    outcomes
}

fn run_command(directory: &Path, command: &str) -> std::result::Result<(), String> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| "empty command".to_string())?;
    let status = Command::new(program)
        .args(parts)
        .current_dir(directory)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| format!("cannot start '{program}': {e}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("'{command}' exited with {status}"))
    }
}

/// Shell lines telling the user how to continue.
///
/// `tests_ran` drops the test line once the test step has already run.
pub fn next_steps(target: &Path, context: &RenderContext, installed: bool, tests_ran: bool) -> Vec<String> {
    let pm = &context.package_manager;
    let mut lines = vec![format!("cd {}", target.display())];
    if !installed {
        lines.push(pm.install.to_string());
    }
    if !tests_ran {
        lines.push(pm.test.to_string());
    }
    lines.push(format!("{} dev", pm.run));
    // npm needs `--` to forward flags to the script
    let forward = if pm.name == "npm" { " --" } else { "" };
    lines.push(format!("{} api{forward} --status", pm.run));

    // the web:* scripts reach into the app directory from the project root
    if context.frontend.is_some() {
        lines.push(format!("{} web:dev", pm.run));
        lines.push(format!("{} web:build", pm.run));
    }
    lines
}
