use std::path::{Path, PathBuf};

use crate::error::{Result, ShipError};
use crate::runner::{CommandRunner, Invocation, StepOutcome};

/// Git operations against one working tree, through a [`CommandRunner`]
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    repo: PathBuf,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, repo: &Path) -> Self {
        Self {
            runner,
            repo: repo.to_path_buf(),
        }
    }

    fn cmd(&self) -> Invocation {
        Invocation::new("git", &self.repo)
    }

    /// Name of the checked out branch (`HEAD` when detached)
    pub fn current_branch(&self) -> Result<String> {
        let outcome = self
            .runner
            .run(&self.cmd().args(["rev-parse", "--abbrev-ref", "HEAD"]).captured());

        if !outcome.success() {
            return Err(ShipError::BranchUnknown {
                reason: outcome.describe(),
            });
        }

        Ok(outcome.stdout.trim().to_string())
    }

    pub fn add(&self, path: &Path) -> StepOutcome {
        self.runner
            .run(&self.cmd().arg("add").arg(path.to_string_lossy()))
    }

    pub fn commit(&self, message: &str) -> StepOutcome {
        self.runner.run(&self.cmd().args(["commit", "-m", message]))
    }

    /// Commit every tracked modification
    pub fn commit_all(&self, message: &str) -> StepOutcome {
        self.runner.run(&self.cmd().args(["commit", "-am", message]))
    }

    pub fn push(&self) -> StepOutcome {
        self.runner.run(&self.cmd().arg("push"))
    }

    /// Delete every local tag so a following fetch mirrors the remote exactly
    pub fn delete_local_tags(&self) -> StepOutcome {
        let listing = self.runner.run(&self.cmd().args(["tag", "-l"]).captured());
        if !listing.success() {
            return listing;
        }

        let tags: Vec<&str> = listing
            .stdout
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            tracing::debug!("No local tags to delete");
            return StepOutcome::ok();
        }

        tracing::debug!("Deleting {} local tags", tags.len());
        self.runner
            .run(&self.cmd().args(["tag", "-d"]).args(tags).captured())
    }

    pub fn fetch_tags(&self) -> StepOutcome {
        self.runner.run(&self.cmd().args(["fetch", "--tags"]))
    }

    pub fn tag_annotated(&self, name: &str, message: &str) -> StepOutcome {
        self.runner
            .run(&self.cmd().args(["tag", name, "-m", message]))
    }

    pub fn push_tags(&self, remote: &str) -> StepOutcome {
        self.runner
            .run(&self.cmd().args(["push", remote, "--tags"]))
    }

    /// Clone `url` into a new directory below this instance's directory
    pub fn clone_repo(&self, url: &str) -> StepOutcome {
        self.runner.run(&self.cmd().args(["clone", url]))
    }
}
