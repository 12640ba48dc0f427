use crate::exec::{CommandOutput, ExecError, Runner};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to repository metadata queries
const REPO_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Executes git commands within a working directory
#[derive(Debug, Clone)]
pub struct GitExecutor {
    runner: Runner,
}

impl GitExecutor {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// Run a git subcommand, e.g. `execute(&["status", "--porcelain"])`
    pub fn execute(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        Ok(self.runner.run("git", args)?)
    }

    /// Run a git subcommand with a bounded timeout
    pub fn execute_with_timeout(
        &self,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, GitError> {
        Ok(self.runner.run_with_timeout("git", args, timeout)?)
    }

    /// Whether the working directory is inside a git repository
    ///
    /// Any failure (non-zero exit, missing binary, timeout) reads as "no".
    pub fn is_git_repo(&self) -> bool {
        self.execute_with_timeout(&["rev-parse", "--git-dir"], REPO_QUERY_TIMEOUT)
            .is_ok()
    }

    /// The directory git commands run in
    pub fn workdir(&self) -> &Path {
        self.runner.cwd()
    }
}
