use crate::config::DevConfig;
use crate::exec::Runner;
use crate::fsops::FsError;
use crate::git::GitExecutor;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem operations, routed through git when enabled
///
/// Move and remove go through `git mv`/`git rm` when git integration is
/// on and the working directory is inside a repository; otherwise they
/// fall back to direct filesystem calls. Copy and directory operations
/// are always direct.
#[derive(Debug)]
pub struct FileSystemOps {
    use_git: bool,
    git: GitExecutor,
}

impl FileSystemOps {
    pub fn new(config: &DevConfig, runner: Runner) -> Self {
        Self {
            use_git: config.use_git_ops(),
            git: GitExecutor::new(runner),
        }
    }

    fn git_routed(&self) -> bool {
        self.use_git && self.git.is_git_repo()
    }

    /// Move a file or directory, using `git mv` when routed through git
    pub fn move_path(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
        if self.git_routed() {
            let src = src.to_string_lossy();
            let dst = dst.to_string_lossy();
            self.git.execute(&["mv", &src, &dst])?;
        } else {
            fs::rename(src, dst)?;
        }
        Ok(())
    }

    /// Copy a file (always a direct filesystem call)
    pub fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
        fs::copy(src, dst)?;
        Ok(())
    }

    /// Remove a file, using `git rm` when routed through git
    ///
    /// A missing file is not an error in the direct path.
    pub fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        if self.git_routed() {
            let path = path.to_string_lossy();
            self.git.execute(&["rm", &path])?;
        } else {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn create_directory(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    pub fn remove_directory(&self, path: &Path) -> Result<(), FsError> {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    /// Stage files for commit; a no-op when git integration is off
    pub fn stage_files(&self, files: &[PathBuf]) -> Result<(), FsError> {
        if !self.use_git {
            return Ok(());
        }

        let mut args = vec!["add".to_string()];
        args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        self.git.execute(&argv)?;
        Ok(())
    }

    /// Commit staged changes; a no-op when git integration is off
    pub fn commit_changes(&self, message: &str) -> Result<(), FsError> {
        if !self.use_git {
            return Ok(());
        }

        self.git.execute(&["commit", "-m", message])?;
        Ok(())
    }

    /// Tracked files matching a pattern; empty outside a repository
    pub fn repo_files(&self, pattern: &str) -> Vec<PathBuf> {
        if !self.git.is_git_repo() {
            return Vec::new();
        }

        match self.git.execute(&["ls-files", pattern]) {
            Ok(output) => output
                .stdout
                .lines()
                .filter(|l| !l.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
