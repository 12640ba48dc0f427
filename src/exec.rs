use crate::audit::AuditLogger;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    Failed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of an external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Runs external commands in a fixed working directory
///
/// Builds argv directly (no shell), captures both output streams, and
/// records every invocation in the audit log when one is attached.
/// Non-zero exit becomes `ExecError::Failed` carrying the captured streams.
#[derive(Debug, Clone)]
pub struct Runner {
    cwd: PathBuf,
    logger: Option<AuditLogger>,
}

impl Runner {
    pub fn new<P: AsRef<Path>>(cwd: P) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            logger: None,
        }
    }

    pub fn with_logger<P: AsRef<Path>>(cwd: P, logger: AuditLogger) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            logger: Some(logger),
        }
    }

    /// Execute a command to completion
    pub fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        self.process_output(program, args, output)
    }

    /// Execute a command, killing it if it runs past `timeout`
    ///
    /// The pipes are not drained while polling, so a child writing more
    /// than a pipe buffer of output stalls until the deadline and reads
    /// as a timeout. Suitable for short, quiet commands such as
    /// repository queries.
    pub fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait()? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecError::Timeout {
                        command: Self::render(program, args),
                        timeout,
                    });
                }
                None => std::thread::sleep(Duration::from_millis(20)),
            }
        }

        let output = child.wait_with_output()?;
        self.process_output(program, args, output)
    }

    fn process_output(
        &self,
        program: &str,
        args: &[&str],
        output: Output,
    ) -> Result<CommandOutput, ExecError> {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        let success = output.status.success();

        // Audit failures must not fail the command itself
        if let Some(logger) = &self.logger {
            let _ = logger.log_command(&Self::render(program, args), &self.cwd, exit_code);
        }

        if !success {
            return Err(ExecError::Failed {
                command: Self::render(program, args),
                exit_code,
                stdout,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success,
        })
    }

    fn render(program: &str, args: &[&str]) -> String {
        std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}
