use crate::config::DevConfig;
use crate::exec::{ExecError, Runner};
use crate::pkgmgr::Tool;
use std::path::PathBuf;

const UV_INSTALL_SCRIPT: &str = "curl -LsSf https://astral.sh/uv/install.sh | sh";
const POETRY_INSTALL_SCRIPT: &str = "curl -sSL https://install.python-poetry.org | python3 -";

/// Uniform interface over the supported Python package managers
///
/// Every operation is a fixed argument vector per tool; subprocess
/// failures propagate with their captured output streams.
#[derive(Debug)]
pub struct PackageManager {
    tool: Tool,
    venv_path: PathBuf,
    runner: Runner,
}

impl PackageManager {
    pub fn new(config: &DevConfig, runner: Runner) -> Self {
        Self {
            tool: config.package_manager(),
            venv_path: config.venv_path(),
            runner,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Whether the configured tool responds to `--version`
    pub fn is_installed(&self) -> bool {
        self.runner.run(self.tool.as_str(), &["--version"]).is_ok()
    }

    /// Install the configured tool if it is not already present
    ///
    /// pip and pipenv ship with most Python installs and are assumed
    /// present.
    pub fn install_tool(&self) -> Result<(), ExecError> {
        let script = match self.tool {
            Tool::Uv => UV_INSTALL_SCRIPT,
            Tool::Poetry => POETRY_INSTALL_SCRIPT,
            Tool::Pip | Tool::Pipenv => return Ok(()),
        };

        if self.is_installed() {
            return Ok(());
        }

        self.runner.run("bash", &["-c", script])?;
        Ok(())
    }

    /// Create the virtual environment and return its path
    ///
    /// poetry and pipenv manage their own venv location, so nothing is
    /// invoked for them.
    pub fn create_venv(&self) -> Result<PathBuf, ExecError> {
        if let Some(argv) = self.create_venv_argv() {
            let args: Vec<&str> = argv.iter().map(String::as_str).collect();
            self.runner.run(&args[0], &args[1..])?;
        }
        Ok(self.venv_path.clone())
    }

    /// Install project dependencies, optionally with the dev group
    pub fn install_dependencies(&self, dev: bool) -> Result<(), ExecError> {
        let argv = self.install_argv(dev);
        let args: Vec<&str> = argv.iter().map(String::as_str).collect();
        self.runner.run(&args[0], &args[1..])?;
        Ok(())
    }

    /// Shell command that activates the virtual environment
    pub fn activate_command(&self) -> String {
        match self.tool {
            Tool::Uv | Tool::Pip => format!("source {}/bin/activate", self.venv_path.display()),
            Tool::Poetry => "poetry shell".to_string(),
            Tool::Pipenv => "pipenv shell".to_string(),
        }
    }

    fn create_venv_argv(&self) -> Option<Vec<String>> {
        let venv = self.venv_path.display().to_string();
        match self.tool {
            Tool::Uv => Some(vec!["uv".into(), "venv".into(), venv]),
            Tool::Pip => Some(vec!["python3".into(), "-m".into(), "venv".into(), venv]),
            Tool::Poetry | Tool::Pipenv => None,
        }
    }

    fn install_argv(&self, dev: bool) -> Vec<String> {
        match self.tool {
            Tool::Uv => {
                let mut argv: Vec<String> = ["uv", "pip", "install", "-e", "."]
                    .map(String::from)
                    .to_vec();
                if dev {
                    argv.push("--dev".into());
                }
                argv
            }
            Tool::Poetry => {
                let mut argv: Vec<String> = ["poetry", "install"].map(String::from).to_vec();
                if dev {
                    argv.push("--with=dev".into());
                }
                argv
            }
            Tool::Pipenv => {
                let mut argv: Vec<String> = ["pipenv", "install"].map(String::from).to_vec();
                if dev {
                    argv.push("--dev".into());
                }
                argv
            }
            Tool::Pip => {
                let pip = self.venv_path.join("bin").join("pip");
                vec![
                    pip.display().to_string(),
                    "install".into(),
                    "-e".into(),
                    ".".into(),
                ]
            }
        }
    }
}
