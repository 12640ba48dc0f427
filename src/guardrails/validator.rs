use crate::config::DevConfig;
use crate::exec::Runner;
use crate::git::GitExecutor;
use crate::guardrails::{Baseline, GuardrailsError};
use crate::pkgmgr::Tool;
use std::path::{Path, PathBuf};

/// Environment variables that indicate a containerized dev environment
pub const CONTAINER_ENV_VARS: &[&str] = &[
    "DEVCONTAINER",
    "REMOTE_CONTAINERS",
    "VSCODE_REMOTE_CONTAINERS_SESSION",
];

/// Conventional location of the baseline file
pub const DEFAULT_BASELINE_PATH: &str = ".github/guardrails/package-baseline.toml";

/// Fixed violation messages for the standard compliance checks
const STANDARD_MESSAGES: &[(&str, &str)] = &[
    (
        "package_manager_supported",
        "Package manager not supported by guardrails",
    ),
    (
        "venv_properly_created",
        "Virtual environment not properly created",
    ),
    (
        "git_operations_available",
        "Git operations not available in repository",
    ),
    (
        "temp_security_compliant",
        "Temporary directory security not compliant",
    ),
    (
        "devcontainer_usage",
        "Work not being done in devcontainer (when required)",
    ),
];

/// Fixed violation messages for the baseline requirements
const BASELINE_MESSAGES: &[(&str, &str)] = &[
    (
        "python_package_management",
        "Python package management not using configured tool",
    ),
    ("venv_management", "Virtual environment not tool-managed"),
    (
        "filesystem_operations",
        "Filesystem operations not following git-preferred rules",
    ),
    ("temporary_files", "Temporary files not created securely"),
    (
        "development_environment",
        "Development not isolated in devcontainer",
    ),
];

/// Snapshot of the environment facts the checks depend on
///
/// Detected once at validator construction; injectable so tests are not
/// hostage to the real environment.
#[derive(Debug, Clone, Copy)]
pub struct EnvProbe {
    pub ci: bool,
    pub devcontainer: bool,
}

impl EnvProbe {
    pub fn detect() -> Self {
        let ci = std::env::var("CI").is_ok_and(|v| v == "true");
        let devcontainer = CONTAINER_ENV_VARS
            .iter()
            .any(|var| std::env::var(var).is_ok_and(|v| !v.is_empty()));

        Self { ci, devcontainer }
    }
}

/// Evaluates the compliance baseline against live system state
///
/// Every check swallows subprocess and filesystem errors into a plain
/// boolean; only `enforce_guardrails` surfaces an error, and only for
/// the aggregate violation list.
#[derive(Debug)]
pub struct GuardrailsValidator {
    baseline: Baseline,
    env: EnvProbe,
    workdir: PathBuf,
}

impl GuardrailsValidator {
    /// Load the baseline from an explicit path or the conventional
    /// `.github/guardrails/package-baseline.toml`
    pub fn new(baseline_path: Option<&Path>) -> Result<Self, GuardrailsError> {
        let path = baseline_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASELINE_PATH));
        let baseline = Baseline::load(&path)?;
        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Ok(Self::with_parts(baseline, EnvProbe::detect(), workdir))
    }

    /// Construct from explicit parts (dependency injection for tests)
    pub fn with_parts(baseline: Baseline, env: EnvProbe, workdir: PathBuf) -> Self {
        Self {
            baseline,
            env,
            workdir,
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// True iff the tool appears in the baseline's tool table
    pub fn validate_package_manager(&self, tool: &str) -> bool {
        self.baseline.supports_tool(tool)
    }

    /// Tool-specific venv existence checks
    ///
    /// False whenever the path itself is missing. poetry and pipenv keep
    /// their venv elsewhere, so any existing path passes for them.
    pub fn validate_venv_creation(&self, tool: Tool, venv_path: &Path) -> bool {
        if !venv_path.exists() {
            return false;
        }

        match tool {
            Tool::Uv => venv_path.join("pyvenv.cfg").exists(),
            Tool::Pip => venv_path.join("bin").join("activate").exists(),
            Tool::Poetry | Tool::Pipenv => true,
        }
    }

    /// True iff a bounded `git rev-parse --git-dir` exits zero
    pub fn validate_git_operations(&self) -> bool {
        GitExecutor::new(Runner::new(&self.workdir)).is_git_repo()
    }

    /// Permission check on the temp base directory
    ///
    /// A directory that does not exist yet is compliant (lazy creation).
    /// CI environments relax the check to plain existence.
    pub fn validate_temp_security(&self, temp_dir: &Path) -> bool {
        if !temp_dir.exists() {
            return true;
        }

        if self.env.ci {
            return temp_dir.is_dir();
        }

        dir_mode(temp_dir).is_some_and(|mode| mode <= 0o700)
    }

    /// True in CI, or when any containerization indicator variable is set
    pub fn validate_devcontainer_usage(&self) -> bool {
        self.env.ci || self.env.devcontainer
    }

    /// Git-preferred filesystem rules reduce to git being available
    pub fn validate_filesystem_operations(&self) -> bool {
        self.validate_git_operations()
    }

    /// Evaluate the declared baseline requirements against live config
    ///
    /// Requirements absent from the baseline are absent from the result.
    pub fn validate_baseline_requirements(&self, config: &DevConfig) -> Vec<(&'static str, bool)> {
        let mut results = Vec::new();

        if self.baseline.requirement("python_package_management") == Some("configured_tool") {
            results.push((
                "python_package_management",
                self.validate_package_manager(config.package_manager().as_str()),
            ));
        }

        if self.baseline.requirement("venv_management") == Some("tool_managed") {
            results.push((
                "venv_management",
                self.validate_venv_creation(config.package_manager(), &config.venv_path()),
            ));
        }

        if self.baseline.requirement("filesystem_operations") == Some("git_preferred") {
            results.push((
                "filesystem_operations",
                self.validate_filesystem_operations(),
            ));
        }

        if self.baseline.requirement("temporary_files") == Some("secure_mktemp") {
            results.push((
                "temporary_files",
                self.validate_temp_security(&config.tmp_base_dir()),
            ));
        }

        if self.baseline.requirement("development_environment") == Some("devcontainer_isolated") {
            results.push((
                "development_environment",
                self.validate_devcontainer_usage(),
            ));
        }

        results
    }

    /// Run every enabled compliance check, in declaration order
    pub fn check_compliance(&self, config: &DevConfig) -> Vec<(&'static str, bool)> {
        let mut results = Vec::new();

        if self.baseline.check_enabled("check_package_manager") {
            results.push((
                "package_manager_supported",
                self.validate_package_manager(config.package_manager().as_str()),
            ));
        }

        if self.baseline.check_enabled("check_venv_isolation") {
            results.push((
                "venv_properly_created",
                self.validate_venv_creation(config.package_manager(), &config.venv_path()),
            ));
        }

        if self.baseline.check_enabled("check_git_operations") {
            results.push(("git_operations_available", self.validate_git_operations()));
        }

        if self.baseline.check_enabled("check_temp_security") {
            results.push((
                "temp_security_compliant",
                self.validate_temp_security(&config.tmp_base_dir()),
            ));
        }

        if self.baseline.check_enabled("validate_devcontainer_usage") {
            results.push(("devcontainer_usage", self.validate_devcontainer_usage()));
        }

        results
    }

    /// One fixed message per failed check, standard set then baseline set
    ///
    /// A check absent from either result counts as passing.
    pub fn get_violations(&self, config: &DevConfig) -> Vec<String> {
        let compliance = self.check_compliance(config);
        let baseline = self.validate_baseline_requirements(config);

        let mut violations = Vec::new();
        for (name, message) in STANDARD_MESSAGES {
            if failed(&compliance, name) {
                violations.push(message.to_string());
            }
        }
        for (name, message) in BASELINE_MESSAGES {
            if failed(&baseline, name) {
                violations.push(message.to_string());
            }
        }

        violations
    }

    /// Error out with the newline-joined violation list, if any
    pub fn enforce_guardrails(&self, config: &DevConfig) -> Result<(), GuardrailsError> {
        let violations = self.get_violations(config);
        if violations.is_empty() {
            return Ok(());
        }

        let list = violations
            .iter()
            .map(|v| format!("- {}", v))
            .collect::<Vec<_>>()
            .join("\n");
        Err(GuardrailsError::Violations(list))
    }
}

fn failed(results: &[(&str, bool)], name: &str) -> bool {
    results.iter().any(|(n, passed)| *n == name && !passed)
}

#[cfg(unix)]
fn dir_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .ok()
        .map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn dir_mode(_path: &Path) -> Option<u32> {
    // No permission bits to inspect; treat as owner-only
    Some(0o700)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    const FULL_BASELINE: &str = r#"
        [tool_configuration.uv]
        [tool_configuration.pip]
        [tool_configuration.poetry]
        [tool_configuration.pipenv]

        [baseline_requirements]
        python_package_management = "configured_tool"
        venv_management = "tool_managed"
        filesystem_operations = "git_preferred"
        temporary_files = "secure_mktemp"
        development_environment = "devcontainer_isolated"
    "#;

    const NOT_CI: EnvProbe = EnvProbe {
        ci: false,
        devcontainer: false,
    };

    fn validator(baseline: &str, env: EnvProbe, workdir: &Path) -> GuardrailsValidator {
        GuardrailsValidator::with_parts(
            Baseline::from_toml_str(baseline).unwrap(),
            env,
            workdir.to_path_buf(),
        )
    }

    fn git_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        Command::new("git")
            .args(["init"])
            .current_dir(temp.path())
            .output()
            .unwrap();
        temp
    }

    #[cfg(unix)]
    fn chmod(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_package_manager_membership() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());

        for tool in Tool::ALL {
            assert!(v.validate_package_manager(tool.as_str()));
        }
        assert!(!v.validate_package_manager("conda"));
        assert!(!v.validate_package_manager(""));
    }

    #[test]
    fn test_venv_creation_uv() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());
        let venv = temp.path().join(".venv");

        assert!(!v.validate_venv_creation(Tool::Uv, &venv));

        fs::create_dir(&venv).unwrap();
        assert!(!v.validate_venv_creation(Tool::Uv, &venv));

        fs::write(venv.join("pyvenv.cfg"), "home = /usr").unwrap();
        assert!(v.validate_venv_creation(Tool::Uv, &venv));
    }

    #[test]
    fn test_venv_creation_pip() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());
        let venv = temp.path().join(".venv");

        fs::create_dir_all(venv.join("bin")).unwrap();
        assert!(!v.validate_venv_creation(Tool::Pip, &venv));

        fs::write(venv.join("bin").join("activate"), "# activate").unwrap();
        assert!(v.validate_venv_creation(Tool::Pip, &venv));
    }

    #[test]
    fn test_venv_creation_self_managed_tools() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());
        let venv = temp.path().join("anything");

        // Missing path fails regardless of tool
        assert!(!v.validate_venv_creation(Tool::Poetry, &venv));
        assert!(!v.validate_venv_creation(Tool::Pipenv, &venv));

        fs::create_dir(&venv).unwrap();
        assert!(v.validate_venv_creation(Tool::Poetry, &venv));
        assert!(v.validate_venv_creation(Tool::Pipenv, &venv));
    }

    #[test]
    fn test_git_operations_inside_and_outside_repo() {
        let repo = git_repo();
        let v = validator(FULL_BASELINE, NOT_CI, repo.path());
        assert!(v.validate_git_operations());
        assert!(v.validate_filesystem_operations());

        let plain = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, plain.path());
        assert!(!v.validate_git_operations());
        assert!(!v.validate_filesystem_operations());
    }

    #[test]
    #[cfg(unix)]
    fn test_temp_security_permission_bits() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());
        let dir = temp.path().join("scratch");
        fs::create_dir(&dir).unwrap();

        chmod(&dir, 0o700);
        assert!(v.validate_temp_security(&dir));

        chmod(&dir, 0o755);
        assert!(!v.validate_temp_security(&dir));

        // More restrictive than 700 also passes
        chmod(&dir, 0o500);
        assert!(v.validate_temp_security(&dir));
    }

    #[test]
    fn test_temp_security_missing_dir_is_compliant() {
        let temp = TempDir::new().unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, temp.path());

        assert!(v.validate_temp_security(&temp.path().join("not-created-yet")));
    }

    #[test]
    #[cfg(unix)]
    fn test_temp_security_relaxed_in_ci() {
        let temp = TempDir::new().unwrap();
        let ci = EnvProbe {
            ci: true,
            devcontainer: false,
        };
        let v = validator(FULL_BASELINE, ci, temp.path());
        let dir = temp.path().join("scratch");
        fs::create_dir(&dir).unwrap();
        chmod(&dir, 0o755);

        // Existence is enough in CI
        assert!(v.validate_temp_security(&dir));
    }

    #[test]
    fn test_devcontainer_usage() {
        let temp = TempDir::new().unwrap();

        let v = validator(FULL_BASELINE, NOT_CI, temp.path());
        assert!(!v.validate_devcontainer_usage());

        let in_container = EnvProbe {
            ci: false,
            devcontainer: true,
        };
        let v = validator(FULL_BASELINE, in_container, temp.path());
        assert!(v.validate_devcontainer_usage());

        let in_ci = EnvProbe {
            ci: true,
            devcontainer: false,
        };
        let v = validator(FULL_BASELINE, in_ci, temp.path());
        assert!(v.validate_devcontainer_usage());
    }

    #[test]
    fn test_check_compliance_honors_toggles() {
        let temp = TempDir::new().unwrap();
        let baseline = r#"
            [compliance_checks]
            check_git_operations = false
            check_venv_isolation = false
        "#;
        let config = DevConfig::from_toml_str("", "").unwrap();
        let v = validator(baseline, NOT_CI, temp.path());

        let names: Vec<&str> = v
            .check_compliance(&config)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(
            names,
            vec![
                "package_manager_supported",
                "temp_security_compliant",
                "devcontainer_usage"
            ]
        );
    }

    #[test]
    fn test_baseline_requirements_absent_are_not_reported() {
        let temp = TempDir::new().unwrap();
        let baseline = r#"
            [baseline_requirements]
            development_environment = "devcontainer_isolated"
        "#;
        let config = DevConfig::from_toml_str("", "").unwrap();
        let v = validator(baseline, NOT_CI, temp.path());

        let results = v.validate_baseline_requirements(&config);
        assert_eq!(results, vec![("development_environment", false)]);
    }

    #[test]
    fn test_unrecognized_mode_literal_skips_check() {
        let temp = TempDir::new().unwrap();
        let baseline = r#"
            [baseline_requirements]
            venv_management = "self_hosted"
        "#;
        let config = DevConfig::from_toml_str("", "").unwrap();
        let v = validator(baseline, NOT_CI, temp.path());

        assert!(v.validate_baseline_requirements(&config).is_empty());
    }

    #[test]
    fn test_violations_order_and_content() {
        let plain = TempDir::new().unwrap();
        let main = format!(
            "[package_manager]\ntool = \"uv\"\nvenv_path = \"{}\"\n\n[filesystem]\ntmp_base_dir = \"{}\"\n",
            plain.path().join("absent-venv").display(),
            plain.path().join("tmp").display()
        );
        let config = DevConfig::from_toml_str(&main, "").unwrap();

        // Empty tool table, outside a repo, outside any container: the
        // tool, git, devcontainer and baseline checks all fail.
        let baseline = r#"
            [baseline_requirements]
            python_package_management = "configured_tool"
            development_environment = "devcontainer_isolated"
        "#;
        let v = validator(baseline, NOT_CI, plain.path());

        let violations = v.get_violations(&config);
        assert_eq!(
            violations,
            vec![
                "Package manager not supported by guardrails".to_string(),
                "Virtual environment not properly created".to_string(),
                "Git operations not available in repository".to_string(),
                "Work not being done in devcontainer (when required)".to_string(),
                "Python package management not using configured tool".to_string(),
                "Development not isolated in devcontainer".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_violations_when_everything_passes() {
        let repo = git_repo();
        let venv = repo.path().join(".venv");
        fs::create_dir(&venv).unwrap();
        fs::write(venv.join("pyvenv.cfg"), "home = /usr").unwrap();

        let main = format!(
            "[package_manager]\ntool = \"uv\"\nvenv_path = \"{}\"\n\n[filesystem]\ntmp_base_dir = \"{}\"\n",
            venv.display(),
            repo.path().join("tmp").display()
        );
        let config = DevConfig::from_toml_str(&main, "").unwrap();

        let in_container = EnvProbe {
            ci: false,
            devcontainer: true,
        };
        let v = validator(FULL_BASELINE, in_container, repo.path());

        assert!(v.get_violations(&config).is_empty());
        assert!(v.enforce_guardrails(&config).is_ok());
    }

    #[test]
    fn test_enforce_carries_every_violation() {
        let plain = TempDir::new().unwrap();
        let config = DevConfig::from_toml_str("", "").unwrap();
        let v = validator(FULL_BASELINE, NOT_CI, plain.path());

        let violations = v.get_violations(&config);
        assert!(!violations.is_empty());

        let err = v.enforce_guardrails(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Guardrails violations detected:"));
        for violation in &violations {
            assert!(message.contains(violation.as_str()));
        }
    }
}
