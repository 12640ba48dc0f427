use crate::config::DevConfig;
use crate::exec::Runner;
use crate::pkgmgr::Tool;

/// The fixed lint/test sequence run by `local-ci`
const STEPS: &[(&str, &[&str])] = &[
    ("lint", &["ruff", "check", "."]),
    ("format", &["ruff", "format", "--check", "."]),
    ("tests", &["pytest"]),
];

/// Outcome of one CI step
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: Option<String>,
}

/// Runs the fixed CI sequence through the configured tool's runner
///
/// A failing step is recorded, not fatal; the caller decides the exit
/// code from the aggregate result.
#[derive(Debug)]
pub struct LocalCi {
    tool: Tool,
    runner: Runner,
}

impl LocalCi {
    pub fn new(config: &DevConfig, runner: Runner) -> Self {
        Self {
            tool: config.package_manager(),
            runner,
        }
    }

    /// Command prefix that executes a step inside the tool's environment
    fn runner_prefix(&self) -> &'static [&'static str] {
        match self.tool {
            Tool::Uv => &["uv", "run"],
            Tool::Poetry => &["poetry", "run"],
            Tool::Pipenv => &["pipenv", "run"],
            // pip venvs are activated by the caller; run steps directly
            Tool::Pip => &[],
        }
    }

    fn step_argv<'a>(&self, step_args: &[&'a str]) -> Vec<&'a str> {
        self.runner_prefix()
            .iter()
            .chain(step_args.iter())
            .copied()
            .collect()
    }

    /// Execute every step in order and report each outcome
    pub fn run(&self) -> Vec<StepResult> {
        STEPS
            .iter()
            .map(|(name, args)| {
                let argv = self.step_argv(args);
                match self.runner.run(argv[0], &argv[1..]) {
                    Ok(_) => StepResult {
                        name,
                        passed: true,
                        detail: None,
                    },
                    Err(e) => StepResult {
                        name,
                        passed: false,
                        detail: Some(e.to_string()),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci_for(tool: &str) -> LocalCi {
        let main = format!("[package_manager]\ntool = \"{}\"\n", tool);
        let config = DevConfig::from_toml_str(&main, "").unwrap();
        LocalCi::new(&config, Runner::new("."))
    }

    #[test]
    fn test_runner_prefix_per_tool() {
        assert_eq!(ci_for("uv").runner_prefix(), ["uv", "run"]);
        assert_eq!(ci_for("poetry").runner_prefix(), ["poetry", "run"]);
        assert_eq!(ci_for("pipenv").runner_prefix(), ["pipenv", "run"]);
        assert!(ci_for("pip").runner_prefix().is_empty());
    }

    #[test]
    fn test_step_argv_composition() {
        let argv = ci_for("uv").step_argv(&["pytest"]);
        assert_eq!(argv, ["uv", "run", "pytest"]);

        let argv = ci_for("pip").step_argv(&["pytest"]);
        assert_eq!(argv, ["pytest"]);
    }

    #[test]
    fn test_step_argv_not_tied_to_runner_lifetime() {
        let args = ["pytest"];
        let argv = {
            let ci = ci_for("uv");
            ci.step_argv(&args)
        };
        assert_eq!(argv, ["uv", "run", "pytest"]);
    }

    #[test]
    fn test_fixed_step_order() {
        let names: Vec<&str> = STEPS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["lint", "format", "tests"]);
    }
}
