use archdev::audit::AuditLogger;
use archdev::ci::LocalCi;
use archdev::config::DevConfig;
use archdev::docker::DockerOps;
use archdev::error::AppResult;
use archdev::exec::Runner;
use archdev::fsops::{FileSystemOps, TempWorkspace};
use archdev::guardrails::GuardrailsValidator;
use archdev::pkgmgr::PackageManager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "archdev",
    about = "Development environment manager: package managers, git-aware filesystem ops, guardrails",
    version
)]
struct Cli {
    /// Path to dev-config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the guardrails baseline file
    #[arg(long, global = true)]
    baseline: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set up the development environment
    Setup,

    /// Stage files for commit using git
    Stage { files: Vec<PathBuf> },

    /// Commit staged changes
    Commit { message: String },

    /// Create a secure temporary directory
    TempDir {
        /// Prefix for the directory name
        #[arg(long, default_value = "archdev-")]
        prefix: String,
    },

    /// Create a secure temporary file
    TempFile {
        /// File suffix
        #[arg(long, default_value = "")]
        suffix: String,

        /// File prefix
        #[arg(long, default_value = "archdev-")]
        prefix: String,
    },

    /// Clean up temporary files and directories
    CleanTemp,

    /// Check compliance with the guardrails baseline
    CheckGuardrails,

    /// Enforce guardrails compliance (exits non-zero on violations)
    EnforceGuardrails,

    /// Run the local lint/test sequence
    LocalCi,

    /// Docker image lifecycle
    Docker {
        #[command(subcommand)]
        action: DockerAction,
    },
}

#[derive(Subcommand, Debug)]
enum DockerAction {
    /// Build the configured image
    Build,
    /// Tag and push the image to the configured registry
    Push,
    /// Show local images matching the configured name
    Status,
    /// Remove the local image
    Clean,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<ExitCode> {
    // Components are constructed once and passed by reference into the
    // command handlers.
    let config = DevConfig::load(cli.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    let runner = match AuditLogger::new() {
        Ok(logger) => Runner::with_logger(&cwd, logger),
        Err(_) => Runner::new(&cwd),
    };

    match cli.command {
        Command::Setup => cmd_setup(&config, runner),
        Command::Stage { files } => cmd_stage(&config, runner, files),
        Command::Commit { message } => cmd_commit(&config, runner, &message),
        Command::TempDir { prefix } => cmd_temp_dir(&config, &prefix),
        Command::TempFile { suffix, prefix } => cmd_temp_file(&config, &suffix, &prefix),
        Command::CleanTemp => cmd_clean_temp(&config),
        Command::CheckGuardrails => cmd_check_guardrails(&config, cli.baseline.as_deref()),
        Command::EnforceGuardrails => cmd_enforce_guardrails(&config, cli.baseline.as_deref()),
        Command::LocalCi => cmd_local_ci(&config, runner),
        Command::Docker { action } => cmd_docker(&config, runner, action),
    }
}

fn cmd_setup(config: &DevConfig, runner: Runner) -> AppResult<ExitCode> {
    println!(
        "Setting up development environment with {}...",
        config.package_manager()
    );

    let pkg = PackageManager::new(config, runner);
    pkg.install_tool()?;

    let venv = pkg.create_venv()?;
    println!("Created virtual environment at {}", venv.display());

    pkg.install_dependencies(true)?;
    println!("Installed dependencies");

    if config.use_secure_tmp() {
        let temp = TempWorkspace::new(config)?;
        let dir = temp.create_dir("dev-setup-")?;
        println!("Created secure temp directory at {}", dir.display());
    }

    println!("Development environment setup complete!");
    println!("Activate with: {}", pkg.activate_command());
    Ok(ExitCode::SUCCESS)
}

fn cmd_stage(config: &DevConfig, runner: Runner, files: Vec<PathBuf>) -> AppResult<ExitCode> {
    if files.is_empty() {
        println!("No files specified");
        return Ok(ExitCode::SUCCESS);
    }

    let fs_ops = FileSystemOps::new(config, runner);
    fs_ops.stage_files(&files)?;
    println!("Staged {} files", files.len());
    Ok(ExitCode::SUCCESS)
}

fn cmd_commit(config: &DevConfig, runner: Runner, message: &str) -> AppResult<ExitCode> {
    let fs_ops = FileSystemOps::new(config, runner);
    fs_ops.commit_changes(message)?;
    println!("Changes committed");
    Ok(ExitCode::SUCCESS)
}

fn cmd_temp_dir(config: &DevConfig, prefix: &str) -> AppResult<ExitCode> {
    let temp = TempWorkspace::new(config)?;
    let dir = temp.create_dir(prefix)?;
    println!("Created temporary directory: {}", dir.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_temp_file(config: &DevConfig, suffix: &str, prefix: &str) -> AppResult<ExitCode> {
    let temp = TempWorkspace::new(config)?;
    let file = temp.create_file(suffix, prefix)?;
    println!("Created temporary file: {}", file.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_clean_temp(config: &DevConfig) -> AppResult<ExitCode> {
    let temp = TempWorkspace::new(config)?;
    temp.clean_all()?;
    println!("Cleaned temporary files");
    Ok(ExitCode::SUCCESS)
}

fn cmd_check_guardrails(config: &DevConfig, baseline: Option<&std::path::Path>) -> AppResult<ExitCode> {
    let validator = GuardrailsValidator::new(baseline)?;

    println!("Guardrails Compliance Check:");
    for (check, passed) in validator.check_compliance(config) {
        let status = if passed { "✓" } else { "✗" };
        println!("  {} {}", status, title_case(check));
    }

    let violations = validator.get_violations(config);
    if violations.is_empty() {
        println!("\nAll guardrails compliant!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\nViolations found:");
        for violation in &violations {
            println!("  - {}", violation);
        }
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_enforce_guardrails(
    config: &DevConfig,
    baseline: Option<&std::path::Path>,
) -> AppResult<ExitCode> {
    let validator = GuardrailsValidator::new(baseline)?;

    match validator.enforce_guardrails(config) {
        Ok(()) => {
            println!("Guardrails compliance confirmed!");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Guardrails enforcement failed:\n{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_local_ci(config: &DevConfig, runner: Runner) -> AppResult<ExitCode> {
    let ci = LocalCi::new(config, runner);

    let mut all_passed = true;
    for result in ci.run() {
        let status = if result.passed { "✓" } else { "✗" };
        println!("  {} {}", status, result.name);
        if !result.passed {
            all_passed = false;
        }
        if let Some(detail) = result.detail {
            println!("      {}", detail);
        }
    }

    if all_passed {
        println!("Local CI passed");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Local CI failed");
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_docker(config: &DevConfig, runner: Runner, action: DockerAction) -> AppResult<ExitCode> {
    let docker = DockerOps::new(config, runner);

    match action {
        DockerAction::Build => {
            docker.build()?;
            println!("Built image {}", docker.image());
        }
        DockerAction::Push => {
            docker.push()?;
            println!("Pushed {}", docker.remote_tag()?);
        }
        DockerAction::Status => {
            print!("{}", docker.status()?);
        }
        DockerAction::Clean => {
            docker.clean()?;
            println!("Removed image {}", docker.image());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// "package_manager_supported" -> "Package Manager Supported"
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
