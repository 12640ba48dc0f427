pub mod audit;
pub mod ci;
pub mod config;
pub mod docker;
pub mod error;
pub mod exec;
pub mod fsops;
pub mod git;
pub mod guardrails;
pub mod pkgmgr;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigValue, DevConfig};
pub use error::{AppError, AppResult};
pub use fsops::{FileSystemOps, TempWorkspace};
pub use guardrails::{Baseline, EnvProbe, GuardrailsError, GuardrailsValidator};
pub use pkgmgr::{PackageManager, Tool};
