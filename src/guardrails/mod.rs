pub mod baseline;
pub mod validator;

pub use baseline::Baseline;
pub use validator::{EnvProbe, GuardrailsValidator, CONTAINER_ENV_VARS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardrailsError {
    #[error("Failed to read baseline file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse baseline file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Guardrails violations detected:\n{0}")]
    Violations(String),
}
