pub mod settings;

pub use settings::{ConfigError, ConfigValue, DevConfig, CONFIG_FILE, ENV_PREFIX};
