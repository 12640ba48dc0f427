use crate::pkgmgr::Tool;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Table;
use toml::Value;

/// Prefix for environment-variable overrides, e.g. `ARCHDEV_PACKAGE_MANAGER_TOOL`
pub const ENV_PREFIX: &str = "ARCHDEV";

/// Conventional name of the main config file
pub const CONFIG_FILE: &str = "dev-config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unsupported package manager tool: {0}")]
    UnsupportedTool(String),
}

/// A scalar configuration value
///
/// Environment-variable overrides arrive as strings and are coerced in
/// order: boolean literal, integer, float, then plain string.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    /// Coerce a raw environment-variable string
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => return ConfigValue::Bool(true),
            "false" => return ConfigValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return ConfigValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return ConfigValue::Float(f);
        }
        ConfigValue::Str(raw.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn from_toml(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
            Value::Integer(i) => Some(ConfigValue::Int(*i)),
            Value::Float(f) => Some(ConfigValue::Float(*f)),
            Value::String(s) => Some(ConfigValue::Str(s.clone())),
            // Tables, arrays and datetimes are not scalar lookups
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

/// Layered development environment configuration
///
/// Lookup precedence for a dotted key path:
/// environment variable > local override file > main file > caller default.
/// Missing files are never fatal; hard-coded defaults apply instead.
#[derive(Debug, Clone)]
pub struct DevConfig {
    main: Table,
    local: Table,
    tool: Tool,
}

impl DevConfig {
    /// Load configuration from an explicit main file path, or the
    /// conventional `dev-config.toml` in the current directory.
    ///
    /// The local override file lives next to the main file as
    /// `dev-config.local.toml`. Absent files fall back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let main_path = match config_path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(CONFIG_FILE),
        };
        let local_path = main_path.with_extension("local.toml");

        let main = if main_path.exists() {
            Self::read_table(&main_path)?
        } else {
            Self::default_table()
        };
        let local = if local_path.exists() {
            Self::read_table(&local_path)?
        } else {
            Table::new()
        };

        Self::from_tables(main, local)
    }

    /// Build a config from raw TOML layers (used by tests)
    pub fn from_toml_str(main: &str, local: &str) -> Result<Self, ConfigError> {
        let main: Table = toml::from_str(main)?;
        let local: Table = toml::from_str(local)?;
        Self::from_tables(main, local)
    }

    fn from_tables(main: Table, local: Table) -> Result<Self, ConfigError> {
        let mut config = DevConfig {
            main,
            local,
            tool: Tool::Uv,
        };

        // Validate the tool at load time; an unknown name fails fast
        // instead of degrading into silent no-ops later.
        let raw = config.get_str("package_manager.tool", "uv");
        config.tool = raw
            .parse::<Tool>()
            .map_err(|_| ConfigError::UnsupportedTool(raw))?;

        Ok(config)
    }

    fn read_table(path: &Path) -> Result<Table, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Hard-coded defaults used when no main config file exists
    fn default_table() -> Table {
        let text = r#"
            [package_manager]
            tool = "uv"
            venv_path = ".venv"
            python_version = "3.11"

            [filesystem]
            use_git_ops = true
            tmp_base_dir = "/tmp/archdev"
            use_secure_tmp = true

            [docker]
            image = "archdev"
            dockerfile = "Dockerfile"
        "#;
        toml::from_str(text).expect("default config must parse")
    }

    /// Resolve a dotted key path to a value, falling back to `default`
    ///
    /// Never errors: a missing key simply yields the default.
    pub fn get(&self, path: &str, default: ConfigValue) -> ConfigValue {
        if let Some(v) = Self::env_lookup(path) {
            return v;
        }
        if let Some(v) = Self::table_lookup(&self.local, path) {
            return v;
        }
        if let Some(v) = Self::table_lookup(&self.main, path) {
            return v;
        }
        default
    }

    pub fn get_str(&self, path: &str, default: &str) -> String {
        match self.get(path, ConfigValue::from(default)) {
            ConfigValue::Str(s) => s,
            ConfigValue::Bool(b) => b.to_string(),
            ConfigValue::Int(i) => i.to_string(),
            ConfigValue::Float(f) => f.to_string(),
        }
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path, ConfigValue::Bool(default))
            .as_bool()
            .unwrap_or(default)
    }

    /// Environment override: upper-cased path segments joined with
    /// underscores under the `ARCHDEV_` prefix.
    fn env_lookup(path: &str) -> Option<ConfigValue> {
        let key = std::iter::once(ENV_PREFIX)
            .chain(path.split('.'))
            .map(|s| s.to_uppercase())
            .collect::<Vec<_>>()
            .join("_");
        std::env::var(key).ok().map(|raw| ConfigValue::coerce(&raw))
    }

    fn table_lookup(table: &Table, path: &str) -> Option<ConfigValue> {
        let mut segments = path.split('.');
        let mut current: &Value = table.get(segments.next()?)?;

        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }

        ConfigValue::from_toml(current)
    }

    /// The validated package manager tool
    pub fn package_manager(&self) -> Tool {
        self.tool
    }

    /// Path of the virtual environment directory
    pub fn venv_path(&self) -> PathBuf {
        PathBuf::from(self.get_str("package_manager.venv_path", ".venv"))
    }

    /// Target Python version
    pub fn python_version(&self) -> String {
        self.get_str("package_manager.python_version", "3.11")
    }

    /// Whether move/remove operations route through git
    pub fn use_git_ops(&self) -> bool {
        self.get_bool("filesystem.use_git_ops", true)
    }

    /// Base directory for temporary files and directories
    pub fn tmp_base_dir(&self) -> PathBuf {
        PathBuf::from(self.get_str("filesystem.tmp_base_dir", "/tmp/archdev"))
    }

    /// Whether temp resources are created with owner-only permissions
    pub fn use_secure_tmp(&self) -> bool {
        self.get_bool("filesystem.use_secure_tmp", true)
    }

    /// Docker image name
    pub fn docker_image(&self) -> String {
        self.get_str("docker.image", "archdev")
    }

    /// Docker registry to push to, if configured
    pub fn docker_registry(&self) -> Option<String> {
        match self.get("docker.registry", ConfigValue::Str(String::new())) {
            ConfigValue::Str(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Dockerfile path used for builds
    pub fn dockerfile(&self) -> String {
        self.get_str("docker.dockerfile", "Dockerfile")
    }
}
