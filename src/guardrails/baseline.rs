use crate::guardrails::GuardrailsError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Declarative compliance baseline, loaded once and read-only
///
/// Three tables: `tool_configuration` enumerates supported package
/// managers, `compliance_checks` toggles individual checks (default
/// enabled when unspecified), and `baseline_requirements` maps each
/// requirement to its expected mode literal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    pub tool_configuration: toml::Table,

    #[serde(default)]
    pub compliance_checks: BTreeMap<String, bool>,

    #[serde(default)]
    pub baseline_requirements: BTreeMap<String, String>,
}

impl Baseline {
    /// Load from a baseline file; a missing file yields an empty baseline
    pub fn load(path: &Path) -> Result<Self, GuardrailsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, GuardrailsError> {
        Ok(toml::from_str(contents)?)
    }

    /// Whether a package manager appears in the tool table
    pub fn supports_tool(&self, tool: &str) -> bool {
        self.tool_configuration.contains_key(tool)
    }

    /// Whether a compliance check toggle is on (default: on)
    pub fn check_enabled(&self, name: &str) -> bool {
        self.compliance_checks.get(name).copied().unwrap_or(true)
    }

    /// Expected mode literal for a baseline requirement, if declared
    pub fn requirement(&self, name: &str) -> Option<&str> {
        self.baseline_requirements.get(name).map(String::as_str)
    }
}
