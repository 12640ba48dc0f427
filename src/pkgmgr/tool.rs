use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown package manager tool: {0}")]
pub struct ParseToolError(pub String);

/// The closed set of supported Python package managers
///
/// Configuration naming any other tool is rejected at load time; no
/// operation silently no-ops on an unrecognized tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Uv,
    Pip,
    Poetry,
    Pipenv,
}

impl Tool {
    /// All supported tools, in declaration order
    pub const ALL: &'static [Tool] = &[Tool::Uv, Tool::Pip, Tool::Poetry, Tool::Pipenv];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Uv => "uv",
            Tool::Pip => "pip",
            Tool::Poetry => "poetry",
            Tool::Pipenv => "pipenv",
        }
    }
}

impl FromStr for Tool {
    type Err = ParseToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uv" => Ok(Tool::Uv),
            "pip" => Ok(Tool::Pip),
            "poetry" => Ok(Tool::Poetry),
            "pipenv" => Ok(Tool::Pipenv),
            other => Err(ParseToolError(other.to_string())),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
