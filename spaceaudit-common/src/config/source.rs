//! Source tracking for configuration values.

use serde::Serialize;
use std::fmt;

/// Where a configuration value came from.
///
/// Values loaded from the TOML file arrive as the parser's default, so a
/// value is either left as loaded or overridden by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default or the value from the config file.
    Default,
    /// A `SPACEAUDIT_*` variable.
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// A value plus the source it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
    /// Environment variable name, for values read from the environment.
    pub env_var: Option<String>,
}

impl<T> Sourced<T> {
    /// A value the environment did not touch.
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
            env_var: None,
        }
    }

    /// A value successfully read from the environment variable `var`.
    pub fn from_env(value: T, var: impl Into<String>) -> Self {
        Self {
            value,
            source: ConfigSource::Environment,
            env_var: Some(var.into()),
        }
    }

    pub fn is_from_env(&self) -> bool {
        self.source == ConfigSource::Environment
    }
}
