//! Environment variable parsing with type safety.
//!
//! Every variable carries the `SPACEAUDIT_` prefix. Errors are collected
//! rather than returned so a misconfigured environment is reported in one go.

use super::source::Sourced;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every variable the parser reads.
pub const ENV_PREFIX: &str = "SPACEAUDIT_";

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    #[error("Value out of range for {var}: {value} (valid: {min}..={max})")]
    OutOfRange {
        var: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Type-safe environment variable parser with error collection.
///
/// Each getter returns a [`Sourced`] value. A variable that is unset or
/// fails to parse yields the caller's default with
/// [`ConfigSource::Default`](super::ConfigSource::Default) and, in the
/// failure case, records an [`EnvError`].
pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a parser for `SPACEAUDIT_*` variables.
    pub fn new() -> Self {
        Self {
            prefix: ENV_PREFIX,
            errors: Vec::new(),
        }
    }

    /// Errors collected so far.
    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    /// Check if any errors were collected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drain the collected errors.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Get a boolean value with default.
    ///
    /// Accepts: 1, true, yes, on (for true)
    ///          0, false, no, off, "" (for false)
    pub fn get_bool(&mut self, name: &str, default: bool) -> Sourced<bool> {
        let var_name = self.var_name(name);
        let Ok(value) = env::var(&var_name) else {
            return Sourced::default_value(default);
        };

        match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Sourced::from_env(true, var_name),
            "0" | "false" | "no" | "off" | "" => Sourced::from_env(false, var_name),
            _ => {
                self.errors.push(EnvError::InvalidValue {
                    var: var_name,
                    expected: "boolean (true/false/1/0/yes/no)".to_string(),
                    value,
                });
                Sourced::default_value(default)
            }
        }
    }

    /// Get a `u32` within `min..=max`.
    pub fn get_u32_range(&mut self, name: &str, default: u32, min: u32, max: u32) -> Sourced<u32> {
        self.get_range(name, default, min, max, "unsigned 32-bit integer")
    }

    /// Get a `u64` within `min..=max`.
    pub fn get_u64_range(&mut self, name: &str, default: u64, min: u64, max: u64) -> Sourced<u64> {
        self.get_range(name, default, min, max, "unsigned 64-bit integer")
    }

    /// Get an `f64` within `min..=max`. `NaN` never passes the range check.
    pub fn get_f64_range(&mut self, name: &str, default: f64, min: f64, max: f64) -> Sourced<f64> {
        self.get_range(name, default, min, max, "floating-point number")
    }

    fn get_range<T>(&mut self, name: &str, default: T, min: T, max: T, expected: &str) -> Sourced<T>
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        let var_name = self.var_name(name);
        let Ok(value) = env::var(&var_name) else {
            return Sourced::default_value(default);
        };

        match value.trim().parse::<T>() {
            Ok(n) if n >= min && n <= max => Sourced::from_env(n, var_name),
            Ok(n) => {
                self.errors.push(EnvError::OutOfRange {
                    var: var_name,
                    value: n.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
                Sourced::default_value(default)
            }
            Err(_) => {
                self.errors.push(EnvError::InvalidValue {
                    var: var_name,
                    expected: expected.to_string(),
                    value,
                });
                Sourced::default_value(default)
            }
        }
    }

    /// Get a log level value with validation.
    ///
    /// Accepts trace, debug, info, warn, error and off, case-insensitively;
    /// the result is lowercased.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, var_name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: var_name,
                            value: value.clone(),
                        });
                        Sourced::default_value(default.to_string())
                    }
                }
            }
            Err(_) => Sourced::default_value(default.to_string()),
        }
    }

    /// Get an optional string (None if not set or empty).
    pub fn get_optional_string(&mut self, name: &str) -> Sourced<Option<String>> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) if value.trim().is_empty() => Sourced::from_env(None, var_name),
            Ok(value) => Sourced::from_env(Some(value.trim().to_string()), var_name),
            Err(_) => Sourced::default_value(None),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}
