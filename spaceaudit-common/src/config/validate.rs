//! Startup validation of a loaded configuration.

use super::AuditConfig;
use crate::util::is_valid_email;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    pub severity: Severity,
    /// Dotted key, e.g. `fetch.secure_timeout_secs`.
    pub key: String,
    pub message: String,
}

impl ConfigWarning {
    fn error(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            key: key.to_string(),
            message: message.into(),
        }
    }

    fn warning(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.key, self.message)
    }
}

/// Check a configuration for values the audit cannot run with.
pub fn validate_config(config: &AuditConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let url = config.directory.url.to_ascii_lowercase();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        warnings.push(ConfigWarning::error(
            "directory.url",
            format!("must be an http(s) URL, got '{}'", config.directory.url),
        ));
    }

    if config.fetch.secure_timeout_secs == 0 {
        warnings.push(ConfigWarning::error("fetch.secure_timeout_secs", "must be at least 1"));
    }
    if config.fetch.fallback_timeout_secs == 0 {
        warnings.push(ConfigWarning::error("fetch.fallback_timeout_secs", "must be at least 1"));
    }
    if config.fetch.secure_timeout_secs > config.fetch.fallback_timeout_secs {
        warnings.push(ConfigWarning::warning(
            "fetch.secure_timeout_secs",
            "is longer than the fallback timeout; the HTTPS probe is meant to be the short one",
        ));
    }

    if config.validation.staleness_months == 0 {
        warnings.push(ConfigWarning::error("validation.staleness_months", "must be at least 1"));
    }
    if !config.validation.min_api_version.is_finite() || config.validation.min_api_version <= 0.0 {
        warnings.push(ConfigWarning::warning(
            "validation.min_api_version",
            "is not positive; no document will be asked to upgrade",
        ));
    }

    if !is_valid_email(&config.notify.sender) {
        warnings.push(ConfigWarning::error(
            "notify.sender",
            format!("'{}' is not a valid email address", config.notify.sender),
        ));
    }
    if !is_valid_email(&config.notify.reply_to) {
        warnings.push(ConfigWarning::error(
            "notify.reply_to",
            format!("'{}' is not a valid email address", config.notify.reply_to),
        ));
    }

    warnings
}
