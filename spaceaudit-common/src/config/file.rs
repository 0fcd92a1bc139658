//! The configuration document and its loading.

use super::env::{EnvError, EnvParser};
use super::source::Sourced;
use crate::fetch::FetchPolicy;
use crate::logging::LogConfig;
use crate::notify::{
    DEFAULT_SENDER, DEFAULT_SENDMAIL_PATH, DEFAULT_SIGNATURE, DEFAULT_VALIDATOR_URL,
    MessageTemplate,
};
use crate::validate::{DEFAULT_MIN_API_VERSION, DEFAULT_STALENESS_MONTHS, ValidationPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_DIRECTORY_URL: &str =
    "https://raw.githubusercontent.com/SpaceApi/directory/master/directory.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub url: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DIRECTORY_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for the HTTPS probe of `http://` endpoints.
    pub secure_timeout_secs: u64,
    /// Timeout for plain fetches and the directory.
    pub fallback_timeout_secs: u64,
    /// Tell operators when the HTTPS probe failed.
    pub advise_https_failure: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            secure_timeout_secs: 10,
            fallback_timeout_secs: 20,
            advise_https_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_api_version: f64,
    pub staleness_months: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_api_version: DEFAULT_MIN_API_VERSION,
            staleness_months: DEFAULT_STALENESS_MONTHS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Compose messages but only log them.
    pub dry_run: bool,
    /// Turn fetch failures into operator issues.
    pub notify_fetch_errors: bool,
    pub sender: String,
    pub reply_to: String,
    pub signature: String,
    pub validator_url: String,
    pub sendmail_path: PathBuf,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            notify_fetch_errors: false,
            sender: DEFAULT_SENDER.to_string(),
            reply_to: DEFAULT_SENDER.to_string(),
            signature: DEFAULT_SIGNATURE.to_string(),
            validator_url: DEFAULT_VALIDATOR_URL.to_string(),
            sendmail_path: PathBuf::from(DEFAULT_SENDMAIL_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub directory: DirectoryConfig,
    pub fetch: FetchConfig,
    pub validation: ValidationConfig,
    pub notify: NotifyConfig,
    pub log: LogSettings,
}

/// What [`AuditConfig::apply_env`] changed.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    /// Variables whose value replaced the loaded one, in application order.
    pub applied: Vec<String>,
    /// Variables that were set but rejected.
    pub errors: Vec<EnvError>,
}

impl EnvOverrides {
    fn take<T>(&mut self, sourced: Sourced<T>) -> T {
        if sourced.is_from_env()
            && let Some(var) = sourced.env_var
        {
            self.applied.push(var);
        }
        sourced.value
    }
}

/// `<config dir>/spaceaudit/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spaceaudit").join("config.toml"))
}

impl AuditConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from `explicit`, or from the default path when it exists, or
    /// fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply `SPACEAUDIT_*` overrides.
    ///
    /// Variables that fail to parse leave the loaded value in place and are
    /// reported in [`EnvOverrides::errors`].
    pub fn apply_env(&mut self) -> EnvOverrides {
        let mut parser = EnvParser::new();
        let mut overrides = EnvOverrides::default();

        if let Some(url) = overrides.take(parser.get_optional_string("DIRECTORY_URL")) {
            self.directory.url = url;
        }
        self.fetch.secure_timeout_secs = overrides.take(parser.get_u64_range(
            "SECURE_TIMEOUT_SECS",
            self.fetch.secure_timeout_secs,
            1,
            300,
        ));
        self.fetch.fallback_timeout_secs = overrides.take(parser.get_u64_range(
            "FALLBACK_TIMEOUT_SECS",
            self.fetch.fallback_timeout_secs,
            1,
            600,
        ));
        self.validation.min_api_version = overrides.take(parser.get_f64_range(
            "MIN_API_VERSION",
            self.validation.min_api_version,
            0.0,
            1000.0,
        ));
        self.validation.staleness_months = overrides.take(parser.get_u32_range(
            "STALENESS_MONTHS",
            self.validation.staleness_months,
            1,
            120,
        ));
        self.notify.dry_run = overrides.take(parser.get_bool("DRY_RUN", self.notify.dry_run));
        self.notify.notify_fetch_errors = overrides.take(
            parser.get_bool("NOTIFY_FETCH_ERRORS", self.notify.notify_fetch_errors),
        );
        if let Some(path) = overrides.take(parser.get_optional_string("SENDMAIL_PATH")) {
            self.notify.sendmail_path = PathBuf::from(path);
        }
        self.log.level = overrides.take(parser.get_log_level("LOG_LEVEL", &self.log.level));

        overrides.errors = parser.take_errors();
        overrides
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            secure_timeout: Duration::from_secs(self.fetch.secure_timeout_secs),
            fallback_timeout: Duration::from_secs(self.fetch.fallback_timeout_secs),
            advise_https_failure: self.fetch.advise_https_failure,
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            min_api_version: self.validation.min_api_version,
            staleness_months: self.validation.staleness_months,
        }
    }

    pub fn message_template(&self) -> MessageTemplate {
        MessageTemplate {
            sender: self.notify.sender.clone(),
            reply_to: self.notify.reply_to.clone(),
            signature: self.notify.signature.clone(),
            validator_url: self.notify.validator_url.clone(),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(&self.log.level)
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::env_test_lock;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.directory.url, DEFAULT_DIRECTORY_URL);
        assert_eq!(config.fetch_policy().secure_timeout, Duration::from_secs(10));
        assert_eq!(config.fetch_policy().fallback_timeout, Duration::from_secs(20));
        assert_eq!(config.validation_policy(), ValidationPolicy::default());
        assert_eq!(config.message_template(), MessageTemplate::default());
        assert!(!config.notify.dry_run);
        assert!(!config.notify.notify_fetch_errors);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[validation]
staleness_months = 6

[notify]
dry_run = true
signature = "The audit team"
"#,
        )
        .unwrap();

        let config = AuditConfig::load(Some(&path)).unwrap();
        assert_eq!(config.validation.staleness_months, 6);
        assert_eq!(config.validation.min_api_version, DEFAULT_MIN_API_VERSION);
        assert!(config.notify.dry_run);
        assert_eq!(config.notify.signature, "The audit team");
        assert_eq!(config.notify.sender, DEFAULT_SENDER);
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = AuditConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch\nsecure_timeout_secs = ").unwrap();

        let err = AuditConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch]\nsecure_timeout_secs = \"ten\"\n").unwrap();

        assert!(matches!(
            AuditConfig::load(Some(&path)).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = env_test_lock();
        let vars = [
            ("SPACEAUDIT_DIRECTORY_URL", "https://mirror.example/directory.json"),
            ("SPACEAUDIT_SECURE_TIMEOUT_SECS", "3"),
            ("SPACEAUDIT_STALENESS_MONTHS", "12"),
            ("SPACEAUDIT_DRY_RUN", "yes"),
            ("SPACEAUDIT_LOG_LEVEL", "warn"),
        ];
        for (key, value) in vars {
            // SAFETY: env access is serialized by env_test_lock
            unsafe { std::env::set_var(key, value) };
        }

        let mut config = AuditConfig::default();
        let overrides = config.apply_env();

        for (key, _) in vars {
            // SAFETY: env access is serialized by env_test_lock
            unsafe { std::env::remove_var(key) };
        }

        assert!(overrides.errors.is_empty(), "{:?}", overrides.errors);
        assert_eq!(
            overrides.applied,
            vec![
                "SPACEAUDIT_DIRECTORY_URL",
                "SPACEAUDIT_SECURE_TIMEOUT_SECS",
                "SPACEAUDIT_STALENESS_MONTHS",
                "SPACEAUDIT_DRY_RUN",
                "SPACEAUDIT_LOG_LEVEL",
            ]
        );
        assert_eq!(config.directory.url, "https://mirror.example/directory.json");
        assert_eq!(config.fetch.secure_timeout_secs, 3);
        assert_eq!(config.fetch.fallback_timeout_secs, 20);
        assert_eq!(config.validation.staleness_months, 12);
        assert!(config.notify.dry_run);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_env_errors_are_collected() {
        let _guard = env_test_lock();
        // SAFETY: env access is serialized by env_test_lock
        unsafe {
            std::env::set_var("SPACEAUDIT_FALLBACK_TIMEOUT_SECS", "forever");
            std::env::set_var("SPACEAUDIT_STALENESS_MONTHS", "0");
        }

        let mut config = AuditConfig::default();
        let overrides = config.apply_env();

        // SAFETY: env access is serialized by env_test_lock
        unsafe {
            std::env::remove_var("SPACEAUDIT_FALLBACK_TIMEOUT_SECS");
            std::env::remove_var("SPACEAUDIT_STALENESS_MONTHS");
        }

        assert_eq!(overrides.errors.len(), 2);
        assert!(overrides.applied.is_empty(), "{:?}", overrides.applied);
        assert_eq!(config.fetch.fallback_timeout_secs, 20);
        assert_eq!(config.validation.staleness_months, DEFAULT_STALENESS_MONTHS);
    }
}
