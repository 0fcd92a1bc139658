//! Configuration for an audit run.
//!
//! Layers, lowest precedence first:
//! - built-in defaults
//! - a TOML file (`--config`, else `~/.config/spaceaudit/config.toml` if present)
//! - `SPACEAUDIT_*` environment variables
//! - command-line flags (applied by the binary)
//!
//! The merged result is checked with [`validate_config`].

pub mod env;
pub mod file;
pub mod source;
pub mod validate;

pub use env::{EnvError, EnvParser};
pub use file::{
    AuditConfig, ConfigError, DirectoryConfig, EnvOverrides, FetchConfig, LogSettings, NotifyConfig,
    ValidationConfig, default_config_path,
};
pub use source::{ConfigSource, Sourced};
pub use validate::{ConfigWarning, Severity, validate_config};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
