use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Isolated home for one CLI invocation: no user config, no inherited overrides.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        path
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_spaceaudit"));
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path())
            .env_remove("RUST_LOG");
        for (key, _) in std::env::vars() {
            if key.starts_with("SPACEAUDIT_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run spaceaudit")
    }
}
