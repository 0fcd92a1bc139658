//! Common types used across the audit pipeline.

use crate::util::is_valid_email;
use serde::{Deserialize, Serialize};

/// One named endpoint registered in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub url: String,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Best-effort notification address for an entry.
///
/// May be empty or hold a non-email handle; the notifier decides whether it
/// is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactAddress {
    pub raw: String,
}

impl ContactAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_valid_email(&self) -> bool {
        is_valid_email(&self.raw)
    }
}

impl std::fmt::Display for ContactAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Terminal state of one entry's audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Fetched and no issues found.
    Ok,
    /// Issues were mailed to the operator.
    Sent,
    /// Issues could not be delivered (mail failure or unusable address).
    Failed,
    /// Fetch failed and no issues were raised for it.
    FetchFailed,
}

/// Run totals. Reset per invocation, updated once per entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    pub ok: u32,
    pub failed: u32,
    pub sent: u32,
    /// Entries whose fetch failed; not part of the summary line.
    pub unreachable: u32,
}

impl RunTally {
    pub fn record(&mut self, status: EntryStatus) {
        match status {
            EntryStatus::Ok => self.ok += 1,
            EntryStatus::Sent => self.sent += 1,
            EntryStatus::Failed => self.failed += 1,
            EntryStatus::FetchFailed => {}
        }
    }

    pub fn record_unreachable(&mut self) {
        self.unreachable += 1;
    }

    /// The `Checked <ok> Failed <failed> Send <sent>` summary line.
    pub fn summary_line(&self) -> String {
        format!("Checked {} Failed {} Send {}", self.ok, self.failed, self.sent)
    }
}
