//! Run orchestration.
//!
//! Each directory entry moves through
//! `fetch → validate + resolve contact → notify` and ends in one
//! [`EntryStatus`]. Entries are processed one at a time and never affect each
//! other; the tally and admin digest live in the [`RunReport`].

use crate::contact::resolve_contact;
use crate::document::SpaceDocument;
use crate::errors::FetchCode;
use crate::fetch::{FetchResult, Fetcher, HttpClient};
use crate::notify::{DigestEntry, Mailer, Notifier, Outcome};
use crate::types::{ContactAddress, DirectoryEntry, EntryStatus, RunTally};
use crate::validate::Validator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Run-fatal failures. Everything else is isolated to its entry.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Space api directory {url} not available ({})", .code.describe().unwrap_or_default())]
    DirectoryUnavailable { url: String, code: FetchCode },

    #[error("Space api directory {url} is malformed: {reason}")]
    DirectoryMalformed { url: String, reason: String },
}

/// Everything learned about one entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub entry: DirectoryEntry,
    pub fetch_code: FetchCode,
    pub issues: Vec<String>,
    pub contact: ContactAddress,
    pub outcome: Outcome,
    pub status: EntryStatus,
}

impl EntryReport {
    /// Entries with at least one issue.
    pub fn is_flagged(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Accumulated result of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub entries: Vec<EntryReport>,
    pub tally: RunTally,
    pub digest: Vec<DigestEntry>,
}

impl RunReport {
    fn record(&mut self, report: EntryReport) {
        if report.fetch_code.is_success() {
            self.tally.record(report.status);
        } else {
            self.tally.record_unreachable();
            if report.status != EntryStatus::FetchFailed {
                self.tally.record(report.status);
            }
        }

        if report.outcome == Outcome::AdminFlagged {
            self.digest.push(DigestEntry {
                name: report.entry.name.clone(),
                address: report.contact.raw.clone(),
                issues: report.issues.clone(),
            });
        }
        self.entries.push(report);
    }
}

pub struct Auditor<C, M> {
    fetcher: Fetcher<C>,
    validator: Validator,
    notifier: Notifier<M>,
    notify_fetch_errors: bool,
}

impl<C: HttpClient, M: Mailer> Auditor<C, M> {
    pub fn new(fetcher: Fetcher<C>, validator: Validator, notifier: Notifier<M>) -> Self {
        Self {
            fetcher,
            validator,
            notifier,
            notify_fetch_errors: false,
        }
    }

    /// Raise the classified fetch error as an issue so it reaches the operator.
    pub fn with_fetch_error_notifications(mut self, enabled: bool) -> Self {
        self.notify_fetch_errors = enabled;
        self
    }

    /// Fetch the directory and list its entries, sorted by name.
    pub fn load_directory(&self, url: &str) -> Result<Vec<DirectoryEntry>, AuditError> {
        let result = self.fetcher.fetch(url, self.fetcher.policy().fallback_timeout);
        let Some(body) = result.body.filter(|_| result.code.is_success()) else {
            return Err(AuditError::DirectoryUnavailable {
                url: url.to_string(),
                code: result.code,
            });
        };
        parse_directory(url, &body)
    }

    /// Audit one entry.
    pub fn audit_entry(&self, entry: &DirectoryEntry, now: DateTime<Utc>) -> EntryReport {
        let fetched = self.fetcher.fetch_with_fallback(&entry.url);
        let (issues, contact) = self.assess(&fetched, now);

        let outcome = self.notifier.notify(entry, &contact, &issues);
        let status = match outcome {
            Outcome::Compliant if !fetched.is_success() => EntryStatus::FetchFailed,
            Outcome::Compliant => EntryStatus::Ok,
            Outcome::Sent => EntryStatus::Sent,
            Outcome::Failed | Outcome::AdminFlagged => EntryStatus::Failed,
        };

        info!(
            entry = %entry.name,
            code = %fetched.code,
            issues = issues.len(),
            status = ?status,
            "Audited entry"
        );

        EntryReport {
            entry: entry.clone(),
            fetch_code: fetched.code,
            issues,
            contact,
            outcome,
            status,
        }
    }

    fn assess(&self, fetched: &FetchResult, now: DateTime<Utc>) -> (Vec<String>, ContactAddress) {
        let mut issues = fetched.advisories.clone();

        let Some(body) = fetched.body.as_ref().filter(|_| fetched.code.is_success()) else {
            if self.notify_fetch_errors
                && let Some(description) = fetched.code.describe()
            {
                issues.push(description);
            } else {
                // Without a document there is nothing to validate and nobody to tell.
                issues.clear();
            }
            return (issues, ContactAddress::default());
        };

        let doc = SpaceDocument::from_value(body);
        issues.extend(self.validator.validate(&doc, fetched.cors_enabled, now));
        (issues, resolve_contact(&doc))
    }

    /// Audit every entry in order, calling `on_entry` after each one.
    pub fn run_with<F>(&self, entries: &[DirectoryEntry], now: DateTime<Utc>, mut on_entry: F) -> RunReport
    where
        F: FnMut(&EntryReport),
    {
        let mut report = RunReport::default();
        for entry in entries {
            let entry_report = self.audit_entry(entry, now);
            on_entry(&entry_report);
            report.record(entry_report);
        }

        info!(
            ok = report.tally.ok,
            failed = report.tally.failed,
            sent = report.tally.sent,
            unreachable = report.tally.unreachable,
            "Audit run complete"
        );
        report
    }

    pub fn run(&self, entries: &[DirectoryEntry], now: DateTime<Utc>) -> RunReport {
        self.run_with(entries, now, |_| {})
    }
}

/// Directory entries from a `{ "name": "url", ... }` object.
///
/// Entries whose value is not a string are skipped.
pub fn parse_directory(url: &str, body: &Value) -> Result<Vec<DirectoryEntry>, AuditError> {
    let Some(map) = body.as_object() else {
        return Err(AuditError::DirectoryMalformed {
            url: url.to_string(),
            reason: "expected a JSON object mapping names to URLs".to_string(),
        });
    };

    let mut entries: Vec<DirectoryEntry> = map
        .iter()
        .filter_map(|(name, value)| match value.as_str() {
            Some(endpoint) => Some(DirectoryEntry::new(name.clone(), endpoint.trim())),
            None => {
                warn!("Skipping directory entry {}: URL is not a string", name);
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("Directory {} lists {} entries", url, entries.len());
    Ok(entries)
}
