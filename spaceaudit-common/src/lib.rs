//! Shared pipeline for auditing SpaceAPI endpoints.
//!
//! One directory entry flows through the stages in order:
//!
//! 1. [`fetch`] retrieves the endpoint (HTTPS first, one HTTP fallback hop)
//!    and classifies failures into [`FetchCode`] ranges.
//! 2. [`validate`] turns the parsed [`SpaceDocument`] into issue lines.
//! 3. [`contact`] picks the address the issues should go to.
//! 4. [`notify`] mails the operator or flags the entry for the admin digest.
//!
//! [`audit`] wires the stages together and keeps the run tally.

pub mod audit;
pub mod config;
pub mod contact;
pub mod document;
pub mod errors;
pub mod fetch;
pub mod logging;
pub mod mock;
pub mod notify;
pub mod types;
pub mod util;
pub mod validate;

pub use audit::{AuditError, Auditor, EntryReport, RunReport};
pub use config::{AuditConfig, ConfigError};
pub use contact::{Channel, resolve_contact};
pub use document::SpaceDocument;
pub use errors::{ErrorClass, FetchCode};
pub use fetch::{FetchResult, Fetcher, HttpClient, HttpResponse, TransportFailure, UreqClient};
pub use logging::{LogConfig, init_logging};
pub use notify::{
    DigestEntry, DryRunMailer, MailError, Mailer, MessageTemplate, Notifier, Outcome,
    OutgoingMail, SendmailMailer,
};
pub use types::{ContactAddress, DirectoryEntry, EntryStatus, RunTally};
pub use validate::{ValidationPolicy, Validator};
