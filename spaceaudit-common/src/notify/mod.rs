//! Operator notification.
//!
//! An entry with issues is either mailed to its resolved contact or, when
//! that address is not a usable email, handed back as a [`DigestEntry`] for
//! the administrator.

mod mailer;

pub use mailer::{
    DEFAULT_SENDMAIL_PATH, DryRunMailer, MailError, Mailer, OutgoingMail, SendmailMailer,
};

use crate::types::{ContactAddress, DirectoryEntry};
use crate::util::single_line;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

pub const DEFAULT_SENDER: &str = "spaceapi@mapall.space";
pub const DEFAULT_SIGNATURE: &str = "Dave";
pub const DEFAULT_VALIDATOR_URL: &str = "https://spaceapi.io/validator/";

/// Fixed parts of the operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub sender: String,
    pub reply_to: String,
    pub signature: String,
    pub validator_url: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            sender: DEFAULT_SENDER.to_string(),
            reply_to: DEFAULT_SENDER.to_string(),
            signature: DEFAULT_SIGNATURE.to_string(),
            validator_url: DEFAULT_VALIDATOR_URL.to_string(),
        }
    }
}

impl MessageTemplate {
    /// Entry names come from the directory feed, so they are forced onto one line.
    pub fn subject(&self, entry_name: &str) -> String {
        format!("Your {} spaceapi", single_line(entry_name))
    }

    pub fn body(&self, url: &str, issues: &[String]) -> String {
        let mut body = format!(
            "Dear Maker/Hacker,\r\n\r\n\
             We (volunteers of spaceapi.io) found some issues with your spaceapi url/json on {url}.\r\n\r\n\
             We found the following issues:\r\n"
        );
        for issue in issues {
            body.push_str(&format!("- {issue}\r\n"));
        }
        body.push_str(&format!(
            "\r\nPlease fix these issues so that other sites can enjoy your live data. \
             To check your spaceapi manually you can use the online validator ( {} ).\r\n\r\n\
             Regards,\r\n\r\n{}",
            self.validator_url, self.signature
        ));
        body
    }

    pub fn compose(&self, entry: &DirectoryEntry, to: &str, issues: &[String]) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: self.subject(&entry.name),
            body: self.body(&entry.url, issues),
            headers: vec![
                ("From".to_string(), self.sender.clone()),
                ("Reply-To".to_string(), self.reply_to.clone()),
            ],
        }
    }
}

/// What happened to an entry's issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No issues, nothing sent.
    Compliant,
    Sent,
    /// Transmission failed.
    Failed,
    /// Address unusable; goes to the administrator digest.
    AdminFlagged,
}

/// One case the administrator has to follow up by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    pub name: String,
    /// Address as resolved, possibly empty or a handle.
    pub address: String,
    pub issues: Vec<String>,
}

impl fmt::Display for DigestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Email: {}", self.name, self.address)?;
        for issue in &self.issues {
            writeln!(f, "- {issue}")?;
        }
        writeln!(f, "******")
    }
}

pub struct Notifier<M> {
    mailer: M,
    template: MessageTemplate,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M, template: MessageTemplate) -> Self {
        Self { mailer, template }
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn notify(&self, entry: &DirectoryEntry, address: &ContactAddress, issues: &[String]) -> Outcome {
        if issues.is_empty() {
            return Outcome::Compliant;
        }

        if !address.is_valid_email() {
            warn!(
                "Email '{}' not valid for {}, flagging for admin ({} issues)",
                address,
                entry.name,
                issues.len()
            );
            return Outcome::AdminFlagged;
        }

        let mail = self.template.compose(entry, address.as_str(), issues);
        match self.mailer.send(&mail) {
            Ok(()) => {
                info!("Sent {} issues to {} for {}", issues.len(), address, entry.name);
                Outcome::Sent
            }
            Err(err) => {
                warn!(
                    "Sending mail to {} failed: {}; issues: {}",
                    entry.name,
                    err,
                    issues.join(" | ")
                );
                Outcome::Failed
            }
        }
    }
}
