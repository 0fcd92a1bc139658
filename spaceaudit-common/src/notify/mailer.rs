//! Outbound mail transports.

use crate::util::single_line;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SENDMAIL_PATH: &str = "/usr/sbin/sendmail";

/// A composed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Extra headers such as `From` and `Reply-To`, in order.
    pub headers: Vec<(String, String)>,
}

impl OutgoingMail {
    /// RFC 5322 rendering with CRLF line endings.
    ///
    /// Header values never span lines: a value containing CR, LF or other
    /// control characters has them replaced with spaces, so no value can
    /// start a header of its own.
    pub fn to_rfc5322(&self) -> String {
        let mut message = String::new();
        for (name, value) in &self.headers {
            push_header(&mut message, name, value);
        }
        push_header(&mut message, "To", &self.to);
        push_header(&mut message, "Subject", &self.subject);
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("\r\n");
        message.push_str(&self.body.replace("\r\n", "\n").replace('\n', "\r\n"));
        message.push_str("\r\n");
        message
    }
}

fn push_header(message: &mut String, name: &str, value: &str) {
    message.push_str(&single_line(name));
    message.push_str(": ");
    message.push_str(&single_line(value));
    message.push_str("\r\n");
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to start mail transport {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to hand message to mail transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("mail transport rejected message for {recipient}: {status}")]
    Rejected { recipient: String, status: String },
}

/// Transport seam for outgoing mail.
pub trait Mailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

impl<T: Mailer + ?Sized> Mailer for &T {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        (**self).send(mail)
    }
}

/// Hands messages to a local `sendmail`-compatible binary.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SendmailMailer {
    fn default() -> Self {
        Self::new(DEFAULT_SENDMAIL_PATH)
    }
}

impl Mailer for SendmailMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        debug!("Piping message for {} to {}", mail.to, self.program.display());

        // -t: recipients from headers, -i: a lone "." does not end the message.
        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MailError::Spawn {
                path: self.program.clone(),
                source,
            })?;

        // The child is always reaped: a transport that exits early breaks
        // the pipe, and its exit status is the more useful error.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(mail.to_rfc5322().as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MailError::Rejected {
                recipient: mail.to.clone(),
                status: format!("{} {}", output.status, stderr.trim()),
            });
        }
        written?;
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunMailer;

impl Mailer for DryRunMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "Dry run, not sending mail");
        debug!("{}", mail.body);
        Ok(())
    }
}
