//! Contact resolution: which address should receive an entry's issues.
//!
//! Cascade, later steps overriding earlier ones:
//!
//! 1. `contact.email`
//! 2. the field named by the first `issue_report_channels` item
//! 3. otherwise `contact.issue_mail`, if present
//!
//! The result is not validated here; see [`crate::notify`].

use crate::document::SpaceDocument;
use crate::types::ContactAddress;
use crate::util::{decode_base64_text, is_valid_email};
use tracing::{debug, warn};

/// A preferred issue-report channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    IssueMail,
    MailingList,
    Email,
    Twitter,
    Unrecognized(String),
}

impl Channel {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "issue_mail" => Self::IssueMail,
            "ml" => Self::MailingList,
            "email" => Self::Email,
            "twitter" => Self::Twitter,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Resolve the notification address for a document.
///
/// A selected channel whose field is missing resolves to an empty address.
/// An unrecognized channel keeps the `contact.email` default.
pub fn resolve_contact(doc: &SpaceDocument) -> ContactAddress {
    let contact = &doc.contact;
    let mut address = contact.email.clone().unwrap_or_default();

    let first_channel = doc
        .issue_report_channels
        .as_ref()
        .and_then(|channels| channels.first());

    match first_channel.map(|raw| Channel::parse(raw)) {
        Some(Channel::IssueMail) => {
            address = contact.issue_mail.as_deref().map(decode_issue_mail).unwrap_or_default();
        }
        Some(Channel::MailingList) => address = contact.ml.clone().unwrap_or_default(),
        Some(Channel::Email) => address = contact.email.clone().unwrap_or_default(),
        Some(Channel::Twitter) => {
            debug!("Issue report channel is twitter");
            address = contact.twitter.clone().unwrap_or_default();
        }
        Some(Channel::Unrecognized(raw)) => {
            warn!("Unrecognized issue report channel '{}', keeping contact email", raw);
        }
        None => {
            if let Some(issue_mail) = &contact.issue_mail {
                address = issue_mail.clone();
            }
        }
    }

    ContactAddress::new(address)
}

/// `issue_mail` is often published base64-encoded to dodge scrapers.
fn decode_issue_mail(raw: &str) -> String {
    if is_valid_email(raw) {
        return raw.to_string();
    }
    decode_base64_text(raw).unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: serde_json::Value) -> String {
        resolve_contact(&SpaceDocument::from_value(&value)).raw
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(Channel::parse("issue_mail"), Channel::IssueMail);
        assert_eq!(Channel::parse("ml"), Channel::MailingList);
        assert_eq!(Channel::parse("email"), Channel::Email);
        assert_eq!(Channel::parse("twitter"), Channel::Twitter);
        assert_eq!(Channel::parse("matrix"), Channel::Unrecognized("matrix".into()));
    }

    #[test]
    fn test_default_is_contact_email() {
        assert_eq!(resolve(json!({ "contact": { "email": "info@example.org" } })), "info@example.org");
    }

    #[test]
    fn test_no_contact_is_empty() {
        assert_eq!(resolve(json!({})), "");
    }

    #[test]
    fn test_mailing_list_channel_overrides_email() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "ml": "list@example.org" },
            "issue_report_channels": ["ml"]
        }));
        assert_eq!(address, "list@example.org");
    }

    #[test]
    fn test_only_first_channel_counts() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "ml": "list@example.org" },
            "issue_report_channels": ["email", "ml"]
        }));
        assert_eq!(address, "info@example.org");
    }

    #[test]
    fn test_issue_mail_channel_plain() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "issue_mail": "issues@example.org" },
            "issue_report_channels": ["issue_mail"]
        }));
        assert_eq!(address, "issues@example.org");
    }

    #[test]
    fn test_issue_mail_channel_base64() {
        let address = resolve(json!({
            "contact": { "issue_mail": "aXNzdWVzQGV4YW1wbGUub3Jn" },
            "issue_report_channels": ["issue_mail"]
        }));
        assert_eq!(address, "issues@example.org");
    }

    #[test]
    fn test_issue_mail_decoded_even_if_still_invalid() {
        // "not-an-email"
        let address = resolve(json!({
            "contact": { "issue_mail": "bm90LWFuLWVtYWls" },
            "issue_report_channels": ["issue_mail"]
        }));
        assert_eq!(address, "not-an-email");
        assert!(!is_valid_email(&address));
    }

    #[test]
    fn test_issue_mail_channel_without_field_is_empty() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org" },
            "issue_report_channels": ["issue_mail"]
        }));
        assert_eq!(address, "");
    }

    #[test]
    fn test_twitter_channel_used_as_is() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "twitter": "@hackspace" },
            "issue_report_channels": ["twitter"]
        }));
        assert_eq!(address, "@hackspace");
    }

    #[test]
    fn test_unrecognized_channel_keeps_default() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "issue_mail": "issues@example.org" },
            "issue_report_channels": ["carrier_pigeon"]
        }));
        assert_eq!(address, "info@example.org");
    }

    #[test]
    fn test_issue_mail_without_channels_used_directly() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "issue_mail": "aXNzdWVzQGV4YW1wbGUub3Jn" }
        }));
        assert_eq!(address, "aXNzdWVzQGV4YW1wbGUub3Jn");
    }

    #[test]
    fn test_empty_channel_list_falls_through_to_issue_mail() {
        let address = resolve(json!({
            "contact": { "email": "info@example.org", "issue_mail": "issues@example.org" },
            "issue_report_channels": []
        }));
        assert_eq!(address, "issues@example.org");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let doc = SpaceDocument::from_value(&json!({
            "contact": { "email": "info@example.org", "ml": "list@example.org" },
            "issue_report_channels": ["ml"]
        }));
        assert_eq!(resolve_contact(&doc), resolve_contact(&doc));
    }
}
