//! Shared utilities.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

// Feeds publish both padded and unpadded values.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Syntactic email check: dotted local part, `@`, dotted hostname.
pub fn is_valid_email(candidate: &str) -> bool {
    let Some((local, _domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64
        && candidate.len() <= 254
        && email_regex().is_some_and(|re| re.is_match(candidate))
}

/// Decode a base64 value into text.
///
/// Returns `None` when the input is not base64. Invalid UTF-8 is replaced
/// rather than rejected.
pub fn decode_base64_text(encoded: &str) -> Option<String> {
    let bytes = LENIENT_BASE64.decode(encoded.trim()).ok()?;
    Some(String::from_utf8_lossy(&bytes).trim().to_string())
}

/// Replace control characters (CR and LF included) with spaces.
///
/// For text from a remote feed that ends up on a single line, such as a
/// mail header.
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Format epoch seconds as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_epoch(epoch_secs: i64) -> String {
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => epoch_secs.to_string(),
    }
}
