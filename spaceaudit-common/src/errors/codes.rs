//! Numeric fetch codes and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a [`FetchCode`], derived purely from its numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Code 0.
    Success,
    /// Codes 1-99.
    Transport,
    /// Codes 100-999.
    Http,
    /// Codes 1000-1999.
    Decode,
    /// Codes 2000 and above.
    Security,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Transport => "transport",
            Self::Http => "http",
            Self::Decode => "decode",
            Self::Security => "security",
        };
        f.write_str(name)
    }
}

/// Outcome code of a single fetch. `0` is the only success value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchCode(u32);

impl FetchCode {
    /// Document fetched and parsed.
    pub const SUCCESS: Self = Self(0);

    // Transport codes follow curl's numbering.
    /// Transport failure with no closer match.
    pub const OTHER_TRANSPORT: Self = Self(1);
    /// URL could not be parsed or turned into a request.
    pub const MALFORMED_URL: Self = Self(3);
    /// DNS lookup failed.
    pub const HOST_NOT_FOUND: Self = Self(6);
    /// TCP connect refused or unreachable.
    pub const CONNECT_FAILED: Self = Self(7);
    /// Request did not finish within its timeout.
    pub const TIMEOUT: Self = Self(28);
    /// Redirect limit hit or a redirect could not be followed.
    pub const TOO_MANY_REDIRECTS: Self = Self(47);
    /// Connection broke while reading the response.
    pub const RECV_ERROR: Self = Self(56);
    /// Response body exceeded the read limit.
    pub const BODY_TOO_LARGE: Self = Self(63);

    /// Body is text but not JSON.
    pub const INVALID_JSON: Self = Self(1000);
    /// Body is not UTF-8.
    pub const UNREADABLE_BODY: Self = Self(1001);

    const SECURITY_BASE: u32 = 2000;
    /// TLS handshake failed (curl 35).
    pub const TLS_HANDSHAKE: Self = Self(Self::SECURITY_BASE + 35);
    /// Peer certificate rejected (curl 60).
    pub const TLS_CERTIFICATE: Self = Self(Self::SECURITY_BASE + 60);

    /// Wrap a raw code as reported by a fetch.
    pub const fn from_raw(code: u32) -> Self {
        Self(code)
    }

    /// Transport failure code, clamped into 1-99.
    pub fn transport(code: u32) -> Self {
        Self(code.clamp(1, 99))
    }

    /// Non-success protocol status, clamped into 100-999.
    pub fn http(status: u16) -> Self {
        Self(u32::from(status).clamp(100, 999))
    }

    /// TLS failure wrapping the underlying transport code.
    pub fn security(transport_code: u32) -> Self {
        Self(Self::SECURITY_BASE + transport_code.clamp(1, 99))
    }

    /// The raw numeric code.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// True only for [`FetchCode::SUCCESS`].
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Classify by numeric range.
    pub const fn class(self) -> ErrorClass {
        match self.0 {
            0 => ErrorClass::Success,
            1..=99 => ErrorClass::Transport,
            100..=999 => ErrorClass::Http,
            1000..=1999 => ErrorClass::Decode,
            _ => ErrorClass::Security,
        }
    }

    /// Short operator-facing description, e.g. `HTTP error 404`.
    ///
    /// Returns `None` for success.
    pub fn describe(self) -> Option<String> {
        match self.class() {
            ErrorClass::Success => None,
            ErrorClass::Transport => Some(format!("Curl error {}", self.0)),
            ErrorClass::Http => Some(format!("HTTP error {}", self.0)),
            ErrorClass::Decode => Some("JSON decode error".to_string()),
            ErrorClass::Security => Some(format!("SSL error {}", self.0 - Self::SECURITY_BASE)),
        }
    }
}

impl fmt::Display for FetchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
