//! Endpoint retrieval with a single HTTPS→HTTP fallback hop.
//!
//! [`HttpClient`] is the transport seam; [`UreqClient`] is the production
//! implementation and [`crate::mock::MockHttpClient`] serves tests. The
//! [`Fetcher`] turns raw responses into a [`FetchResult`] whose code follows
//! the ranges documented in [`crate::errors`].

use crate::errors::FetchCode;
use serde_json::Value;
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

/// Advisory added when the HTTPS variant of an `http://` URL already works.
pub const HTTPS_WORKS_ADVISORY: &str =
    "Spaceapi via https works, update this in spaceapi directory.";

/// Advisory added, when enabled, after the HTTPS variant failed.
pub const HTTPS_FAILED_ADVISORY: &str = "Spaceapi via https failed, consider enabling https.";

const USER_AGENT: &str = concat!("spaceaudit/", env!("CARGO_PKG_VERSION"));

/// Raw response handed back by a transport.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Protocol status code, e.g. 200.
    pub status: u16,
    /// Value of `Access-Control-Allow-Origin`, if sent.
    pub allow_origin: Option<String>,
    /// Raw body bytes, not yet decoded.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Any non-empty origin other than `null` counts as permissive.
    pub fn cors_enabled(&self) -> bool {
        self.allow_origin
            .as_deref()
            .is_some_and(|origin| !origin.trim().is_empty() && origin.trim() != "null")
    }
}

/// A request that never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    #[error("transport failure (code {0})")]
    Transport(u32),

    #[error("TLS negotiation failure (code {0})")]
    Tls(u32),
}

impl TransportFailure {
    /// The [`FetchCode`] this failure reports.
    pub fn code(self) -> FetchCode {
        match self {
            Self::Transport(code) => FetchCode::transport(code),
            Self::Tls(code) => FetchCode::security(code),
        }
    }

    /// Classify a `ureq` error. `secure` tells whether the request was made
    /// over TLS, which decides how undecodable stream data is read.
    fn from_ureq(err: ureq::Error, secure: bool) -> Self {
        use ureq::Error;

        match err {
            Error::BadUri(_) | Error::Http(_) => Self::Transport(FetchCode::MALFORMED_URL.as_u32()),
            Error::HostNotFound => Self::Transport(FetchCode::HOST_NOT_FOUND.as_u32()),
            Error::ConnectionFailed => Self::Transport(FetchCode::CONNECT_FAILED.as_u32()),
            Error::Timeout(_) => Self::Transport(FetchCode::TIMEOUT.as_u32()),
            Error::TooManyRedirects | Error::RedirectFailed => {
                Self::Transport(FetchCode::TOO_MANY_REDIRECTS.as_u32())
            }
            Error::BodyExceedsLimit(_) => Self::Transport(FetchCode::BODY_TOO_LARGE.as_u32()),
            Error::Rustls(tls) => Self::from_tls_message(&tls.to_string()),
            Error::Tls(msg) => Self::from_tls_message(msg),
            Error::Io(io_err) => Self::from_io(&io_err, secure),
            other => {
                debug!("Unclassified transport error: {}", other);
                Self::Transport(FetchCode::OTHER_TRANSPORT.as_u32())
            }
        }
    }

    fn from_io(err: &io::Error, secure: bool) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Self::Transport(FetchCode::TIMEOUT.as_u32())
            }
            io::ErrorKind::ConnectionRefused => Self::Transport(FetchCode::CONNECT_FAILED.as_u32()),
            // rustls reports handshake problems through the stream as InvalidData.
            io::ErrorKind::InvalidData if secure || names_tls(&err.to_string()) => {
                Self::from_tls_message(&err.to_string())
            }
            _ => Self::Transport(FetchCode::RECV_ERROR.as_u32()),
        }
    }

    fn from_tls_message(message: &str) -> Self {
        let code = if message.to_ascii_lowercase().contains("certificate") {
            FetchCode::TLS_CERTIFICATE
        } else {
            FetchCode::TLS_HANDSHAKE
        };
        Self::Tls(code.as_u32() - 2000)
    }
}

fn names_tls(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["tls", "ssl", "certificate", "handshake"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn is_https(url: &str) -> bool {
    url.trim_start()
        .get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Transport seam for fetches.
pub trait HttpClient {
    /// Issue a GET. Any completed response, whatever its status, is `Ok`.
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure> {
        (**self).get(url, timeout)
    }
}

/// Blocking HTTP client backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqClient;

impl HttpClient for UreqClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure> {
        let secure = is_https(url);
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let mut response = agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| TransportFailure::from_ureq(err, secure))?;

        let status = response.status().as_u16();
        let allow_origin = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| TransportFailure::from_ureq(err, secure))?;

        Ok(HttpResponse {
            status,
            allow_origin,
            body,
        })
    }
}

/// Result of fetching one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Outcome of the fetch; see [`crate::errors`].
    pub code: FetchCode,
    /// Parsed document; present only when `code` is success.
    pub body: Option<Value>,
    /// Whether the response allowed cross-origin access. False on failure.
    pub cors_enabled: bool,
    /// Issue lines raised by the fetch itself, in order.
    pub advisories: Vec<String>,
}

impl FetchResult {
    /// A parsed document with no advisories yet.
    pub fn success(body: Value, cors_enabled: bool) -> Self {
        Self {
            code: FetchCode::SUCCESS,
            body: Some(body),
            cors_enabled,
            advisories: Vec::new(),
        }
    }

    /// A failed fetch carrying only its code.
    pub fn failure(code: FetchCode) -> Self {
        Self {
            code,
            body: None,
            cors_enabled: false,
            advisories: Vec::new(),
        }
    }

    /// Success code and a parsed document.
    pub fn is_success(&self) -> bool {
        self.code.is_success() && self.body.is_some()
    }
}

/// Timeouts and advisories for [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Timeout for the upgraded HTTPS attempt.
    pub secure_timeout: Duration,
    /// Timeout for the plain attempt (and for URLs that are already HTTPS).
    pub fallback_timeout: Duration,
    /// Add [`HTTPS_FAILED_ADVISORY`] when the upgraded attempt fails.
    pub advise_https_failure: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            secure_timeout: Duration::from_secs(10),
            fallback_timeout: Duration::from_secs(20),
            advise_https_failure: false,
        }
    }
}

/// Retrieves and decodes endpoint documents through an [`HttpClient`].
pub struct Fetcher<C> {
    client: C,
    policy: FetchPolicy,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, policy: FetchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch and decode a single URL, no fallback.
    pub fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        debug!("Fetching {} (timeout {:?})", url, timeout);

        let response = match self.client.get(url, timeout) {
            Ok(response) => response,
            Err(failure) => {
                debug!("Fetch of {} failed: {}", url, failure);
                return FetchResult::failure(failure.code());
            }
        };

        if !(200..300).contains(&response.status) {
            return FetchResult::failure(FetchCode::http(response.status));
        }

        let cors_enabled = response.cors_enabled();
        let text = match String::from_utf8(response.body) {
            Ok(text) => text,
            Err(_) => return FetchResult::failure(FetchCode::UNREADABLE_BODY),
        };
        // Some endpoints prepend a byte order mark.
        match serde_json::from_str::<Value>(text.trim_start_matches('\u{feff}')) {
            Ok(body) => FetchResult::success(body, cors_enabled),
            Err(err) => {
                debug!("Body of {} is not JSON: {}", url, err);
                FetchResult::failure(FetchCode::INVALID_JSON)
            }
        }
    }

    /// Fetch an endpoint, trying HTTPS first for `http://` URLs.
    ///
    /// A working HTTPS variant wins and adds an advisory. Otherwise the
    /// original URL is fetched once more and that result is returned.
    pub fn fetch_with_fallback(&self, url: &str) -> FetchResult {
        let Some(secure_url) = upgrade_to_https(url) else {
            return self.fetch(url, self.policy.fallback_timeout);
        };

        let secure = self.fetch(&secure_url, self.policy.secure_timeout);
        if secure.is_success() {
            let mut result = secure;
            result.advisories.push(HTTPS_WORKS_ADVISORY.to_string());
            return result;
        }

        warn!(
            "HTTPS variant {} failed with code {}, falling back to {}",
            secure_url, secure.code, url
        );
        let mut result = self.fetch(url, self.policy.fallback_timeout);
        if self.policy.advise_https_failure {
            result.advisories.push(HTTPS_FAILED_ADVISORY.to_string());
        }
        result
    }
}

/// `http://` URL rewritten to `https://`; `None` for any other scheme.
pub fn upgrade_to_https(url: &str) -> Option<String> {
    let trimmed = url.trim_start();
    let scheme = trimmed.get(..7)?;
    if scheme.eq_ignore_ascii_case("http://") {
        Some(format!("https://{}", &trimmed[7..]))
    } else {
        None
    }
}
