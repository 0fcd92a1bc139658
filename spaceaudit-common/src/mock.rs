//! In-memory transports for tests.
//!
//! [`MockHttpClient`] answers from a route table and records every request;
//! [`MockMailer`] records outgoing mail and can be told to fail. Neither
//! opens sockets or spawns processes.

use crate::fetch::{HttpClient, HttpResponse, TransportFailure};
use crate::notify::{MailError, Mailer, OutgoingMail};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Canned reply for one URL.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    Fail(TransportFailure),
}

impl MockReply {
    /// `200 OK` with the given body and no CORS header.
    pub fn json(body: impl Into<String>) -> Self {
        Self::Response(HttpResponse {
            status: 200,
            allow_origin: None,
            body: body.into().into_bytes(),
        })
    }

    pub fn status(status: u16) -> Self {
        Self::Response(HttpResponse {
            status,
            allow_origin: None,
            body: Vec::new(),
        })
    }

    pub fn fail(failure: TransportFailure) -> Self {
        Self::Fail(failure)
    }

    /// Add `Access-Control-Allow-Origin: *`.
    pub fn with_cors(self) -> Self {
        match self {
            Self::Response(mut response) => {
                response.allow_origin = Some("*".to_string());
                Self::Response(response)
            }
            other => other,
        }
    }
}

/// Route-table HTTP client. Unknown URLs fail with host-not-found.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: HashMap<String, MockReply>,
    requests: Mutex<Vec<(String, Duration)>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: impl Into<String>, reply: MockReply) -> Self {
        self.routes.insert(url.into(), reply);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.log().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Timeouts passed with each request, in order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.log().iter().map(|(_, timeout)| *timeout).collect()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<(String, Duration)>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportFailure> {
        self.log().push((url.to_string(), timeout));
        match self.routes.get(url) {
            Some(MockReply::Response(response)) => Ok(response.clone()),
            Some(MockReply::Fail(failure)) => Err(*failure),
            None => Err(TransportFailure::Transport(6)),
        }
    }
}

/// Recording mailer.
#[derive(Debug, Default)]
pub struct MockMailer {
    fail: bool,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Delivery attempts so far, including failed ones.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Mailer for MockMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mail.clone());
        if self.fail {
            Err(MailError::Rejected {
                recipient: mail.to.clone(),
                status: "mock failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
