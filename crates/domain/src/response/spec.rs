//! Response specification types
//!
//! `ExpectedResponse` is the fixture side of an example, `ReceivedResponse`
//! is what the server actually sent back, and `ActualResponse` is the
//! report-facing view of the latter.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;

use super::Expect;

/// Status code assumed when an example does not declare one.
pub const DEFAULT_STATUS: u16 = 200;

/// The response an example expects.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedResponse {
    /// Expected status, 200 unless overridden.
    pub status: Expect<u16>,
    /// Expected headers in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Expect<String>>,
    /// Expected body; `None` leaves the body unchecked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Expect<String>>,
}

impl Default for ExpectedResponse {
    fn default() -> Self {
        Self {
            status: Expect::Literal(DEFAULT_STATUS),
            headers: IndexMap::new(),
            body: None,
        }
    }
}

impl ExpectedResponse {
    /// Creates an expectation of a bare `200` with no header or body checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected status (literal or predicate).
    #[must_use]
    pub fn status(mut self, status: impl Into<Expect<u16>>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the expected status to a predicate.
    #[must_use]
    pub fn status_where(mut self, check: impl Fn(&u16) -> bool + Send + Sync + 'static) -> Self {
        self.status = Expect::predicate(check);
        self
    }

    /// Adds an expected header (literal or predicate).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Expect<String>>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds an expected header checked by a predicate.
    #[must_use]
    pub fn header_where(
        mut self,
        name: impl Into<String>,
        check: impl Fn(&String) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.headers.insert(name.into(), Expect::predicate(check));
        self
    }

    /// Sets the expected body (literal or predicate).
    #[must_use]
    pub fn body(mut self, body: impl Into<Expect<String>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the expected body to a predicate over the trimmed actual body.
    #[must_use]
    pub fn body_where(mut self, check: impl Fn(&String) -> bool + Send + Sync + 'static) -> Self {
        self.body = Some(Expect::predicate(check));
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers with lower-cased names; repeated headers are joined
    /// with `", "`.
    pub headers: IndexMap<String, String>,
    /// Response body, lossily decoded as UTF-8.
    pub body: String,
    /// Time from send to fully buffered body.
    pub duration: Duration,
}

impl ReceivedResponse {
    /// Creates a response, lower-casing header names and folding repeated
    /// headers into one comma-separated value.
    #[must_use]
    pub fn new(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
        body: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let mut folded: IndexMap<String, String> = IndexMap::new();
        for (name, value) in headers {
            folded
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        Self {
            status,
            headers: folded,
            body: body.into(),
            duration,
        }
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// The observed response as shown in a failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActualResponse {
    /// The server answered.
    Received {
        /// Observed status.
        status: u16,
        /// Observed headers, present only when headers were expected.
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<IndexMap<String, String>>,
        /// Observed body, present only when a body was expected.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    /// The request never produced a response.
    Error {
        /// Description of the network failure.
        error: String,
    },
}

impl ActualResponse {
    /// Projects a received response onto what the expectation asked about.
    #[must_use]
    pub fn observed(response: &ReceivedResponse, expected: &ExpectedResponse) -> Self {
        Self::Received {
            status: response.status,
            headers: (!expected.headers.is_empty()).then(|| response.headers.clone()),
            body: expected.body.as_ref().map(|_| response.body.clone()),
        }
    }

    /// Returns the observed status, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Received { status, .. } => Some(*status),
            Self::Error { .. } => None,
        }
    }
}
