//! Example test runner.
//!
//! Executes one example as a real HTTP call through the [`ExampleClient`]
//! port and compares the response against the example's expectations.

use std::time::{Duration, Instant};

use restdoc_domain::response::{Expect, ExpectedResponse, ReceivedResponse};
use restdoc_domain::{ActualResponse, ExampleOutcome, RequestDescription, path};
use thiserror::Error;
use tracing::debug;

use super::plan::ExampleTask;
use crate::error::ClientError;
use crate::ports::{ExampleClient, OutgoingRequest};

/// First expectation an actual response failed to meet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Status literal or predicate failed.
    #[error("expected status {expected}, got {actual}")]
    Status {
        /// Expected status as displayed.
        expected: String,
        /// Observed status.
        actual: u16,
    },

    /// A declared header was missing or did not match.
    #[error("expected header '{name}' to be {expected}, got {}", .actual.as_deref().unwrap_or("<missing>"))]
    Header {
        /// Header name as declared.
        name: String,
        /// Expected value as displayed.
        expected: String,
        /// Observed value, if present.
        actual: Option<String>,
    },

    /// Body literal or predicate failed.
    #[error("expected body {expected:?}, got {actual:?}")]
    Body {
        /// Expected body as displayed.
        expected: String,
        /// Observed (trimmed) body.
        actual: String,
    },
}

/// Runs single examples against a live server.
#[derive(Debug)]
pub struct ExampleTestRunner<C> {
    client: C,
    timeout: Duration,
}

impl<C: ExampleClient> ExampleTestRunner<C> {
    /// Creates a runner issuing requests through `client`, cancelling any
    /// request that takes longer than `timeout`.
    pub const fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one example against `base_url` and produces its outcome.
    ///
    /// Network failures and timeouts become failed outcomes; this never
    /// errors.
    pub async fn run(&self, base_url: &str, task: &ExampleTask) -> ExampleOutcome {
        let outgoing = build_request(base_url, task);
        let description = RequestDescription {
            method: task.method,
            path: task.full_path.clone().unwrap_or_else(|| "/".to_string()),
            url: outgoing.url.clone(),
            request: task.example.request.clone(),
        };
        let example = &task.example;
        let handler = task.handler.clone();

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.client.execute(&outgoing)).await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => return network_failure(handler, description, example, &error, elapsed),
            Err(_) => {
                let error = ClientError::Timeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                };
                return network_failure(handler, description, example, &error, elapsed);
            }
        };

        match verify(&example.response, &response) {
            Ok(()) => {
                debug!(method = %task.method, url = %description.url, "example passed");
                ExampleOutcome::pass(handler, description, example, elapsed)
            }
            Err(mismatch) => {
                debug!(method = %task.method, url = %description.url, %mismatch, "example failed");
                let actual = ActualResponse::observed(&response, &example.response);
                ExampleOutcome::fail(handler, description, example, actual, mismatch.to_string(), elapsed)
            }
        }
    }
}

fn network_failure(
    handler: Option<String>,
    description: RequestDescription,
    example: &restdoc_domain::Example,
    error: &ClientError,
    elapsed: Duration,
) -> ExampleOutcome {
    debug!(url = %description.url, %error, "example request failed");
    let actual = ActualResponse::Error {
        error: error.to_string(),
    };
    ExampleOutcome::fail(handler, description, example, actual, error.to_string(), elapsed)
}

/// Assembles the concrete request for a task: placeholders substituted,
/// query string appended, headers and body attached.
#[must_use]
pub fn build_request(base_url: &str, task: &ExampleTask) -> OutgoingRequest {
    let request = &task.example.request;
    let route = task
        .route
        .as_deref()
        .map(|route| path::substitute_parameters(route, &request.url_parameters));

    let mut url = path::join_url(base_url, route.as_deref());
    if let Some(query) = request.query_string() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query);
    }

    OutgoingRequest {
        method: task.method,
        url,
        headers: request.headers.clone(),
        body: request.body.clone(),
    }
}

/// Compares a received response against an expectation.
///
/// Status first, then headers in declaration order (names matched
/// case-insensitively, first mismatch wins), then the body (trimmed on both
/// sides for literals, trimmed actual for predicates).
///
/// # Errors
///
/// Returns the first [`Mismatch`] found.
pub fn verify(expected: &ExpectedResponse, actual: &ReceivedResponse) -> Result<(), Mismatch> {
    check_status(&expected.status, actual.status)?;
    for (name, expectation) in &expected.headers {
        check_header(name, expectation, actual.get_header(name))?;
    }
    if let Some(body) = &expected.body {
        check_body(body, &actual.body)?;
    }
    Ok(())
}

fn check_status(expected: &Expect<u16>, actual: u16) -> Result<(), Mismatch> {
    if expected.matches(&actual) {
        Ok(())
    } else {
        Err(Mismatch::Status {
            expected: expected.to_string(),
            actual,
        })
    }
}

fn check_header(name: &str, expected: &Expect<String>, actual: Option<&String>) -> Result<(), Mismatch> {
    match actual {
        Some(value) if expected.matches(value) => Ok(()),
        _ => Err(Mismatch::Header {
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.cloned(),
        }),
    }
}

fn check_body(expected: &Expect<String>, actual: &str) -> Result<(), Mismatch> {
    let trimmed = actual.trim().to_string();
    if expected.matches_with(&trimmed, |expected, actual| expected.trim() == actual) {
        Ok(())
    } else {
        Err(Mismatch::Body {
            expected: expected.to_string(),
            actual: trimmed,
        })
    }
}
