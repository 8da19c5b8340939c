//! Self-test outcomes and aggregated reports.

use std::time::Duration;

use serde::Serialize;

use crate::example::Example;
use crate::request::{ExampleRequest, HttpMethod};
use crate::response::{ActualResponse, ExpectedResponse};

/// Verdict of a single example run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every declared expectation held.
    Passed,
    /// A mismatch or a network failure.
    Failed,
}

/// Description of the concrete request an example issued.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDescription {
    /// HTTP method.
    pub method: HttpMethod,
    /// Handler path template, e.g. `/users/:id`.
    pub path: String,
    /// Concrete URL after substitution and query encoding.
    pub url: String,
    /// The fixture request as declared.
    #[serde(flatten)]
    pub request: ExampleRequest,
}

/// Result of running one example against a live server.
#[derive(Debug, Clone, Serialize)]
pub struct ExampleOutcome {
    /// Pass or fail.
    pub verdict: Verdict,
    /// Title of the handler the example belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Example title, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// What was sent.
    pub request: RequestDescription,
    /// The full expected-response spec.
    pub expected: ExpectedResponse,
    /// What came back; always present on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<ActualResponse>,
    /// First mismatch or network error, on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Wall time of the request in milliseconds.
    pub duration_ms: u64,
}

impl ExampleOutcome {
    /// Creates a passing outcome carrying the example.
    #[must_use]
    pub fn pass(
        handler: Option<String>,
        request: RequestDescription,
        example: &Example,
        duration: Duration,
    ) -> Self {
        Self {
            verdict: Verdict::Passed,
            handler,
            title: example.title.clone(),
            request,
            expected: example.response.clone(),
            actual: None,
            reason: None,
            duration_ms: millis(duration),
        }
    }

    /// Creates a failing outcome with the observed response and the reason.
    #[must_use]
    pub fn fail(
        handler: Option<String>,
        request: RequestDescription,
        example: &Example,
        actual: ActualResponse,
        reason: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            verdict: Verdict::Failed,
            handler,
            title: example.title.clone(),
            request,
            expected: example.response.clone(),
            actual: Some(actual),
            reason: Some(reason.into()),
            duration_ms: millis(duration),
        }
    }

    /// Returns true if the example passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Aggregated results of a self-test run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestReport {
    /// Outcomes that passed.
    pub passed: Vec<ExampleOutcome>,
    /// Outcomes that failed.
    pub failed: Vec<ExampleOutcome>,
    /// Number of examples scheduled across the tested subtree.
    pub total: usize,
}

impl TestReport {
    /// Creates an empty report expecting `total` outcomes.
    #[must_use]
    pub const fn with_total(total: usize) -> Self {
        Self {
            passed: Vec::new(),
            failed: Vec::new(),
            total,
        }
    }

    /// Files an outcome under passed or failed.
    pub fn record(&mut self, outcome: ExampleOutcome) {
        if outcome.passed() {
            self.passed.push(outcome);
        } else {
            self.failed.push(outcome);
        }
    }

    /// Number of outcomes recorded so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Returns true once every scheduled example has reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed() == self.total
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}
