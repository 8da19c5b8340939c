//! Example fixtures: one request paired with the response it should produce.

use serde::Serialize;

use crate::request::ExampleRequest;
use crate::response::ExpectedResponse;

/// A recorded request/response fixture used both as documentation and as a
/// self-test case.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Example {
    /// Optional short label shown in documentation and reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Request to issue.
    pub request: ExampleRequest,
    /// Response expected back.
    pub response: ExpectedResponse,
}

impl Example {
    /// Creates an example from a request and its expected response.
    #[must_use]
    pub const fn new(request: ExampleRequest, response: ExpectedResponse) -> Self {
        Self {
            title: None,
            request,
            response,
        }
    }

    /// Sets the example title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
