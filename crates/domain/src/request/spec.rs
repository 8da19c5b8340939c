//! Request half of an example fixture

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The request a documented example issues.
///
/// URL parameters fill `:name` and `*` placeholders of the handler path,
/// query parameters are appended URL-encoded, headers and body are sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRequest {
    /// Values for path placeholders, keyed by placeholder name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub url_parameters: IndexMap<String, String>,
    /// Query string parameters in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query_parameters: IndexMap<String, String>,
    /// Request headers in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Optional raw request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ExampleRequest {
    /// Creates an empty request (no parameters, headers or body).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a path placeholder value.
    #[must_use]
    pub fn url_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a query string parameter.
    #[must_use]
    pub fn query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Encodes the query parameters as an `application/x-www-form-urlencoded` string.
    ///
    /// Returns `None` when there are no query parameters.
    #[must_use]
    pub fn query_string(&self) -> Option<String> {
        if self.query_parameters.is_empty() {
            return None;
        }
        let pairs: Vec<(&str, &str)> = self
            .query_parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        Some(
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
        )
    }
}
