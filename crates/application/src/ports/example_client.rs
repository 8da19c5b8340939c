//! HTTP client port used by the example test runner

use std::future::Future;

use indexmap::IndexMap;
use restdoc_domain::{HttpMethod, ReceivedResponse};

use crate::error::ClientError;

/// A fully assembled request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Concrete URL including the encoded query string.
    pub url: String,
    /// Request headers in declaration order.
    pub headers: IndexMap<String, String>,
    /// Optional raw body.
    pub body: Option<String>,
}

/// Port for executing example requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the self-test engine to be independent of specific HTTP libraries.
/// Implementations must not share mutable state between concurrent calls.
pub trait ExampleClient: Send + Sync + 'static {
    /// Sends the request and buffers the full response.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on connection, DNS or transport failures.
    fn execute(
        &self,
        request: &OutgoingRequest,
    ) -> impl Future<Output = Result<ReceivedResponse, ClientError>> + Send;
}
