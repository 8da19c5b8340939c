//! Example client implementation using reqwest.
//!
//! This adapter implements the `ExampleClient` port using the reqwest
//! library. It sends exactly the request it is given and buffers the whole
//! response, so redirects are left for the example to assert on.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, Url};
use restdoc_application::ports::{ExampleClient, OutgoingRequest};
use restdoc_application::{ClientError, TestConfig};
use restdoc_domain::{HttpMethod, ReceivedResponse};

/// Example client implementation using reqwest.
///
/// Wraps a `reqwest::Client`; cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestExampleClient {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestExampleClient {
    /// Creates a client from the self-test configuration.
    ///
    /// Configuration applied:
    /// - User-Agent from `config.user_agent`
    /// - Per-request timeout from `config.timeout_ms`
    /// - Redirects: not followed
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &TestConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Creates an example client around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `ClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> ClientError {
        if error.is_timeout() {
            return ClientError::Timeout { timeout_ms };
        }
        if error.is_connect() {
            let host = error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            return ClientError::Connection(format!("{host}: {error}"));
        }
        if error.is_builder() {
            return ClientError::InvalidRequest(error.to_string());
        }
        ClientError::Other(error.to_string())
    }
}

impl ExampleClient for ReqwestExampleClient {
    fn execute(
        &self,
        request: &OutgoingRequest,
    ) -> impl Future<Output = Result<ReceivedResponse, ClientError>> + Send {
        let method = Self::to_reqwest_method(request.method);
        let url = request.url.clone();
        let headers = request.headers.clone();
        let body = request.body.clone();
        let timeout_ms = self.timeout_ms;

        async move {
            let parsed_url =
                Url::parse(&url).map_err(|e| ClientError::InvalidUrl(format!("{e}: {url}")))?;

            let start = Instant::now();

            let mut builder = self.client.request(method, parsed_url);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| ClientError::Other(format!("failed to read body: {e}")))?;

            Ok(ReceivedResponse::new(
                status,
                response_headers,
                String::from_utf8_lossy(&body_bytes).into_owned(),
                start.elapsed(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestExampleClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestExampleClient::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestExampleClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_client_creation() {
        let client = ReqwestExampleClient::new(&TestConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_url_is_reported() {
        let client = ReqwestExampleClient::new(&TestConfig::default()).unwrap();
        let request = OutgoingRequest {
            method: HttpMethod::Get,
            url: "http://[::1".to_string(),
            headers: IndexMap::new(),
            body: None,
        };
        let result = client.execute(&request).await;
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_malformed_header_is_a_request_error() {
        let client = ReqwestExampleClient::new(&TestConfig::default()).unwrap();
        let mut headers = IndexMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let request = OutgoingRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/".to_string(),
            headers,
            body: None,
        };
        let result = client.execute(&request).await;
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }
}
