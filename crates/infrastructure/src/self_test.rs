//! `test` / `test_with` on resource nodes, wired to the reqwest client.

use std::future::Future;

use restdoc_application::{ClientError, ResourceNode, TestConfig, TestOrchestrator, TestOutcome, TestRunError, log_outcome};
use restdoc_domain::TestReport;
use thiserror::Error;

use crate::adapters::ReqwestExampleClient;
use crate::config::load_test_config;

/// Orchestrator sending real HTTP requests.
pub type HttpTestOrchestrator = TestOrchestrator<ReqwestExampleClient>;

/// Failures setting up a self-test, before any example runs.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Environment configuration could not be parsed.
    #[error("invalid self-test configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The HTTP client could not be constructed.
    #[error("cannot create HTTP client: {0}")]
    Client(#[from] ClientError),
}

/// Builds an orchestrator backed by [`ReqwestExampleClient`].
///
/// # Errors
///
/// Returns [`SetupError::Client`] if the client cannot be created.
pub fn http_orchestrator(config: TestConfig) -> Result<HttpTestOrchestrator, SetupError> {
    let client = ReqwestExampleClient::new(&config)?;
    Ok(TestOrchestrator::new(client, config))
}

/// Self-test entry points on a resource node.
pub trait SelfTest {
    /// Runs every example under this node against `base_url` (the URL of this
    /// node) with configuration from the environment, logging the result.
    fn test(&self, base_url: &str) -> impl Future<Output = Result<TestOutcome, SetupError>> + Send;

    /// Like [`test`](Self::test) but hands the result to `callback` instead of
    /// logging it.
    fn test_with<F>(
        &self,
        base_url: &str,
        callback: F,
    ) -> impl Future<Output = Result<TestOutcome, SetupError>> + Send
    where
        F: FnOnce(Option<&TestRunError>, &TestReport) + Send;
}

impl<H: Clone + Send + Sync + 'static> SelfTest for ResourceNode<H> {
    fn test(&self, base_url: &str) -> impl Future<Output = Result<TestOutcome, SetupError>> + Send {
        self.test_with(base_url, log_outcome)
    }

    fn test_with<F>(
        &self,
        base_url: &str,
        callback: F,
    ) -> impl Future<Output = Result<TestOutcome, SetupError>> + Send
    where
        F: FnOnce(Option<&TestRunError>, &TestReport) + Send,
    {
        async move {
            let orchestrator = http_orchestrator(load_test_config()?)?;
            Ok(orchestrator.test_with(self, base_url, callback).await)
        }
    }
}
