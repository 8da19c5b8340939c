//! Application error types

use restdoc_domain::{DomainError, HttpMethod};
use thiserror::Error;

/// Errors raised while registering a handler with a host framework.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The host exposes no registration entry point for this verb.
    #[error("host has no registration entry point for {method} (path {path})")]
    UnsupportedVerb {
        /// The verb that could not be registered.
        method: HttpMethod,
        /// The full path of the rejected registration.
        path: String,
    },
}

/// Errors raised while restructuring the resource tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The requested parent is the node itself or one of its descendants.
    #[error("attaching {path} would make it its own ancestor")]
    Cycle {
        /// Full path of the node being attached.
        path: String,
    },
}

/// Network-level failures of the example client.
///
/// These never abort a run; the runner turns them into failed outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request did not complete within the per-request timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The concrete request URL was rejected.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built from the fixture, e.g. a malformed
    /// header name.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Structural faults that prevent a self-test run from being attempted or
/// continued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TestRunError {
    /// The base URL is malformed or uses an unsupported scheme.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] DomainError),

    /// A before/after hook failed to resume the run.
    #[error("{stage} hook at {node} failed: {message}")]
    Hook {
        /// `beforeEachTest` or `afterEachTest`.
        stage: HookStage,
        /// Full path of the node owning the hook (`/` for the root).
        node: String,
        /// The hook's error message.
        message: String,
    },
}

/// Which hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Runs immediately before each example.
    BeforeEach,
    /// Runs immediately after each example.
    AfterEach,
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeEach => f.write_str("beforeEachTest"),
            Self::AfterEach => f.write_str("afterEachTest"),
        }
    }
}

/// Result type alias for a self-test run.
pub type TestRunResult<T> = Result<T, TestRunError>;
