//! Self-test configuration.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Per-request timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings for a self-test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Seed for the example shuffle; random when absent.
    pub seed: Option<u64>,
    /// User-Agent sent with every example request.
    pub user_agent: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            seed: None,
            user_agent: format!("restdoc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TestConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Fixes the shuffle seed so runs are reproducible.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// RNG driving the example shuffle.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}
