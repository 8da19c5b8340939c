//! Self-test configuration loading.
//!
//! Defaults come from [`TestConfig::default`]; any `RESTDOC_TEST_*`
//! environment variable overrides the matching field:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RESTDOC_TEST_TIMEOUT_MS` | `timeout_ms` |
//! | `RESTDOC_TEST_SEED` | `seed` |
//! | `RESTDOC_TEST_USER_AGENT` | `user_agent` |

use config::{Config, ConfigError, Environment, Map};
use restdoc_application::TestConfig;

/// Prefix of the environment variables read by [`load_test_config`].
pub const ENV_PREFIX: &str = "RESTDOC_TEST";

/// Loads the self-test configuration from the process environment.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be parsed.
pub fn load_test_config() -> Result<TestConfig, ConfigError> {
    load_test_config_from(None)
}

/// Loads the self-test configuration from an explicit variable map instead
/// of the process environment. `None` reads the process environment.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be parsed.
pub fn load_test_config_from(vars: Option<Map<String, String>>) -> Result<TestConfig, ConfigError> {
    Config::builder()
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(vars),
        )
        .build()?
        .try_deserialize()
}
