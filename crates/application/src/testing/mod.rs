//! Self-test engine: scheduling, running and aggregating examples.

mod config;
mod hooks;
mod orchestrator;
mod plan;
mod runner;

pub use config::{DEFAULT_TIMEOUT_MS, TestConfig};
pub use hooks::{Hook, HookError, HookFuture};
pub use orchestrator::{TestOrchestrator, TestOutcome, log_outcome};
pub use plan::{ExampleTask, NodePlan};
pub use runner::{ExampleTestRunner, Mismatch, build_request, verify};
