//! Restdoc Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports and host
//! capabilities defined in the application layer: a reqwest-backed example
//! client, an axum route table the resource tree can mount onto, and
//! environment-driven configuration.

pub mod adapters;
pub mod config;
pub mod host;
pub mod self_test;

pub use adapters::ReqwestExampleClient;
pub use config::{load_test_config, load_test_config_from};
pub use host::{AxumHandler, AxumHost};
pub use self_test::{HttpTestOrchestrator, SelfTest, SetupError, http_orchestrator};
