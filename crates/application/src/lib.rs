//! Restdoc Application - Resource tree and self-test engine
//!
//! This crate holds the resource tree with its handler export protocol,
//! the ports the engine needs from the outside world, and the use cases
//! that schedule and run examples against a live server.

pub mod error;
pub mod ports;
pub mod testing;
pub mod tree;

pub use error::{ClientError, ExportError, HookStage, TestRunError, TestRunResult, TreeError};
pub use ports::{ExampleClient, OutgoingRequest};
pub use testing::{
    ExampleTestRunner, Hook, HookError, TestConfig, TestOrchestrator, TestOutcome, log_outcome,
};
pub use tree::{
    HandlerSpec, HostAdapter, NodeConfig, NodeDoc, NodeSeed, ParentRef, RecordingHost,
    ResourceNode, RouteRegistrar,
};
