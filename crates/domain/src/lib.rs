//! Restdoc Domain - Core types
//!
//! This crate defines the data model shared by the resource tree and the
//! self-test engine: HTTP methods, path normalization, example fixtures,
//! literal-or-predicate expectations and test reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod example;
pub mod path;
pub mod request;
pub mod response;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use example::Example;
pub use path::normalize;
pub use request::{ExampleRequest, HttpMethod};
pub use response::{ActualResponse, Expect, ExpectedResponse, Predicate, ReceivedResponse};
pub use testing::{ExampleOutcome, RequestDescription, TestReport, Verdict};
