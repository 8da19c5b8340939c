//! Expected and observed response types

mod expectation;
mod spec;

pub use expectation::{Expect, Predicate};
pub use spec::{ActualResponse, ExpectedResponse, ReceivedResponse, DEFAULT_STATUS};
