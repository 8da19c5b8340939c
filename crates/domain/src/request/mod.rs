//! Example request domain types

mod method;
mod spec;

pub use method::HttpMethod;
pub use spec::ExampleRequest;
