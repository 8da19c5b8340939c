//! The resource tree and its handler export protocol.

mod docs;
mod host;
mod node;

pub use docs::{HandlerDoc, NodeDoc};
pub use host::{HostAdapter, RecordingHost, RouteRegistrar};
pub use node::{HandlerSpec, NodeConfig, NodeSeed, ParentRef, ResourceNode};

#[cfg(test)]
mod tests;
