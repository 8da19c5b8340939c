//! Host framework adapters the resource tree can mount onto.

mod axum_host;

pub use axum_host::{AxumHandler, AxumHost, axum_path};
