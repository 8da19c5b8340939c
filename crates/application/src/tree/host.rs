//! Host framework adapter.
//!
//! A host qualifies as a mount target when it implements [`RouteRegistrar`]:
//! `get`, `post` and `put` entry points are mandatory, `patch`, `delete` and
//! the `del` alias are optional capabilities. [`HostAdapter`] turns any such
//! host into a uniform `register(method, path, handler)` sink.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use restdoc_domain::HttpMethod;
use tracing::debug;

use crate::error::ExportError;

/// Per-verb route registration entry points of a host framework.
///
/// Optional entry points return the handler back as `Err` when the host
/// does not provide them.
pub trait RouteRegistrar<H>: Send + Sync + 'static {
    /// Registers a GET route.
    fn get(&self, path: &str, handler: H);

    /// Registers a POST route.
    fn post(&self, path: &str, handler: H);

    /// Registers a PUT route.
    fn put(&self, path: &str, handler: H);

    /// Registers a PATCH route, if supported.
    ///
    /// # Errors
    ///
    /// Returns the handler when the host has no PATCH entry point.
    fn patch(&self, _path: &str, handler: H) -> Result<(), H> {
        Err(handler)
    }

    /// Registers a DELETE route under its canonical name, if supported.
    ///
    /// # Errors
    ///
    /// Returns the handler when the host has no `delete` entry point.
    fn delete(&self, _path: &str, handler: H) -> Result<(), H> {
        Err(handler)
    }

    /// Registers a DELETE route under the `del` alias, if supported.
    ///
    /// # Errors
    ///
    /// Returns the handler when the host has no `del` entry point.
    fn del(&self, _path: &str, handler: H) -> Result<(), H> {
        Err(handler)
    }
}

/// Uniform export sink wrapping a host framework.
pub struct HostAdapter<H> {
    registrar: Arc<dyn RouteRegistrar<H>>,
}

impl<H> Clone for HostAdapter<H> {
    fn clone(&self) -> Self {
        Self {
            registrar: Arc::clone(&self.registrar),
        }
    }
}

impl<H> std::fmt::Debug for HostAdapter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostAdapter")
            .field("registrar", &Arc::as_ptr(&self.registrar).cast::<()>())
            .finish()
    }
}

impl<H: 'static> HostAdapter<H> {
    /// Wraps a host that satisfies the registration capability.
    pub fn new<R: RouteRegistrar<H>>(registrar: Arc<R>) -> Self {
        Self { registrar }
    }

    /// Registers `handler` for `method` at `path`.
    ///
    /// DELETE is attempted under the canonical name first, then under the
    /// `del` alias.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedVerb`] when the host lacks an entry
    /// point for the verb.
    pub fn register(&self, method: HttpMethod, path: &str, handler: H) -> Result<(), ExportError> {
        debug!(%method, path, "registering route with host");
        let registrar = &self.registrar;
        let outcome = match method {
            HttpMethod::Get => {
                registrar.get(path, handler);
                Ok(())
            }
            HttpMethod::Post => {
                registrar.post(path, handler);
                Ok(())
            }
            HttpMethod::Put => {
                registrar.put(path, handler);
                Ok(())
            }
            HttpMethod::Patch => registrar.patch(path, handler),
            HttpMethod::Delete => registrar
                .delete(path, handler)
                .or_else(|handler| registrar.del(path, handler)),
        };
        outcome.map_err(|_| ExportError::UnsupportedVerb {
            method,
            path: path.to_string(),
        })
    }

    /// Returns true if both adapters wrap the same host instance.
    #[must_use]
    pub fn same_host(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.registrar), Arc::as_ptr(&other.registrar))
    }
}

/// In-memory export sink recording every registration.
///
/// The last registration for a method and path wins, mirroring how a host
/// router ends up after repeated exports of the same handler.
#[derive(Debug)]
pub struct RecordingHost<H> {
    routes: Mutex<IndexMap<(HttpMethod, String), H>>,
    calls: Mutex<usize>,
}

impl<H> Default for RecordingHost<H> {
    fn default() -> Self {
        Self {
            routes: Mutex::new(IndexMap::new()),
            calls: Mutex::new(0),
        }
    }
}

impl<H: Clone> RecordingHost<H> {
    /// Creates an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the final `(method, path)` registrations, sorted.
    #[must_use]
    pub fn registrations(&self) -> Vec<(HttpMethod, String)> {
        let mut routes: Vec<_> = self.routes.lock().keys().cloned().collect();
        routes.sort();
        routes
    }

    /// Returns the handler registered for `method` at `path`.
    #[must_use]
    pub fn handler(&self, method: HttpMethod, path: &str) -> Option<H> {
        self.routes.lock().get(&(method, path.to_string())).cloned()
    }

    /// Total number of registration calls received, including repeats.
    #[must_use]
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    fn record(&self, method: HttpMethod, path: &str, handler: H) {
        *self.calls.lock() += 1;
        self.routes.lock().insert((method, path.to_string()), handler);
    }
}

impl<H: Clone + Send + 'static> RouteRegistrar<H> for RecordingHost<H> {
    fn get(&self, path: &str, handler: H) {
        self.record(HttpMethod::Get, path, handler);
    }

    fn post(&self, path: &str, handler: H) {
        self.record(HttpMethod::Post, path, handler);
    }

    fn put(&self, path: &str, handler: H) {
        self.record(HttpMethod::Put, path, handler);
    }

    fn patch(&self, path: &str, handler: H) -> Result<(), H> {
        self.record(HttpMethod::Patch, path, handler);
        Ok(())
    }

    fn delete(&self, path: &str, handler: H) -> Result<(), H> {
        self.record(HttpMethod::Delete, path, handler);
        Ok(())
    }
}
