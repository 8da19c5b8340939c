//! Axum host adapter.
//!
//! [`AxumHost`] collects route registrations from the tree and assembles an
//! `axum::Router` on demand. Tree paths use `:name`/`*name` placeholders;
//! they are rewritten to axum's `{name}`/`{*name}` syntax when the router is
//! built.

use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use axum::routing::{MethodFilter, MethodRouter};
use indexmap::IndexMap;
use parking_lot::Mutex;
use restdoc_application::RouteRegistrar;
use restdoc_domain::HttpMethod;
use tracing::debug;

type Route = dyn Fn(MethodRouter<()>, MethodFilter) -> MethodRouter<()> + Send + Sync;

/// A type-erased axum handler that can be registered under any verb.
#[derive(Clone)]
pub struct AxumHandler(Arc<Route>);

impl AxumHandler {
    /// Wraps any axum handler (usually an `async fn`).
    pub fn new<F, T>(handler: F) -> Self
    where
        F: Handler<T, ()>,
        T: 'static,
    {
        Self(Arc::new(move |router: MethodRouter<()>, filter: MethodFilter| {
            router.on(filter, handler.clone())
        }))
    }

    fn route(&self, router: MethodRouter<()>, method: HttpMethod) -> MethodRouter<()> {
        (self.0)(router, method_filter(method))
    }
}

impl fmt::Debug for AxumHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AxumHandler(..)")
    }
}

const fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Rewrites a tree path template into axum route syntax.
///
/// ```
/// use restdoc_infrastructure::host::axum_path;
///
/// assert_eq!(axum_path("/users/:id"), "/users/{id}");
/// assert_eq!(axum_path("/files/*rest"), "/files/{*rest}");
/// ```
#[must_use]
pub fn axum_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if segment == "*" {
                "{*wildcard}".to_string()
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Route table backed by axum.
///
/// Every verb is supported. Re-registering the same method and path
/// replaces the previous handler.
#[derive(Debug, Default)]
pub struct AxumHost {
    routes: Mutex<IndexMap<String, IndexMap<HttpMethod, AxumHandler>>>,
}

impl AxumHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered `(method, path)` pairs in registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<(HttpMethod, String)> {
        self.routes
            .lock()
            .iter()
            .flat_map(|(path, methods)| methods.keys().map(move |m| (*m, path.clone())))
            .collect()
    }

    /// Builds a router from the current registrations.
    ///
    /// Two templates that differ only in placeholder names (`/users/:id` and
    /// `/users/:name`) conflict in axum and make this panic.
    #[must_use]
    pub fn router(&self) -> Router {
        let routes = self.routes.lock();
        routes.iter().fold(Router::new(), |router, (path, methods)| {
            let method_router = methods
                .iter()
                .fold(MethodRouter::new(), |acc, (method, handler)| handler.route(acc, *method));
            router.route(&axum_path(path), method_router)
        })
    }

    fn insert(&self, method: HttpMethod, path: &str, handler: AxumHandler) {
        debug!(%method, path, "axum route registered");
        self.routes
            .lock()
            .entry(path.to_string())
            .or_default()
            .insert(method, handler);
    }
}

impl RouteRegistrar<AxumHandler> for AxumHost {
    fn get(&self, path: &str, handler: AxumHandler) {
        self.insert(HttpMethod::Get, path, handler);
    }

    fn post(&self, path: &str, handler: AxumHandler) {
        self.insert(HttpMethod::Post, path, handler);
    }

    fn put(&self, path: &str, handler: AxumHandler) {
        self.insert(HttpMethod::Put, path, handler);
    }

    fn patch(&self, path: &str, handler: AxumHandler) -> Result<(), AxumHandler> {
        self.insert(HttpMethod::Patch, path, handler);
        Ok(())
    }

    fn delete(&self, path: &str, handler: AxumHandler) -> Result<(), AxumHandler> {
        self.insert(HttpMethod::Delete, path, handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use restdoc_application::{HandlerSpec, ResourceNode};

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn test_axum_path_translation() {
        assert_eq!(axum_path("/"), "/");
        assert_eq!(axum_path("/api/users"), "/api/users");
        assert_eq!(axum_path("/users/:id/posts/:post"), "/users/{id}/posts/{post}");
        assert_eq!(axum_path("/any/*"), "/any/{*wildcard}");
    }

    #[test]
    fn test_tree_exports_into_host() {
        let host = Arc::new(AxumHost::new());
        let api = ResourceNode::mounted(Arc::clone(&host), "/api", "API");
        api.get("/users", HandlerSpec::new(AxumHandler::new(ok)));
        api.delete("/users/:id", HandlerSpec::new(AxumHandler::new(ok)));
        api.get("/users", HandlerSpec::new(AxumHandler::new(ok)));

        assert_eq!(
            host.routes(),
            vec![
                (HttpMethod::Get, "/api/users".to_string()),
                (HttpMethod::Delete, "/api/users/:id".to_string()),
            ]
        );
        let _router = host.router();
    }
}
