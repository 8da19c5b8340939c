//! Restdoc demo server.
//!
//! A small user API declared as a resource tree. Every handler carries
//! examples, so the running server can check its own behavior right after
//! it starts listening.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use parking_lot::Mutex;
use restdoc_application::{HandlerSpec, Hook, NodeConfig, ParentRef, ResourceNode};
use restdoc_domain::{Example, ExampleRequest, ExpectedResponse};
use restdoc_infrastructure::{AxumHandler, AxumHost, SelfTest};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Resource tree mounted on axum.
pub type Node = ResourceNode<AxumHandler>;

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

/// In-memory user store.
#[derive(Debug)]
pub struct UserStore {
    users: Mutex<Vec<User>>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: Mutex::new(seed_users()),
        }
    }
}

fn seed_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Ada".to_string(),
        },
        User {
            id: 2,
            name: "Grace".to_string(),
        },
    ]
}

impl UserStore {
    /// Creates a store holding the seed users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the seed users.
    pub fn reset(&self) {
        *self.users.lock() = seed_users();
    }

    /// All users.
    #[must_use]
    pub fn list(&self) -> Vec<User> {
        self.users.lock().clone()
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn find(&self, id: u64) -> Option<User> {
        self.users.lock().iter().find(|u| u.id == id).cloned()
    }

    /// Stores a new user with the next free id.
    pub fn create(&self, name: String) -> User {
        let mut users = self.users.lock();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User { id, name };
        users.push(user.clone());
        user
    }
}

/// Declares the demo API on `host`.
///
/// The `/users` subtree resets the store before each of its examples.
pub fn build_api(host: Arc<AxumHost>, store: &Arc<UserStore>) -> Node {
    let root = Node::mounted(host, "/", "Restdoc demo");

    root.get(
        "/ping",
        HandlerSpec::new(AxumHandler::new(|| async { "pong" }))
            .title("Ping")
            .description("Liveness check.")
            .example(Example::new(
                ExampleRequest::new(),
                ExpectedResponse::new().body("pong"),
            )),
    );

    let reset = {
        let store = Arc::clone(store);
        Hook::from_fn(move || {
            store.reset();
            Ok(())
        })
    };
    let users = Node::new(
        NodeConfig::new()
            .path("/users")
            .title("Users")
            .description("People known to the demo.")
            .before_each_test(reset)
            .parent(ParentRef::node(&root)),
    );

    users.get("", list_users(store));
    users.post("", create_user(store));
    users.get("/:id", show_user(store));

    root
}

fn list_users(store: &Arc<UserStore>) -> HandlerSpec<AxumHandler> {
    let store = Arc::clone(store);
    let handler = move || {
        let store = Arc::clone(&store);
        async move { Json(store.list()) }
    };

    HandlerSpec::new(AxumHandler::new(handler))
        .title("List users")
        .example(
            Example::new(
                ExampleRequest::new(),
                ExpectedResponse::new()
                    .header("content-type", "application/json")
                    .body_where(|body| body.contains("\"Ada\"") && body.contains("\"Grace\"")),
            )
            .with_title("seed users"),
        )
}

fn create_user(store: &Arc<UserStore>) -> HandlerSpec<AxumHandler> {
    let store = Arc::clone(store);
    let handler = move |Json(new_user): Json<NewUser>| {
        let store = Arc::clone(&store);
        async move { (StatusCode::CREATED, Json(store.create(new_user.name))) }
    };

    HandlerSpec::new(AxumHandler::new(handler))
        .title("Create user")
        .example(
            Example::new(
                ExampleRequest::new()
                    .header("Content-Type", "application/json")
                    .body(r#"{"name":"Linus"}"#),
                ExpectedResponse::new()
                    .status(201_u16)
                    .body(r#"{"id":3,"name":"Linus"}"#),
            )
            .with_title("next id after the seed users"),
        )
}

fn show_user(store: &Arc<UserStore>) -> HandlerSpec<AxumHandler> {
    let store = Arc::clone(store);
    let handler = move |Path(id): Path<u64>| {
        let store = Arc::clone(&store);
        async move {
            match store.find(id) {
                Some(user) => Json(user).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            }
        }
    };

    HandlerSpec::new(AxumHandler::new(handler))
        .title("Show user")
        .example(Example::new(
            ExampleRequest::new().url_parameter("id", "1"),
            ExpectedResponse::new().body(r#"{"id":1,"name":"Ada"}"#),
        ))
        .example(
            Example::new(
                ExampleRequest::new().url_parameter("id", "404"),
                ExpectedResponse::new().status(404_u16),
            )
            .with_title("unknown id"),
        )
}

/// Serves the demo API on `addr` and self-tests it once listening.
///
/// `GET /docs` returns the documentation tree as JSON.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(addr: SocketAddr) -> Result<(), Box<dyn Error + Send + Sync>> {
    let host = Arc::new(AxumHost::new());
    let store = Arc::new(UserStore::new());
    let api = build_api(Arc::clone(&host), &store);

    let docs = api.docs();
    let router = host
        .router()
        .route("/docs", get(move || async move { Json(docs) }));

    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(%local, examples = api.docs().example_count(), "restdoc demo listening");

    let probe = if local.ip().is_unspecified() {
        SocketAddr::from(([127, 0, 0, 1], local.port()))
    } else {
        local
    };
    tokio::spawn(async move {
        if let Err(e) = api.test(&format!("http://{probe}")).await {
            error!(error = %e, "self-test could not start");
        }
    });

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use restdoc_domain::HttpMethod;

    #[test]
    fn test_store_create_and_reset() {
        let store = UserStore::new();
        let user = store.create("Linus".to_string());
        assert_eq!(user.id, 3);
        assert_eq!(store.list().len(), 3);

        store.reset();
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.find(1).map(|u| u.name), Some("Ada".to_string()));
    }

    #[test]
    fn test_api_routes() {
        let host = Arc::new(AxumHost::new());
        let api = build_api(Arc::clone(&host), &Arc::new(UserStore::new()));

        assert_eq!(
            host.routes(),
            vec![
                (HttpMethod::Get, "/ping".to_string()),
                (HttpMethod::Get, "/users".to_string()),
                (HttpMethod::Post, "/users".to_string()),
                (HttpMethod::Get, "/users/:id".to_string()),
            ]
        );
        assert_eq!(api.docs().example_count(), 5);
    }
}
