#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use restdoc_domain::{Example, ExampleRequest, ExpectedResponse, HttpMethod};

use super::*;
use crate::error::TreeError;

type Node = ResourceNode<&'static str>;

fn spec(handler: &'static str) -> HandlerSpec<&'static str> {
    HandlerSpec::new(handler).title(handler)
}

fn routes(host: &RecordingHost<&'static str>) -> Vec<(HttpMethod, String)> {
    host.registrations()
}

#[test]
fn test_handler_on_attached_node_exports_immediately() {
    let host = Arc::new(RecordingHost::new());
    let api = Node::mounted(Arc::clone(&host), "/api", "API");

    api.get("/ping", spec("ping"));

    assert_eq!(routes(&host), vec![(HttpMethod::Get, "/api/ping".to_string())]);
    assert_eq!(host.handler(HttpMethod::Get, "/api/ping"), Some("ping"));
}

#[test]
fn test_unattached_node_buffers_until_attached() {
    let host = Arc::new(RecordingHost::new());
    let users = Node::new(NodeConfig::new().path("users"));
    users.get("", spec("list"));
    users.post("/", spec("create"));
    users.get("/:id", spec("show"));

    assert!(!users.is_attached());
    assert_eq!(host.calls(), 0);

    let api = Node::mounted(Arc::clone(&host), "/api", "API");
    users.attach(ParentRef::node(&api)).unwrap();

    assert_eq!(
        routes(&host),
        vec![
            (HttpMethod::Get, "/api/users".to_string()),
            (HttpMethod::Get, "/api/users/:id".to_string()),
            (HttpMethod::Post, "/api/users".to_string()),
        ]
    );
}

#[test]
fn test_assembly_order_does_not_change_registrations() {
    let build_leaf = || {
        let leaf = Node::new(NodeConfig::new().path("/items"));
        leaf.get("", spec("list"));
        leaf.delete("/:id", spec("remove"));
        leaf
    };

    // attach first, populate later
    let host_a = Arc::new(RecordingHost::new());
    let root_a = Node::new(NodeConfig::new().path("/v1"));
    let leaf_a = Node::new(NodeConfig::new().path("/items"));
    leaf_a.attach(ParentRef::node(&root_a)).unwrap();
    root_a.attach(ParentRef::host(Arc::clone(&host_a))).unwrap();
    leaf_a.get("", spec("list"));
    leaf_a.delete("/:id", spec("remove"));

    // populate first, attach bottom-up
    let host_b = Arc::new(RecordingHost::new());
    let root_b = Node::new(NodeConfig::new().path("/v1"));
    build_leaf().attach(ParentRef::node(&root_b)).unwrap();
    root_b.attach(ParentRef::host(Arc::clone(&host_b))).unwrap();

    // populate first, mount root first
    let host_c = Arc::new(RecordingHost::new());
    let root_c = Node::mounted(Arc::clone(&host_c), "/v1", "v1");
    build_leaf().attach(ParentRef::node(&root_c)).unwrap();

    assert_eq!(routes(&host_a), routes(&host_b));
    assert_eq!(routes(&host_b), routes(&host_c));
    assert_eq!(
        routes(&host_a),
        vec![
            (HttpMethod::Get, "/v1/items".to_string()),
            (HttpMethod::Delete, "/v1/items/:id".to_string()),
        ]
    );
}

#[test]
fn test_full_path_is_concatenation_of_ancestors() {
    let root = Node::new(NodeConfig::new().path("/api/"));
    let users = Node::child_of(&root, "users", "Users");
    let user = Node::child_of(&users, "//:id", "User");

    assert_eq!(root.full_path().as_deref(), Some("/api"));
    assert_eq!(users.full_path().as_deref(), Some("/api/users"));
    assert_eq!(user.full_path().as_deref(), Some("/api/users/:id"));

    // attaching the middle node elsewhere moves the whole branch
    let v2 = Node::new(NodeConfig::new().path("/v2"));
    users.attach(ParentRef::node(&v2)).unwrap();
    assert_eq!(user.full_path().as_deref(), Some("/v2/users/:id"));
    assert!(root.child("users").is_none());
    assert!(v2.child("/users").is_some());
}

#[test]
fn test_root_path_is_none() {
    let root = Node::new(NodeConfig::new().path("/"));
    assert_eq!(root.path(), None);
    assert_eq!(root.full_path(), None);

    let host = Arc::new(RecordingHost::new());
    root.attach(ParentRef::host(Arc::clone(&host))).unwrap();
    root.get("", spec("index"));
    assert_eq!(routes(&host), vec![(HttpMethod::Get, "/".to_string())]);
}

#[test]
fn test_sub_path_children_are_reused() {
    let root = Node::default();
    let first = root.get("/users", spec("list"));
    let second = root.post("users/", spec("create"));

    assert!(first.ptr_eq(&second));
    assert_eq!(root.children().len(), 1);
    assert_eq!(first.methods(), vec![HttpMethod::Get, HttpMethod::Post]);
    assert!(root.methods().is_empty());
}

#[test]
fn test_same_parent_is_noop() {
    let host = Arc::new(RecordingHost::new());
    let api = Node::mounted(Arc::clone(&host), "/api", "API");
    api.get("/ping", spec("ping"));
    let calls = host.calls();

    api.attach(ParentRef::host(Arc::clone(&host))).unwrap();
    assert_eq!(host.calls(), calls);

    let other = Arc::new(RecordingHost::new());
    api.attach(ParentRef::host(Arc::clone(&other))).unwrap();
    assert_eq!(other.calls(), 1);
}

#[test]
fn test_detach_keeps_handlers() {
    let host = Arc::new(RecordingHost::new());
    let api = Node::mounted(Arc::clone(&host), "/api", "API");
    api.get("", spec("index"));
    api.attach(ParentRef::none()).unwrap();

    assert!(!api.is_attached());
    api.post("", spec("create"));
    assert_eq!(routes(&host), vec![(HttpMethod::Get, "/api".to_string())]);
    assert_eq!(api.methods(), vec![HttpMethod::Get, HttpMethod::Post]);
}

#[test]
fn test_attach_rejects_cycles() {
    let root = Node::new(NodeConfig::new().path("/a"));
    let child = Node::child_of(&root, "/b", "b");

    let result = root.attach(ParentRef::node(&child));
    assert_eq!(
        result,
        Err(TreeError::Cycle {
            path: "/a".to_string()
        })
    );
    assert!(root.attach(ParentRef::node(&root)).is_err());
}

#[test]
fn test_compose_overrides_win_over_seed() {
    let host = Arc::new(RecordingHost::new());
    let seed = NodeConfig::new()
        .path("/seed")
        .title("Seed title")
        .description("Seed description");

    let node = Node::compose(
        ParentRef::host(Arc::clone(&host)),
        Some("/override"),
        Some("Override title"),
        None,
        Some(NodeSeed::Config(seed)),
    )
    .unwrap();
    node.get("", spec("index"));

    assert_eq!(node.path().as_deref(), Some("/override"));
    assert_eq!(node.title().as_deref(), Some("Override title"));
    assert_eq!(node.description().as_deref(), Some("Seed description"));
    assert_eq!(routes(&host), vec![(HttpMethod::Get, "/override".to_string())]);
}

#[test]
fn test_compose_reuses_seed_node() {
    let parent = Node::new(NodeConfig::new().path("/api"));
    let existing = Node::new(NodeConfig::new().path("/old").title("Old"));
    existing.get("", spec("index"));

    let node = Node::compose(
        ParentRef::node(&parent),
        Some("/new"),
        None,
        Some("Described"),
        Some(NodeSeed::Node(existing.clone())),
    )
    .unwrap();

    assert_eq!(node.title().as_deref(), Some("Old"));
    assert_eq!(node.description().as_deref(), Some("Described"));
    assert_eq!(existing.full_path().as_deref(), Some("/api/new"));
    assert!(parent.child("/new").is_some());
}

#[test]
fn test_docs_surface() {
    let root = Node::new(NodeConfig::new().title("Root"));
    root.get(
        "/ping",
        spec("ping").description("Health check").example(Example::new(
            ExampleRequest::new(),
            ExpectedResponse::new().body("pong"),
        )),
    );
    root.get("/users", spec("list"));
    root.post("/users", spec("create"));

    let docs = root.docs();
    assert_eq!(docs.title.as_deref(), Some("Root"));
    assert!(docs.handlers.is_empty());
    assert_eq!(docs.children.len(), 2);
    assert_eq!(docs.children[0].full_path.as_deref(), Some("/ping"));
    assert_eq!(docs.children[0].handlers[0].description.as_deref(), Some("Health check"));
    assert_eq!(docs.children[1].handlers.len(), 2);
    assert_eq!(docs.example_count(), 1);
    assert_eq!(docs.walk().count(), 3);
}

#[test]
fn test_child_keeps_ancestors_alive() {
    let host = Arc::new(RecordingHost::new());
    let users = {
        let api = Node::mounted(Arc::clone(&host), "/api", "API");
        Node::child_of(&api, "/users", "Users")
    };

    users.get("", spec("list"));

    assert_eq!(users.full_path().as_deref(), Some("/api/users"));
    assert_eq!(users.parent().and_then(|p| p.title()).as_deref(), Some("API"));
    assert_eq!(routes(&host), vec![(HttpMethod::Get, "/api/users".to_string())]);
}

#[test]
fn test_attach_replaces_child_with_same_path() {
    let host = Arc::new(RecordingHost::new());
    let api = Node::mounted(Arc::clone(&host), "/api", "API");
    let old = Node::child_of(&api, "/users", "Old");
    old.get("", spec("old list"));

    let new = Node::new(NodeConfig::new().path("users").title("New"));
    new.get("", spec("list"));
    new.attach(ParentRef::node(&api)).unwrap();

    assert!(!old.is_attached());
    assert!(old.parent().is_none());
    assert_eq!(api.children().len(), 1);
    assert!(api.child("/users").unwrap().ptr_eq(&new));
    assert_eq!(host.handler(HttpMethod::Get, "/api/users"), Some("list"));

    // the replaced node no longer exports
    old.post("", spec("stale"));
    assert_eq!(host.handler(HttpMethod::Post, "/api/users"), None);
}

/// Host exposing only the mandatory verbs.
#[derive(Default)]
struct ReadOnlyHost {
    seen: Mutex<Vec<String>>,
}

impl RouteRegistrar<&'static str> for ReadOnlyHost {
    fn get(&self, path: &str, handler: &'static str) {
        self.seen.lock().push(format!("get {path} {handler}"));
    }

    fn post(&self, path: &str, handler: &'static str) {
        self.seen.lock().push(format!("post {path} {handler}"));
    }

    fn put(&self, path: &str, handler: &'static str) {
        self.seen.lock().push(format!("put {path} {handler}"));
    }
}

#[test]
fn test_unsupported_verb_is_skipped_during_export() {
    let host = Arc::new(ReadOnlyHost::default());
    let api = Node::mounted(Arc::clone(&host), "/api", "API");

    let users = api.patch("/users", spec("update"));
    api.delete("/users", spec("remove"));
    api.get("/users", spec("list"));

    assert_eq!(*host.seen.lock(), vec!["get /api/users list".to_string()]);
    assert_eq!(
        users.methods(),
        vec![HttpMethod::Patch, HttpMethod::Delete, HttpMethod::Get]
    );
}
