//! Resource nodes and the handler export protocol.
//!
//! A node owns its children and its handler map and holds its parent
//! strongly, so an attached branch keeps its ancestors alive. Registering a handler exports it up the parent chain right away;
//! attaching a node re-exports its whole subtree. Together these make the
//! final host registrations independent of assembly order.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use restdoc_domain::{Example, HttpMethod, path};
use tracing::{debug, trace, warn};

use super::docs::{HandlerDoc, NodeDoc};
use super::host::{HostAdapter, RouteRegistrar};
use crate::error::TreeError;
use crate::testing::Hook;

/// Key under which a pathless child is stored in its parent's children map.
const ROOT_KEY: &str = "/";

/// Documentation, implementation and examples for one method at one node.
#[derive(Debug, Clone)]
pub struct HandlerSpec<H> {
    /// Short title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Opaque handler, only ever handed to the host.
    pub handler: H,
    /// Examples in declaration order.
    pub examples: Vec<Example>,
}

impl<H> HandlerSpec<H> {
    /// Creates a spec around a handler with no docs or examples.
    pub const fn new(handler: H) -> Self {
        Self {
            title: None,
            description: None,
            handler,
            examples: Vec::new(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an example.
    #[must_use]
    pub fn example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }
}

/// The parent a node is being attached to.
pub enum ParentRef<H> {
    /// Detach: the node keeps its handlers but exports nowhere.
    None,
    /// Another resource node.
    Node(ResourceNode<H>),
    /// A host framework terminating the export chain.
    Host(HostAdapter<H>),
}

impl<H> Clone for ParentRef<H> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Node(node) => Self::Node(node.clone()),
            Self::Host(host) => Self::Host(host.clone()),
        }
    }
}

impl<H> Default for ParentRef<H> {
    fn default() -> Self {
        Self::None
    }
}

impl<H> std::fmt::Debug for ParentRef<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Node(_) => f.write_str("Node(..)"),
            Self::Host(host) => f.debug_tuple("Host").field(host).finish(),
        }
    }
}

impl<H: 'static> ParentRef<H> {
    /// No parent.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Another node as parent.
    #[must_use]
    pub fn node(node: &ResourceNode<H>) -> Self {
        Self::Node(node.clone())
    }

    /// A host framework as parent.
    pub fn host<R: RouteRegistrar<H>>(registrar: Arc<R>) -> Self {
        Self::Host(HostAdapter::new(registrar))
    }
}

/// Construction-time configuration of a node.
pub struct NodeConfig<H> {
    /// Path relative to the parent; normalized on construction.
    pub path: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Hook run immediately before each example at this node.
    pub before_each_test: Option<Hook>,
    /// Hook run immediately after each example at this node.
    pub after_each_test: Option<Hook>,
    /// Where to attach the node once built.
    pub parent: ParentRef<H>,
}

impl<H> Default for NodeConfig<H> {
    fn default() -> Self {
        Self {
            path: None,
            title: None,
            description: None,
            before_each_test: None,
            after_each_test: None,
            parent: ParentRef::None,
        }
    }
}

impl<H> NodeConfig<H> {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the before-each hook.
    #[must_use]
    pub fn before_each_test(mut self, hook: Hook) -> Self {
        self.before_each_test = Some(hook);
        self
    }

    /// Sets the after-each hook.
    #[must_use]
    pub fn after_each_test(mut self, hook: Hook) -> Self {
        self.after_each_test = Some(hook);
        self
    }

    /// Sets the parent.
    #[must_use]
    pub fn parent(mut self, parent: ParentRef<H>) -> Self {
        self.parent = parent;
        self
    }
}

/// Base for [`ResourceNode::compose`]: an existing node or a configuration.
pub enum NodeSeed<H> {
    /// Reuse this node.
    Node(ResourceNode<H>),
    /// Build a fresh node from this configuration.
    Config(NodeConfig<H>),
}

enum Parent<H> {
    None,
    Node(ResourceNode<H>),
    Host(HostAdapter<H>),
}

impl<H> Clone for Parent<H> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Node(node) => Self::Node(node.clone()),
            Self::Host(host) => Self::Host(host.clone()),
        }
    }
}

struct NodeInner<H> {
    path: Option<String>,
    title: Option<String>,
    description: Option<String>,
    before_each_test: Option<Hook>,
    after_each_test: Option<Hook>,
    parent: Parent<H>,
    children: IndexMap<String, ResourceNode<H>>,
    handlers: IndexMap<HttpMethod, HandlerSpec<H>>,
}

impl<H> NodeInner<H> {
    fn empty(path: Option<String>) -> Self {
        Self {
            path,
            title: None,
            description: None,
            before_each_test: None,
            after_each_test: None,
            parent: Parent::None,
            children: IndexMap::new(),
            handlers: IndexMap::new(),
        }
    }
}

/// A unit of the API tree: one path prefix with its docs, handlers and
/// children.
///
/// `ResourceNode` is a cheap, shareable handle; clones refer to the same node.
///
/// Parent and child hold each other, so a tree stays alive for as long as
/// the process keeps any node of it. Detaching a node releases the link.
pub struct ResourceNode<H> {
    inner: Arc<RwLock<NodeInner<H>>>,
}

impl<H> Clone for ResourceNode<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> std::fmt::Debug for ResourceNode<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ResourceNode")
            .field("path", &inner.path)
            .field("title", &inner.title)
            .field("handlers", &inner.handlers.keys().collect::<Vec<_>>())
            .field("children", &inner.children.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<H: Clone + Send + Sync + 'static> Default for ResourceNode<H> {
    fn default() -> Self {
        Self::new(NodeConfig::default())
    }
}

impl<H: Clone + Send + Sync + 'static> ResourceNode<H> {
    /// Builds a node from a configuration and attaches it to the configured
    /// parent.
    #[must_use]
    pub fn new(config: NodeConfig<H>) -> Self {
        let NodeConfig {
            path,
            title,
            description,
            before_each_test,
            after_each_test,
            parent,
        } = config;

        let mut inner = NodeInner::empty(path.as_deref().and_then(|p| path::normalize(p, None)));
        inner.title = title;
        inner.description = description;
        inner.before_each_test = before_each_test;
        inner.after_each_test = after_each_test;

        let node = Self {
            inner: Arc::new(RwLock::new(inner)),
        };
        // A fresh node has no descendants, so it cannot close a cycle.
        node.link(parent);
        node
    }

    /// Builds a titled child of `parent` at `path`.
    #[must_use]
    pub fn child_of(parent: &Self, path: &str, title: impl Into<String>) -> Self {
        Self::new(
            NodeConfig::new()
                .path(path)
                .title(title)
                .parent(ParentRef::node(parent)),
        )
    }

    /// Builds a titled node at `path` mounted directly on a host framework.
    pub fn mounted<R: RouteRegistrar<H>>(host: Arc<R>, path: &str, title: impl Into<String>) -> Self {
        Self::new(
            NodeConfig::new()
                .path(path)
                .title(title)
                .parent(ParentRef::host(host)),
        )
    }

    /// Builds a node from optional overrides on top of an optional seed.
    ///
    /// The seed (an existing node or a configuration) is materialized first,
    /// then explicit `path`, `title` and `description` overrides are applied,
    /// and finally the node is attached to `parent` (falling back to the
    /// seed configuration's parent when `parent` is [`ParentRef::None`]).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Cycle`] if attaching a seed node to `parent`
    /// would make it its own ancestor.
    pub fn compose(
        parent: ParentRef<H>,
        path: Option<&str>,
        title: Option<&str>,
        description: Option<&str>,
        seed: Option<NodeSeed<H>>,
    ) -> Result<Self, TreeError> {
        let (node, seed_parent) = match seed {
            Some(NodeSeed::Node(node)) => (node, ParentRef::None),
            Some(NodeSeed::Config(mut config)) => {
                let seed_parent = std::mem::take(&mut config.parent);
                (Self::new(config), seed_parent)
            }
            None => (Self::new(NodeConfig::default()), ParentRef::None),
        };

        {
            let mut inner = node.inner.write();
            if let Some(title) = title {
                inner.title = Some(title.to_string());
            }
            if let Some(description) = description {
                inner.description = Some(description.to_string());
            }
        }
        if let Some(path) = path {
            node.set_path(path);
        }

        match (parent, seed_parent) {
            (ParentRef::None, ParentRef::None) => {}
            (ParentRef::None, seed_parent) => node.attach(seed_parent)?,
            (parent, _) => node.attach(parent)?,
        }
        Ok(node)
    }

    /// This node's own normalized path, `None` for the root.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        self.inner.read().path.clone()
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.inner.read().title.clone()
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.inner.read().description.clone()
    }

    /// The parent node, if this node is attached to one.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match &self.inner.read().parent {
            Parent::Node(node) => Some(node.clone()),
            Parent::None | Parent::Host(_) => None,
        }
    }

    /// Returns true if both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns true if the node exports somewhere (a node or a host).
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !matches!(self.inner.read().parent, Parent::None)
    }

    /// Normalized concatenation of every ancestor's path, root to this node.
    #[must_use]
    pub fn full_path(&self) -> Option<String> {
        let mut segments = vec![self.path()];
        let mut current = self.parent();
        while let Some(node) = current {
            segments.push(node.path());
            current = node.parent();
        }
        segments
            .iter()
            .rev()
            .fold(None, |acc, segment| path::join(acc.as_deref(), segment.as_deref()))
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.inner.read().children.values().cloned().collect()
    }

    /// Looks up a direct child by its (normalized) path.
    #[must_use]
    pub fn child(&self, path: &str) -> Option<Self> {
        let key = path::normalize(path, None).unwrap_or_else(|| ROOT_KEY.to_string());
        self.inner.read().children.get(&key).cloned()
    }

    /// Methods this node has own handlers for, in registration order.
    #[must_use]
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.inner.read().handlers.keys().copied().collect()
    }

    /// The handler spec for `method`, if any.
    #[must_use]
    pub fn handler(&self, method: HttpMethod) -> Option<HandlerSpec<H>> {
        self.inner.read().handlers.get(&method).cloned()
    }

    /// Hooks as `(before_each_test, after_each_test)`.
    #[must_use]
    pub fn hooks(&self) -> (Option<Hook>, Option<Hook>) {
        let inner = self.inner.read();
        (inner.before_each_test.clone(), inner.after_each_test.clone())
    }

    /// Own `(method, handler title, example)` triples, in registration order.
    #[must_use]
    pub fn examples(&self) -> Vec<(HttpMethod, Option<String>, Example)> {
        self.inner
            .read()
            .handlers
            .iter()
            .flat_map(|(method, spec)| {
                spec.examples
                    .iter()
                    .map(move |example| (*method, spec.title.clone(), example.clone()))
            })
            .collect()
    }

    /// Registers `spec` for `method` at `path` relative to this node.
    ///
    /// An empty or root `path` targets this node itself; any real sub-path
    /// lazily creates (or reuses) a child for it. Returns the node that ended
    /// up owning the handler.
    pub fn add_handler(&self, method: HttpMethod, path: &str, spec: HandlerSpec<H>) -> Self {
        if let Some(sub_path) = path::normalize(path, None) {
            let child = {
                let mut inner = self.inner.write();
                let parent = self.clone();
                inner
                    .children
                    .entry(sub_path.clone())
                    .or_insert_with(|| {
                        let mut child = NodeInner::empty(Some(sub_path));
                        child.parent = Parent::Node(parent);
                        Self {
                            inner: Arc::new(RwLock::new(child)),
                        }
                    })
                    .clone()
            };
            return child.add_handler(method, "", spec);
        }

        let handler = spec.handler.clone();
        self.inner.write().handlers.insert(method, spec);
        self.export_handler(method, None, handler);
        self.clone()
    }

    /// Shortcut for [`add_handler`](Self::add_handler) with GET.
    pub fn get(&self, path: &str, spec: HandlerSpec<H>) -> Self {
        self.add_handler(HttpMethod::Get, path, spec)
    }

    /// Shortcut for [`add_handler`](Self::add_handler) with POST.
    pub fn post(&self, path: &str, spec: HandlerSpec<H>) -> Self {
        self.add_handler(HttpMethod::Post, path, spec)
    }

    /// Shortcut for [`add_handler`](Self::add_handler) with PATCH.
    pub fn patch(&self, path: &str, spec: HandlerSpec<H>) -> Self {
        self.add_handler(HttpMethod::Patch, path, spec)
    }

    /// Shortcut for [`add_handler`](Self::add_handler) with PUT.
    pub fn put(&self, path: &str, spec: HandlerSpec<H>) -> Self {
        self.add_handler(HttpMethod::Put, path, spec)
    }

    /// Shortcut for [`add_handler`](Self::add_handler) with DELETE.
    pub fn delete(&self, path: &str, spec: HandlerSpec<H>) -> Self {
        self.add_handler(HttpMethod::Delete, path, spec)
    }

    /// Prefixes `path` with this node's path and forwards the registration
    /// to the parent. Without a parent this is a no-op; the handler stays
    /// buffered in the node that owns it.
    pub fn export_handler(&self, method: HttpMethod, path: Option<&str>, handler: H) {
        let (full, parent) = {
            let inner = self.inner.read();
            (path::join(inner.path.as_deref(), path), inner.parent.clone())
        };

        match parent {
            Parent::None => {
                trace!(%method, path = ?full, "no parent, registration stays buffered");
            }
            Parent::Node(node) => node.export_handler(method, full.as_deref(), handler),
            Parent::Host(host) => {
                let route = full.unwrap_or_else(|| ROOT_KEY.to_string());
                if let Err(e) = host.register(method, &route, handler) {
                    warn!(error = %e, "skipping route registration");
                }
            }
        }
    }

    /// Re-emits every handler owned by this node and its descendants through
    /// the export chain.
    pub fn export_all_handlers(&self) {
        let (handlers, children) = {
            let inner = self.inner.read();
            let handlers: Vec<(HttpMethod, H)> = inner
                .handlers
                .iter()
                .map(|(method, spec)| (*method, spec.handler.clone()))
                .collect();
            (handlers, inner.children.values().cloned().collect::<Vec<_>>())
        };

        for (method, handler) in handlers {
            self.export_handler(method, None, handler);
        }
        for child in children {
            child.export_all_handlers();
        }
    }

    /// Attaches this node to `parent` and re-exports its subtree.
    ///
    /// Attaching to the current parent is a no-op. Attaching to a node links
    /// both ways; attaching to a host makes it the end of the export chain;
    /// [`ParentRef::None`] detaches the node, which keeps its handlers.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Cycle`] if `parent` is this node or one of its
    /// descendants.
    pub fn attach(&self, parent: ParentRef<H>) -> Result<(), TreeError> {
        if let ParentRef::Node(candidate) = &parent {
            let mut ancestor = Some(candidate.clone());
            while let Some(node) = ancestor {
                if Arc::ptr_eq(&node.inner, &self.inner) {
                    return Err(TreeError::Cycle {
                        path: self.full_path().unwrap_or_else(|| ROOT_KEY.to_string()),
                    });
                }
                ancestor = node.parent();
            }
        }
        self.link(parent);
        Ok(())
    }

    fn link(&self, parent: ParentRef<H>) {
        let previous = self.inner.read().parent.clone();
        if same_parent(&previous, &parent) {
            return;
        }
        self.forget_in(&previous);

        match parent {
            ParentRef::None => {
                self.inner.write().parent = Parent::None;
                debug!(path = ?self.path(), "detached node");
            }
            ParentRef::Node(node) => {
                self.inner.write().parent = Parent::Node(node.clone());
                let key = self.key();
                let replaced = node.inner.write().children.insert(key.clone(), self.clone());
                if let Some(replaced) = replaced.filter(|old| !Arc::ptr_eq(&old.inner, &self.inner)) {
                    warn!(key, "replacing an existing child with the same path");
                    replaced.inner.write().parent = Parent::None;
                }
                debug!(key, "attached node to parent node");
                self.export_all_handlers();
            }
            ParentRef::Host(host) => {
                self.inner.write().parent = Parent::Host(host);
                debug!(path = ?self.path(), "mounted node on host");
                self.export_all_handlers();
            }
        }
    }

    /// Changes the node's own path, re-keying it under its parent node and
    /// re-exporting its subtree.
    fn set_path(&self, path: &str) {
        let normalized = path::normalize(path, None);
        let old_key = self.key();
        self.inner.write().path = normalized;

        if let Some(parent) = self.parent() {
            let mut inner = parent.inner.write();
            inner.children.shift_remove(&old_key);
            inner.children.insert(self.key(), self.clone());
        }
        if self.is_attached() {
            self.export_all_handlers();
        }
    }

    fn forget_in(&self, previous: &Parent<H>) {
        if let Parent::Node(parent) = previous {
            parent
                .inner
                .write()
                .children
                .retain(|_, child| !Arc::ptr_eq(&child.inner, &self.inner));
        }
    }

    fn key(&self) -> String {
        self.path().unwrap_or_else(|| ROOT_KEY.to_string())
    }

    /// Documentation surface of this node and its subtree.
    #[must_use]
    pub fn docs(&self) -> NodeDoc {
        self.docs_under(self.parent().and_then(|p| p.full_path()).as_deref())
    }

    fn docs_under(&self, parent_full_path: Option<&str>) -> NodeDoc {
        let inner = self.inner.read();
        let full_path = path::join(parent_full_path, inner.path.as_deref());
        let handlers = inner
            .handlers
            .iter()
            .map(|(method, spec)| HandlerDoc {
                method: *method,
                title: spec.title.clone(),
                description: spec.description.clone(),
                examples: spec.examples.clone(),
            })
            .collect();
        let children: Vec<Self> = inner.children.values().cloned().collect();
        let doc = NodeDoc {
            path: inner.path.clone(),
            full_path: full_path.clone(),
            title: inner.title.clone(),
            description: inner.description.clone(),
            handlers,
            children: Vec::new(),
        };
        drop(inner);

        NodeDoc {
            children: children
                .iter()
                .map(|child| child.docs_under(full_path.as_deref()))
                .collect(),
            ..doc
        }
    }
}

fn same_parent<H: 'static>(current: &Parent<H>, next: &ParentRef<H>) -> bool {
    match (current, next) {
        (Parent::None, ParentRef::None) => true,
        (Parent::Node(current), ParentRef::Node(next)) => Arc::ptr_eq(&current.inner, &next.inner),
        (Parent::Host(current), ParentRef::Host(next)) => current.same_host(next),
        _ => false,
    }
}
