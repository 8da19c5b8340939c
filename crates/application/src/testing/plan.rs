//! Immutable snapshot of a tree, scheduled for one run.
//!
//! The plan is taken synchronously before any request is issued, so the run
//! never touches the live tree.

use rand::Rng;
use rand::seq::SliceRandom;
use restdoc_domain::{Example, HttpMethod, path};

use super::Hook;
use crate::tree::ResourceNode;

/// One example to run at one node.
#[derive(Debug, Clone)]
pub struct ExampleTask {
    /// HTTP method of the handler.
    pub method: HttpMethod,
    /// Handler title, for reports.
    pub handler: Option<String>,
    /// Path template from the tested node down to this node.
    pub route: Option<String>,
    /// Path template from the tree root, for reports.
    pub full_path: Option<String>,
    /// The fixture.
    pub example: Example,
}

/// A node with its tasks in run order and its children.
#[derive(Debug, Clone)]
pub struct NodePlan {
    /// Path template from the tested node down to this node.
    pub route: Option<String>,
    /// Path from the tree root.
    pub full_path: Option<String>,
    /// Hook run before each of this node's examples.
    pub before_each_test: Option<Hook>,
    /// Hook run after each of this node's examples.
    pub after_each_test: Option<Hook>,
    /// Own tasks, already shuffled.
    pub tasks: Vec<ExampleTask>,
    /// Child plans.
    pub children: Vec<NodePlan>,
    /// Own task count plus every descendant's.
    pub total: usize,
}

impl NodePlan {
    /// Snapshots `node` and its subtree, shuffling each node's own tasks.
    pub fn schedule<H, R>(node: &ResourceNode<H>, rng: &mut R) -> Self
    where
        H: Clone + Send + Sync + 'static,
        R: Rng + ?Sized,
    {
        Self::schedule_at(node, None, node.full_path(), rng)
    }

    fn schedule_at<H, R>(
        node: &ResourceNode<H>,
        route: Option<String>,
        full_path: Option<String>,
        rng: &mut R,
    ) -> Self
    where
        H: Clone + Send + Sync + 'static,
        R: Rng + ?Sized,
    {
        let mut tasks: Vec<ExampleTask> = node
            .examples()
            .into_iter()
            .map(|(method, handler, example)| ExampleTask {
                method,
                handler,
                route: route.clone(),
                full_path: full_path.clone(),
                example,
            })
            .collect();
        tasks.shuffle(rng);

        let children: Vec<Self> = node
            .children()
            .iter()
            .map(|child| {
                let child_path = child.path();
                Self::schedule_at(
                    child,
                    path::join(route.as_deref(), child_path.as_deref()),
                    path::join(full_path.as_deref(), child_path.as_deref()),
                    rng,
                )
            })
            .collect();

        let (before_each_test, after_each_test) = node.hooks();
        let total = tasks.len() + children.iter().map(|c| c.total).sum::<usize>();

        Self {
            route,
            full_path,
            before_each_test,
            after_each_test,
            tasks,
            children,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{HandlerSpec, NodeConfig};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use restdoc_domain::{ExampleRequest, ExpectedResponse};

    fn example(tag: &str) -> Example {
        Example::new(ExampleRequest::new(), ExpectedResponse::new()).with_title(tag)
    }

    #[test]
    fn test_schedule_counts_and_routes() {
        let root = ResourceNode::<u8>::new(NodeConfig::new().path("/api"));
        root.get("", HandlerSpec::new(0).example(example("a")).example(example("b")));
        root.get("/users", HandlerSpec::new(1).example(example("c")));
        root.get("/users/:id", HandlerSpec::new(2).example(example("d")));
        root.get("/empty", HandlerSpec::new(3));

        let plan = NodePlan::schedule(&root, &mut StdRng::seed_from_u64(1));
        assert_eq!(plan.total, 4);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.route, None);
        assert_eq!(plan.full_path.as_deref(), Some("/api"));

        let users = &plan.children[0];
        assert_eq!(users.route.as_deref(), Some("/users"));
        assert_eq!(users.full_path.as_deref(), Some("/api/users"));
        assert_eq!(users.total, 1);
        assert!(users.children.is_empty());

        let user = &plan.children[1];
        assert_eq!(user.tasks[0].route.as_deref(), Some("/users/:id"));
        assert_eq!(user.tasks[0].full_path.as_deref(), Some("/api/users/:id"));
        assert_eq!(plan.children[2].total, 0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let root = ResourceNode::<u8>::default();
        let mut spec = HandlerSpec::new(0);
        for i in 0..20 {
            spec = spec.example(example(&i.to_string()));
        }
        root.post("", spec);

        let plan = NodePlan::schedule(&root, &mut StdRng::seed_from_u64(42));
        let mut titles: Vec<u32> = plan
            .tasks
            .iter()
            .filter_map(|t| t.example.title.as_deref()?.parse().ok())
            .collect();
        titles.sort_unstable();
        assert_eq!(titles, (0..20).collect::<Vec<_>>());

        let again = NodePlan::schedule(&root, &mut StdRng::seed_from_u64(42));
        let order = |p: &NodePlan| -> Vec<Option<String>> {
            p.tasks.iter().map(|t| t.example.title.clone()).collect()
        };
        assert_eq!(order(&plan), order(&again));
    }
}
