//! Self-test orchestration over a resource subtree.
//!
//! A run snapshots the subtree into a [`NodePlan`], then walks it: each
//! node's own examples run one at a time (bracketed by that node's hooks)
//! while sibling subtrees run concurrently. Outcomes stream into a single
//! channel and are folded into one [`TestReport`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use restdoc_domain::{ExampleOutcome, TestReport, path};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::config::TestConfig;
use super::hooks::{Hook, HookError};
use super::plan::{ExampleTask, NodePlan};
use super::runner::ExampleTestRunner;
use crate::error::{HookStage, TestRunError, TestRunResult};
use crate::ports::ExampleClient;
use crate::tree::ResourceNode;

type NodeRun = Pin<Box<dyn Future<Output = TestRunResult<()>> + Send>>;

/// Result of a self-test run.
///
/// `error` is set when a structural fault (bad base URL, failing hook)
/// stopped the run; `report` then holds whatever completed before it.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// Structural fault that aborted the run, if any.
    pub error: Option<TestRunError>,
    /// Aggregated outcomes.
    pub report: TestReport,
}

impl TestOutcome {
    const fn completed(report: TestReport) -> Self {
        Self { error: None, report }
    }

    const fn aborted(error: TestRunError, report: TestReport) -> Self {
        Self {
            error: Some(error),
            report,
        }
    }

    /// Returns true if the run completed and every example passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.report.all_passed()
    }
}

/// Drives self-test runs through an [`ExampleClient`].
#[derive(Debug)]
pub struct TestOrchestrator<C> {
    runner: Arc<ExampleTestRunner<C>>,
    config: TestConfig,
}

impl<C: ExampleClient> TestOrchestrator<C> {
    /// Creates an orchestrator sending requests through `client`.
    pub fn new(client: C, config: TestConfig) -> Self {
        Self {
            runner: Arc::new(ExampleTestRunner::new(client, config.timeout())),
            config,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Runs every example in `node`'s subtree against `base_url`.
    ///
    /// `base_url` addresses `node` itself; descendants are reached by
    /// appending their paths relative to `node`.
    pub async fn test<H>(&self, node: &ResourceNode<H>, base_url: &str) -> TestOutcome
    where
        H: Clone + Send + Sync + 'static,
    {
        let plan = NodePlan::schedule(node, &mut self.config.rng());
        self.run(plan, base_url).await
    }

    /// Like [`test`](Self::test), then hands the result to `callback`.
    pub async fn test_with<H, F>(&self, node: &ResourceNode<H>, base_url: &str, callback: F) -> TestOutcome
    where
        H: Clone + Send + Sync + 'static,
        F: FnOnce(Option<&TestRunError>, &TestReport),
    {
        let outcome = self.test(node, base_url).await;
        callback(outcome.error.as_ref(), &outcome.report);
        outcome
    }

    /// Executes an already scheduled plan.
    pub async fn run(&self, plan: NodePlan, base_url: &str) -> TestOutcome {
        let total = plan.total;

        if let Err(e) = path::validate_base_url(base_url) {
            warn!(base_url, error = %e, "self-test not started");
            return TestOutcome::aborted(e.into(), TestReport::with_total(total));
        }
        if total == 0 {
            info!(base_url, "no examples to run");
            return TestOutcome::completed(TestReport::with_total(0));
        }

        info!(base_url, total, "starting self-test");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = run_node(Arc::clone(&self.runner), plan, Arc::from(base_url), tx).await;

        let mut report = TestReport::with_total(total);
        while let Ok(outcome) = rx.try_recv() {
            report.record(outcome);
        }

        match result {
            Ok(()) => {
                if !report.is_complete() {
                    warn!(completed = report.completed(), total, "some examples never reported");
                }
                TestOutcome::completed(report)
            }
            Err(fault) => {
                warn!(error = %fault, completed = report.completed(), total, "self-test aborted");
                TestOutcome::aborted(fault, report)
            }
        }
    }
}

fn run_node<C: ExampleClient>(
    runner: Arc<ExampleTestRunner<C>>,
    plan: NodePlan,
    base_url: Arc<str>,
    results: UnboundedSender<ExampleOutcome>,
) -> NodeRun {
    Box::pin(async move {
        let NodePlan {
            full_path,
            before_each_test,
            after_each_test,
            tasks,
            children,
            ..
        } = plan;

        let mut subruns: JoinSet<TestRunResult<()>> = JoinSet::new();
        for child in children.into_iter().filter(|child| child.total > 0) {
            subruns.spawn(run_node(
                Arc::clone(&runner),
                child,
                Arc::clone(&base_url),
                results.clone(),
            ));
        }
        if !tasks.is_empty() {
            let hooks = NodeHooks {
                node: full_path.unwrap_or_else(|| "/".to_string()),
                before: before_each_test,
                after: after_each_test,
            };
            subruns.spawn(run_own(runner, tasks, hooks, base_url, results));
        }

        while let Some(joined) = subruns.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(fault)) => {
                    subruns.abort_all();
                    return Err(fault);
                }
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => debug!(error = %e, "subrun cancelled"),
            }
        }
        Ok(())
    })
}

struct NodeHooks {
    node: String,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl NodeHooks {
    async fn call(&self, stage: HookStage) -> TestRunResult<()> {
        let hook = match stage {
            HookStage::BeforeEach => &self.before,
            HookStage::AfterEach => &self.after,
        };
        match hook {
            Some(hook) => hook.call().await.map_err(|e| self.fault(stage, &e)),
            None => Ok(()),
        }
    }

    fn fault(&self, stage: HookStage, error: &HookError) -> TestRunError {
        TestRunError::Hook {
            stage,
            node: self.node.clone(),
            message: error.to_string(),
        }
    }
}

async fn run_own<C: ExampleClient>(
    runner: Arc<ExampleTestRunner<C>>,
    tasks: Vec<ExampleTask>,
    hooks: NodeHooks,
    base_url: Arc<str>,
    results: UnboundedSender<ExampleOutcome>,
) -> TestRunResult<()> {
    for task in tasks {
        hooks.call(HookStage::BeforeEach).await?;
        let outcome = runner.run(&base_url, &task).await;
        if results.send(outcome).is_err() {
            debug!(node = %hooks.node, "report closed, dropping outcome");
        }
        hooks.call(HookStage::AfterEach).await?;
    }
    Ok(())
}

/// Default completion callback: logs the counts and dumps each failure as
/// pretty JSON.
pub fn log_outcome(error: Option<&TestRunError>, report: &TestReport) {
    if let Some(error) = error {
        error!(%error, "self-test did not complete");
    }
    info!(
        passed = report.passed.len(),
        failed = report.failed.len(),
        total = report.total,
        "self-test finished"
    );
    for failure in &report.failed {
        match serde_json::to_string_pretty(failure) {
            Ok(dump) => warn!("example failed:\n{dump}"),
            Err(e) => warn!(error = %e, "example failed (unserializable)"),
        }
    }
}
