//! Before/after hooks bracketing each example at a node.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Error a hook reports when it cannot resume the run.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a hook; resolving it resumes the orchestrator.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send>>;

/// An async callback run immediately before or after each example.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn() -> HookFuture + Send + Sync>);

impl Hook {
    /// Wraps an async closure.
    ///
    /// ```
    /// use restdoc_application::testing::Hook;
    ///
    /// let hook = Hook::new(|| async { Ok(()) });
    /// # let _ = hook;
    /// ```
    pub fn new<F, Fut>(hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Self(Arc::new(move || -> HookFuture { Box::pin(hook()) }))
    }

    /// Wraps a synchronous closure.
    pub fn from_fn<F>(hook: F) -> Self
    where
        F: Fn() -> Result<(), HookError> + Send + Sync + 'static,
    {
        let hook = Arc::new(hook);
        Self(Arc::new(move || -> HookFuture {
            let hook = Arc::clone(&hook);
            Box::pin(async move { hook() })
        }))
    }

    /// Runs the hook and waits for it to resume.
    ///
    /// # Errors
    ///
    /// Propagates the hook's own error.
    pub async fn call(&self) -> Result<(), HookError> {
        (self.0)().await
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_async_hook_runs() {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = {
            let count = Arc::clone(&count);
            Hook::new(move || {
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        assert!(hook.call().await.is_ok());
        assert!(hook.call().await.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sync_hook_error_propagates() {
        let hook = Hook::from_fn(|| Err("database unavailable".into()));
        let err = hook.call().await.err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("database unavailable"));
    }
}
