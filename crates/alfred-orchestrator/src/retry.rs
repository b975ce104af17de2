//! Retry wrapper for the graph knowledge store.

use std::future::Future;
use std::sync::Arc;

use alfred_protocols::{GraphError, GraphRow, GraphStore, RetryPolicy, ValueMap};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Graph store wrapper that retries transient failures.
///
/// Uses the same [`RetryPolicy`] as step dispatch. Errors that are not
/// [transient](GraphError::is_transient) are returned immediately.
pub struct RetryGraphStore {
    inner: Arc<dyn GraphStore>,
    policy: RetryPolicy,
}

impl RetryGraphStore {
    pub fn new(store: Arc<dyn GraphStore>, policy: RetryPolicy) -> Self {
        Self {
            inner: store,
            policy,
        }
    }

    /// Execute with retry.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, GraphError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GraphError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_transient() || !self.policy.allows_retry(attempt) {
                        return Err(e);
                    }

                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        "Graph {} failed (attempt {}/{}): {}, retrying in {:?}",
                        operation_name, attempt, self.policy.max_attempts, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Get inner store.
    pub fn inner(&self) -> &Arc<dyn GraphStore> {
        &self.inner
    }
}

#[async_trait]
impl GraphStore for RetryGraphStore {
    async fn create_node(&self, label: &str, properties: ValueMap) -> Result<String, GraphError> {
        debug!("Creating graph node with label '{}'", label);
        self.with_retry("create_node", || {
            let store = self.inner.clone();
            let properties = properties.clone();
            async move { store.create_node(label, properties).await }
        })
        .await
    }

    async fn create_relationship(
        &self,
        source_id: &str,
        target_id: &str,
        relationship_type: &str,
        properties: ValueMap,
    ) -> Result<String, GraphError> {
        self.with_retry("create_relationship", || {
            let store = self.inner.clone();
            let properties = properties.clone();
            async move {
                store
                    .create_relationship(source_id, target_id, relationship_type, properties)
                    .await
            }
        })
        .await
    }

    async fn query(&self, query: &str, parameters: ValueMap) -> Result<Vec<GraphRow>, GraphError> {
        self.with_retry("query", || {
            let store = self.inner.clone();
            let parameters = parameters.clone();
            async move { store.query(query, parameters).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FlakyStore {
        calls: AtomicU32,
        fail_times: u32,
        error: fn() -> GraphError,
    }

    impl FlakyStore {
        fn new(fail_times: u32, error: fn() -> GraphError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail_times,
                error,
            })
        }

        fn step(&self) -> Result<(), GraphError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_times {
                Err((self.error)())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl GraphStore for FlakyStore {
        async fn create_node(&self, label: &str, _properties: ValueMap) -> Result<String, GraphError> {
            self.step()?;
            Ok(format!("{}:1", label))
        }

        async fn create_relationship(
            &self,
            source_id: &str,
            target_id: &str,
            _relationship_type: &str,
            _properties: ValueMap,
        ) -> Result<String, GraphError> {
            self.step()?;
            Ok(format!("{}->{}", source_id, target_id))
        }

        async fn query(&self, _query: &str, _parameters: ValueMap) -> Result<Vec<GraphRow>, GraphError> {
            self.step()?;
            Ok(vec![ValueMap::new()])
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(max_attempts)
            .with_base_delay(Duration::from_millis(1))
    }

    fn connection_error() -> GraphError {
        GraphError::Connection("refused".to_string())
    }

    fn query_error() -> GraphError {
        GraphError::InvalidQuery("syntax".to_string())
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let flaky = FlakyStore::new(2, connection_error);
        let store = RetryGraphStore::new(flaky.clone(), fast_policy(3));

        let id = store.create_node("Person", ValueMap::new()).await.unwrap();
        assert_eq!(id, "Person:1");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let flaky = FlakyStore::new(10, connection_error);
        let store = RetryGraphStore::new(flaky.clone(), fast_policy(3));

        let err = store.query("Person", ValueMap::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::Connection(_)));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let flaky = FlakyStore::new(10, query_error);
        let store = RetryGraphStore::new(flaky.clone(), fast_policy(5));

        let err = store.query("MATCH (", ValueMap::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidQuery(_)));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relationship_passthrough() {
        let flaky = FlakyStore::new(0, connection_error);
        let store = RetryGraphStore::new(flaky, fast_policy(1));

        let id = store
            .create_relationship("a", "b", "KNOWS", ValueMap::new())
            .await
            .unwrap();
        assert_eq!(id, "a->b");
    }
}
