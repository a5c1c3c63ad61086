//! Resilience policies for the Document Library client.
//!
//! A [`RequestPolicy`] wraps the sending of one request. It receives a
//! [`SendThunk`] that performs a single attempt each time it is invoked and
//! decides how often to invoke it. Policies are configured per operation
//! through a [`PolicyMap`] that is fixed when the client is built.

mod circuit_breaker;
mod retry;

pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};
pub use retry::{RetryConfig, RetryPolicy};

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::Operation;
use crate::errors::DocumentLibraryResult;
use crate::transport::HttpResponse;

/// The future of a single attempt.
pub type SendFuture = BoxFuture<'static, DocumentLibraryResult<HttpResponse>>;

/// Performs one attempt of a request each time it is called.
#[derive(Clone)]
pub struct SendThunk(Arc<dyn Fn() -> SendFuture + Send + Sync>);

impl SendThunk {
    /// Wraps an attempt factory.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> SendFuture + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Starts a new attempt.
    pub fn send(&self) -> SendFuture {
        (self.0)()
    }
}

impl fmt::Debug for SendThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendThunk")
    }
}

/// Per-call information handed to a policy.
#[derive(Debug, Clone)]
pub struct PolicyContext {
    /// The operation being executed.
    pub operation: Operation,
    /// Fires when the caller gives up on the call.
    pub cancellation: CancellationToken,
}

impl PolicyContext {
    /// Creates a context for one call.
    pub fn new(operation: Operation, cancellation: CancellationToken) -> Self {
        Self {
            operation,
            cancellation,
        }
    }
}

/// Strategy wrapping the network call of one operation.
///
/// Implementations may be shared by concurrent calls and must keep per-call
/// state on the stack of [`execute`](RequestPolicy::execute).
#[async_trait]
pub trait RequestPolicy: Send + Sync {
    /// Runs the request, invoking `send` once per attempt.
    async fn execute(
        &self,
        context: &PolicyContext,
        send: SendThunk,
    ) -> DocumentLibraryResult<HttpResponse>;
}

/// Applies several policies, the first one outermost.
#[derive(Clone, Default)]
pub struct PolicyChain {
    policies: Vec<Arc<dyn RequestPolicy>>,
}

impl PolicyChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a policy inside the ones already added.
    #[must_use]
    pub fn then(mut self, policy: impl RequestPolicy + 'static) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }
}

#[async_trait]
impl RequestPolicy for PolicyChain {
    async fn execute(
        &self,
        context: &PolicyContext,
        send: SendThunk,
    ) -> DocumentLibraryResult<HttpResponse> {
        let mut thunk = send;

        for policy in self.policies.iter().rev() {
            let policy = Arc::clone(policy);
            let inner = thunk;
            let context = context.clone();

            thunk = SendThunk::new(move || {
                let policy = Arc::clone(&policy);
                let inner = inner.clone();
                let context = context.clone();
                Box::pin(async move { policy.execute(&context, inner).await })
            });
        }

        thunk.send().await
    }
}

/// Policies keyed by operation.
#[derive(Clone, Default)]
pub struct PolicyMap {
    policies: HashMap<Operation, Arc<dyn RequestPolicy>>,
}

impl PolicyMap {
    /// Creates a builder.
    pub fn builder() -> PolicyMapBuilder {
        PolicyMapBuilder::default()
    }

    /// Returns the policy for an operation.
    pub fn get(&self, operation: Operation) -> Option<&Arc<dyn RequestPolicy>> {
        self.policies.get(&operation)
    }

    /// Returns true if no operation has a policy.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Number of operations with a policy.
    pub fn len(&self) -> usize {
        self.policies.len()
    }
}

impl fmt::Debug for PolicyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> = self.policies.keys().map(Operation::name).collect();
        operations.sort_unstable();
        f.debug_struct("PolicyMap")
            .field("operations", &operations)
            .finish()
    }
}

/// Builder for `PolicyMap`.
#[derive(Default)]
pub struct PolicyMapBuilder {
    policies: HashMap<Operation, Arc<dyn RequestPolicy>>,
}

impl PolicyMapBuilder {
    /// Sets the policy of one operation.
    #[must_use]
    pub fn policy(mut self, operation: Operation, policy: impl RequestPolicy + 'static) -> Self {
        self.policies.insert(operation, Arc::new(policy));
        self
    }

    /// Sets a shared policy instance for one operation.
    #[must_use]
    pub fn shared_policy(mut self, operation: Operation, policy: Arc<dyn RequestPolicy>) -> Self {
        self.policies.insert(operation, policy);
        self
    }

    /// Uses one shared policy for every operation not configured yet.
    #[must_use]
    pub fn default_policy(mut self, policy: impl RequestPolicy + 'static) -> Self {
        let policy: Arc<dyn RequestPolicy> = Arc::new(policy);
        for operation in Operation::ALL {
            self.policies
                .entry(operation)
                .or_insert_with(|| Arc::clone(&policy));
        }
        self
    }

    /// Builds the map.
    pub fn build(self) -> PolicyMap {
        PolicyMap {
            policies: self.policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ByteStream;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RequestPolicy for Recording {
        async fn execute(
            &self,
            _context: &PolicyContext,
            send: SendThunk,
        ) -> DocumentLibraryResult<HttpResponse> {
            self.log.lock().unwrap().push(format!("enter {}", self.name));
            let response = send.send().await;
            self.log.lock().unwrap().push(format!("leave {}", self.name));
            response
        }
    }

    fn ok_thunk(log: Arc<Mutex<Vec<String>>>) -> SendThunk {
        SendThunk::new(move || {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push("send".to_string());
                Ok(HttpResponse::new(StatusCode::OK, HeaderMap::new(), ByteStream::empty()))
            })
        })
    }

    #[tokio::test]
    async fn test_chain_runs_first_policy_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = PolicyChain::new()
            .then(Recording { name: "outer", log: Arc::clone(&log) })
            .then(Recording { name: "inner", log: Arc::clone(&log) });

        let context = PolicyContext::new(Operation::GetLibrary, CancellationToken::new());
        let response = chain.execute(&context, ok_thunk(Arc::clone(&log))).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter outer", "enter inner", "send", "leave inner", "leave outer"]
        );
    }

    #[test]
    fn test_default_policy_does_not_override_specific() {
        let specific: Arc<dyn RequestPolicy> = Arc::new(RetryPolicy::new(RetryConfig {
            max_retries: 7,
            ..Default::default()
        }));

        let map = PolicyMap::builder()
            .shared_policy(Operation::DownloadContent, Arc::clone(&specific))
            .default_policy(RetryPolicy::default())
            .build();

        assert_eq!(map.len(), Operation::ALL.len());
        assert!(Arc::ptr_eq(map.get(Operation::DownloadContent).unwrap(), &specific));
        assert!(!Arc::ptr_eq(map.get(Operation::Exists).unwrap(), &specific));
    }

    #[test]
    fn test_empty_map() {
        let map = PolicyMap::default();
        assert!(map.is_empty());
        assert!(map.get(Operation::CreateLibrary).is_none());
    }
}
