//! Circuit breaker pattern implementation.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

use super::{PolicyContext, RequestPolicy, SendThunk};
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::HttpResponse;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed - requests are allowed.
    Closed,
    /// Circuit is open - requests are blocked.
    Open,
    /// Circuit is half-open - limited requests for testing.
    HalfOpen,
}

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Number of successes needed to close from half-open.
    pub success_threshold: u32,
    /// Time to wait before transitioning to half-open.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    failures: u32,
    successes: u32,
    changed_at: Instant,
}

/// Stops calling an operation that keeps failing.
///
/// Faults that indicate an unhealthy service and 5xx responses count as
/// failures. Cancellation counts as neither.
#[derive(Debug)]
pub struct CircuitBreakerPolicy {
    config: CircuitBreakerConfig,
    breaker: Mutex<Breaker>,
}

impl CircuitBreakerPolicy {
    /// Creates a new circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breaker: Mutex::new(Breaker {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                changed_at: Instant::now(),
            }),
        }
    }

    /// Returns the current state.
    pub async fn state(&self) -> CircuitState {
        let mut breaker = self.breaker.lock().await;
        self.maybe_transition_to_half_open(&mut breaker);
        breaker.state
    }

    async fn allow_request(&self, context: &PolicyContext) -> DocumentLibraryResult<()> {
        let mut breaker = self.breaker.lock().await;
        self.maybe_transition_to_half_open(&mut breaker);

        match breaker.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => Err(DocumentLibraryError::CircuitOpen {
                operation: context.operation.target(),
            }),
        }
    }

    async fn record_success(&self) {
        let mut breaker = self.breaker.lock().await;

        match breaker.state {
            CircuitState::HalfOpen => {
                breaker.successes += 1;
                if breaker.successes >= self.config.success_threshold {
                    Self::transition_to(&mut breaker, CircuitState::Closed);
                }
            }
            CircuitState::Closed => breaker.failures = 0,
            CircuitState::Open => {}
        }
    }

    async fn record_failure(&self) {
        let mut breaker = self.breaker.lock().await;

        match breaker.state {
            CircuitState::Closed => {
                breaker.failures += 1;
                if breaker.failures >= self.config.failure_threshold {
                    Self::transition_to(&mut breaker, CircuitState::Open);
                }
            }
            // Any failure in half-open returns to open
            CircuitState::HalfOpen => Self::transition_to(&mut breaker, CircuitState::Open),
            CircuitState::Open => {}
        }
    }

    fn maybe_transition_to_half_open(&self, breaker: &mut Breaker) {
        if breaker.state == CircuitState::Open
            && breaker.changed_at.elapsed() >= self.config.reset_timeout
        {
            Self::transition_to(breaker, CircuitState::HalfOpen);
        }
    }

    fn transition_to(breaker: &mut Breaker, new_state: CircuitState) {
        info!(from = ?breaker.state, to = ?new_state, "Circuit breaker state change");

        breaker.state = new_state;
        breaker.changed_at = Instant::now();
        breaker.successes = 0;
        if new_state == CircuitState::Closed {
            breaker.failures = 0;
        }
    }
}

impl Default for CircuitBreakerPolicy {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[async_trait]
impl RequestPolicy for CircuitBreakerPolicy {
    async fn execute(
        &self,
        context: &PolicyContext,
        send: SendThunk,
    ) -> DocumentLibraryResult<HttpResponse> {
        self.allow_request(context).await?;

        let outcome = send.send().await;
        let healthy = match &outcome {
            Ok(response) => Some(!response.status.is_server_error()),
            Err(error) if error.should_circuit_break() => Some(false),
            Err(_) => None,
        };

        match healthy {
            Some(true) => self.record_success().await,
            Some(false) => self.record_failure().await,
            None => {}
        }

        outcome
    }
}
