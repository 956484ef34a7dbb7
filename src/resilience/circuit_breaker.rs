//! # Circuit Breaker Implementation
//!
//! Fault isolation for the generative API dependency. Classic three-state
//! pattern: Closed (normal operation), Open (failing fast), and Half-Open
//! (testing recovery with a single probe call).

use crate::config::CircuitBreakerConfig;
use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - all calls are allowed through
    Closed = 0,
    /// Failure mode - all calls fail fast without executing
    Open = 1,
    /// Testing recovery - the next call probes the dependency
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Open, // Default to safest state
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        write!(f, "{label}")
    }
}

/// Counters tracked across the breaker's lifetime
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakerMetrics {
    pub total_calls: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_failures: u32,
    pub current_state: Option<CircuitState>,
}

#[derive(Debug, Default)]
struct Bookkeeping {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    total_calls: u64,
    success_count: u64,
    failure_count: u64,
}

/// Core circuit breaker implementation with atomic state management
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging
    name: String,

    /// Current circuit state (atomic for lock-free reads)
    state: AtomicU8,

    /// Configuration parameters
    config: CircuitBreakerConfig,

    /// Failure bookkeeping protected by mutex
    inner: Mutex<Bookkeeping>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            reset_timeout_secs = config.reset_timeout.as_secs(),
            "🛡️ Circuit breaker initialized"
        );

        Self {
            name,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            inner: Mutex::new(Bookkeeping::default()),
        }
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Execute an operation with circuit breaker protection.
    ///
    /// Fails fast with [`InsightError::CircuitOpen`] while the circuit is
    /// open and the reset timeout has not elapsed. The call that finds the
    /// timeout elapsed transitions to half-open and is allowed through.
    /// Failures are recorded before the original error is returned so the
    /// caller's retry/fallback logic can still see it.
    pub async fn call<F, Fut, T>(&self, operation: F) -> InsightResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = InsightResult<T>>,
    {
        if !self.should_allow_call().await {
            return Err(InsightError::CircuitOpen(self.name.clone()));
        }

        let result = operation().await;

        match &result {
            Ok(_) => self.record_success().await,
            Err(error) => self.record_failure(error).await,
        }

        result
    }

    /// Check if a call should be allowed based on current state
    async fn should_allow_call(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let mut inner = self.inner.lock().await;
                match inner.opened_at {
                    Some(opened_at) if opened_at.elapsed() > self.config.reset_timeout => {
                        self.transition_to_half_open(&mut inner);
                        true
                    }
                    Some(_) => false,
                    None => {
                        // Open without a timestamp should be unreachable
                        warn!(component = %self.name, "Circuit open but no timestamp recorded");
                        true
                    }
                }
            }
        }
    }

    /// Record a successful operation
    async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.total_calls += 1;
        inner.success_count += 1;
        inner.consecutive_failures = 0;

        debug!(component = %self.name, "🟢 Operation succeeded");

        if self.state() == CircuitState::HalfOpen {
            self.transition_to_closed(&mut inner);
        }
    }

    /// Record a failed operation
    async fn record_failure(&self, error: &InsightError) {
        let mut inner = self.inner.lock().await;
        inner.total_calls += 1;
        inner.failure_count += 1;
        inner.consecutive_failures += 1;

        error!(
            component = %self.name,
            error = %error,
            consecutive_failures = inner.consecutive_failures,
            "🔴 Operation failed"
        );

        match self.state() {
            CircuitState::Closed => {
                if inner.consecutive_failures >= self.config.failure_threshold {
                    self.transition_to_open(&mut inner);
                }
            }
            // Any failure in half-open state immediately reopens the circuit
            CircuitState::HalfOpen => self.transition_to_open(&mut inner),
            CircuitState::Open => {}
        }
    }

    /// Transition to closed state (normal operation)
    fn transition_to_closed(&self, inner: &mut Bookkeeping) {
        self.state.store(CircuitState::Closed as u8, Ordering::Release);
        inner.consecutive_failures = 0;
        inner.opened_at = None;

        info!(
            component = %self.name,
            total_calls = inner.total_calls,
            "🟢 Circuit breaker closed (recovered)"
        );
    }

    /// Transition to open state (failing fast)
    fn transition_to_open(&self, inner: &mut Bookkeeping) {
        self.state.store(CircuitState::Open as u8, Ordering::Release);
        inner.opened_at = Some(Instant::now());

        error!(
            component = %self.name,
            consecutive_failures = inner.consecutive_failures,
            failure_threshold = self.config.failure_threshold,
            reset_timeout_secs = self.config.reset_timeout.as_secs(),
            "🔴 Circuit breaker opened (failing fast)"
        );
    }

    /// Transition to half-open state (testing recovery)
    fn transition_to_half_open(&self, inner: &mut Bookkeeping) {
        self.state
            .store(CircuitState::HalfOpen as u8, Ordering::Release);
        inner.opened_at = None;

        info!(component = %self.name, "🟡 Circuit breaker half-open (testing recovery)");
    }

    /// Get current metrics snapshot
    pub async fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock().await;
        CircuitBreakerMetrics {
            total_calls: inner.total_calls,
            success_count: inner.success_count,
            failure_count: inner.failure_count,
            consecutive_failures: inner.consecutive_failures,
            current_state: Some(self.state()),
        }
    }

    /// Get component name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn test_config(failure_threshold: u32, reset_timeout: Duration) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold,
            reset_timeout,
        }
    }

    #[tokio::test]
    async fn test_circuit_breaker_normal_operation() {
        let circuit = CircuitBreaker::new("test", test_config(3, Duration::from_millis(100)));

        assert_eq!(circuit.state(), CircuitState::Closed);

        let result = circuit.call(|| async { Ok("success") }).await;
        assert!(result.is_ok());

        let metrics = circuit.metrics().await;
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.success_count, 1);
        assert_eq!(metrics.failure_count, 0);
    }

    #[tokio::test]
    async fn test_circuit_opens_at_exact_failure_threshold() {
        let circuit = CircuitBreaker::new("test", test_config(5, Duration::from_secs(60)));

        for i in 1..=4 {
            let _ = circuit
                .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
                .await;
            assert_eq!(circuit.state(), CircuitState::Closed, "closed after {i} failures");
        }

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        assert_eq!(circuit.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_failures() {
        let circuit = CircuitBreaker::new("test", test_config(3, Duration::from_secs(60)));

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        let _ = circuit.call(|| async { Ok(()) }).await;

        let metrics = circuit.metrics().await;
        assert_eq!(metrics.consecutive_failures, 0);
        assert_eq!(circuit.state(), CircuitState::Closed);

        // Two more failures still do not reach the threshold of three
        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_open_circuit_fails_fast_without_invoking_work() {
        let circuit = CircuitBreaker::new("test", test_config(1, Duration::from_secs(60)));

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        assert_eq!(circuit.state(), CircuitState::Open);

        let result: InsightResult<()> = circuit
            .call(|| async { unreachable!("work must not run while the circuit is open") })
            .await;
        assert!(matches!(result, Err(InsightError::CircuitOpen(_))));
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovery_after_timeout() {
        let circuit = CircuitBreaker::new("test", test_config(1, Duration::from_millis(50)));

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        assert_eq!(circuit.state(), CircuitState::Open);

        sleep(Duration::from_millis(60)).await;

        // The call that finds the timeout elapsed is allowed through
        let result = circuit.call(|| async { Ok("recovered") }).await;
        assert!(result.is_ok());
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens_circuit() {
        let circuit = CircuitBreaker::new("test", test_config(1, Duration::from_millis(50)));

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("boom".into())) })
            .await;
        sleep(Duration::from_millis(60)).await;

        let _ = circuit
            .call(|| async { Err::<(), _>(InsightError::Api("still down".into())) })
            .await;
        assert_eq!(circuit.state(), CircuitState::Open);

        // Rejected again until another reset timeout elapses
        let result = circuit.call(|| async { Ok(()) }).await;
        assert!(matches!(result, Err(InsightError::CircuitOpen(_))));
    }

    #[tokio::test]
    async fn test_state_display_labels() {
        assert_eq!(CircuitState::Closed.to_string(), "CLOSED");
        assert_eq!(CircuitState::Open.to_string(), "OPEN");
        assert_eq!(CircuitState::HalfOpen.to_string(), "HALF_OPEN");
    }
}
