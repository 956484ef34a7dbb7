//! # Resilience Module
//!
//! Fault tolerance for calls to the external generative API: circuit
//! breaking, serial dispatch, and bounded retry with exponential backoff.
//!
//! ## Architecture
//!
//! - **Circuit Breaker**: isolates a failing upstream by failing fast
//!   after repeated errors, with time-gated recovery probes
//! - **Serial Request Queue**: one in-flight upstream call at a time,
//!   FIFO, with a fixed inter-request delay against burst traffic
//! - **Retry**: exponential backoff applied only to rate-limited errors
//!
//! The three pieces are independent and are composed by the insights
//! façade (queue wraps breaker wraps retry); none of them knows about the
//! others, so any one can be swapped without touching the rest.

pub mod circuit_breaker;
pub mod request_queue;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerMetrics, CircuitState};
pub use request_queue::SerialRequestQueue;
pub use retry::{is_rate_limited, retry_with_backoff};
