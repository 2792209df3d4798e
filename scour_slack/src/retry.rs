//! Retry decorator for outbound API calls.
//!
//! Every request the client makes goes through [`RetryState::run`], so all
//! call sites share one behavior:
//! - throttling is backpressure, not an error: sleep the suggested delay (or
//!   an adaptive fallback) and retry indefinitely;
//! - transient network failures retry with exponential backoff up to a bounded
//!   attempt count, then surface [`Error::Network`];
//! - anything else is terminal and passes through untouched.
//!
//! The adaptive fallback delay doubles on every throttle (capped) and halves
//! back toward the base after a successful call, so a run settles near the
//! rate the service is willing to sustain.

use std::time::Duration;

use scour_core::Error;
use tokio::time::sleep;
use tracing::warn;

/// Classification of a single failed attempt, produced by the transport layer.
#[derive(Debug)]
pub enum CallError {
    /// The service asked us to slow down, optionally saying for how long.
    Throttled { retry_after: Option<Duration> },
    /// Transport-level failure worth retrying.
    Network(String),
    /// Terminal failure; surfaced to the caller unchanged.
    Fatal(Error),
}

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Floor for the adaptive throttle delay and first network backoff step.
    pub base_delay: Duration,
    /// Cap for both throttle and network delays.
    pub max_delay: Duration,
    /// Total attempts allowed when the network keeps failing.
    pub network_attempts: usize,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(300),
            network_attempts: 5,
        }
    }
}

/// Mutable retry state carried across calls for the lifetime of a client.
#[derive(Debug)]
pub struct RetryState {
    policy: BackoffPolicy,
    current_delay: Duration,
}

impl RetryState {
    #[must_use]
    pub const fn new(policy: BackoffPolicy) -> Self {
        Self {
            current_delay: policy.base_delay,
            policy,
        }
    }

    /// The adaptive throttle delay that will be used next time the service
    /// throttles without suggesting a delay.
    #[must_use]
    pub const fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Run `operation` until it succeeds, is throttled out of existence
    /// (never), exhausts its network attempts, or fails terminally.
    pub async fn run<F, Fut, T>(&mut self, mut operation: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut network_failures = 0usize;

        loop {
            match operation().await {
                Ok(value) => {
                    self.decay();
                    return Ok(value);
                }
                Err(CallError::Throttled { retry_after }) => {
                    let delay = retry_after.unwrap_or_else(|| self.escalate());
                    warn!("Rate limited. Waiting {}s before retry...", delay.as_secs());
                    sleep(delay).await;
                }
                Err(CallError::Network(reason)) => {
                    network_failures += 1;
                    if network_failures >= self.policy.network_attempts {
                        return Err(Error::Network {
                            attempts: network_failures,
                            reason,
                        });
                    }
                    let delay = self.network_delay(network_failures);
                    warn!(
                        "Request failed (attempt {network_failures}/{}): {reason}. Retrying after {:?}...",
                        self.policy.network_attempts, delay
                    );
                    sleep(delay).await;
                }
                Err(CallError::Fatal(err)) => return Err(err),
            }
        }
    }

    /// Double the adaptive delay, capped, and return the new value.
    fn escalate(&mut self) -> Duration {
        self.current_delay = (self.current_delay * 2).min(self.policy.max_delay);
        self.current_delay
    }

    /// Halve the adaptive delay after a success, never below the base.
    fn decay(&mut self) {
        self.current_delay = (self.current_delay / 2).max(self.policy.base_delay);
    }

    /// Exponential backoff for the nth consecutive network failure.
    fn network_delay(&self, failures: usize) -> Duration {
        let shift = u32::try_from(failures.saturating_sub(1)).unwrap_or(u32::MAX);
        self.policy
            .base_delay
            .checked_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX))
            .unwrap_or(self.policy.max_delay)
            .min(self.policy.max_delay)
    }
}
