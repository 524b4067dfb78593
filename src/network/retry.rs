//! Retrying dispatch to the search backend
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐  success   ┌───────────┐
//! │ Attempting ├───────────►│ Succeeded │
//! └──┬──────▲──┘            └───────────┘
//!    │      │ backoff elapsed
//!    │   ┌──┴──────┐
//!    │   │ Waiting │◄── retryable failure, attempts left
//!    │   └─────────┘
//!    │ terminal failure, attempts exhausted, or deadline
//!    ▼
//! ┌────────┐
//! │ Failed │
//! └────────┘
//! ```

use super::backend::Backend;
use super::clock::{Clock, TokioClock};
use crate::error::{Result, SearchError};
use crate::results::RawResult;
use crate::search::{Credential, SearchRequest};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Process-wide retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first, at least 1
    pub max_attempts: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
    /// Cap for any single wait
    pub max_delay: Duration,
    /// Spread applied to computed waits, in [0, 1)
    pub jitter_fraction: f64,
    /// Budget for one whole dispatch, waits included
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_fraction: 0.2,
            deadline: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Wait before the retry that follows failed `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        self.backoff_delay_with(attempt, retry_after, &mut rand::thread_rng())
    }

    /// Same as [`RetryPolicy::backoff_delay`] with an explicit random source
    pub fn backoff_delay_with<R: Rng>(
        &self,
        attempt: u32,
        retry_after: Option<Duration>,
        rng: &mut R,
    ) -> Duration {
        // A backend hint wins over the computed schedule.
        if let Some(hint) = retry_after {
            return hint.min(self.max_delay);
        }

        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);

        let jitter = self.jitter_fraction.clamp(0.0, 0.99);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }

        let factor = rng.gen_range((1.0 - jitter)..=(1.0 + jitter));
        delay.mul_f64(factor).min(self.max_delay)
    }
}

/// Dispatch progress
#[derive(Debug)]
enum DispatchState {
    Attempting { attempt: u32 },
    Waiting {
        attempt: u32,
        delay: Duration,
        last: SearchError,
    },
    Succeeded(RawResult),
    Failed(SearchError),
}

/// Executes search requests with bounded, classified retries
pub struct RetryingDispatcher {
    backend: Arc<dyn Backend>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl RetryingDispatcher {
    /// Create a dispatcher that waits on the tokio timer
    pub fn new(backend: Arc<dyn Backend>, policy: RetryPolicy) -> Self {
        Self::with_clock(backend, policy, Arc::new(TokioClock))
    }

    /// Create a dispatcher with an injected time source
    pub fn with_clock(backend: Arc<dyn Backend>, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `request` against the backend until success, a terminal failure,
    /// exhaustion of attempts, or the deadline.
    ///
    /// Dropping the returned future abandons the in-flight attempt and
    /// releases its connection.
    pub async fn execute(&self, request: &SearchRequest, credential: &Credential) -> Result<RawResult> {
        let started = self.clock.now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = DispatchState::Attempting { attempt: 1 };

        loop {
            state = match state {
                DispatchState::Attempting { attempt } => {
                    self.attempt(request, credential, attempt, max_attempts, started)
                        .await
                }
                DispatchState::Waiting {
                    attempt,
                    delay,
                    last,
                } => {
                    let elapsed = self.elapsed_since(started);
                    if elapsed + delay >= self.policy.deadline {
                        DispatchState::Failed(SearchError::Timeout(format!(
                            "deadline of {:?} would be exceeded before attempt {}; last error: {}",
                            self.policy.deadline,
                            attempt + 1,
                            last
                        )))
                    } else {
                        warn!(
                            backend = self.backend.name(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after: {}",
                            last
                        );
                        self.clock.sleep(delay).await;
                        DispatchState::Attempting {
                            attempt: attempt + 1,
                        }
                    }
                }
                DispatchState::Succeeded(raw) => return Ok(raw),
                DispatchState::Failed(err) => return Err(err),
            };
        }
    }

    async fn attempt(
        &self,
        request: &SearchRequest,
        credential: &Credential,
        attempt: u32,
        max_attempts: u32,
        started: Instant,
    ) -> DispatchState {
        let remaining = self.policy.deadline.saturating_sub(self.elapsed_since(started));
        if remaining.is_zero() {
            return DispatchState::Failed(SearchError::Timeout(format!(
                "deadline of {:?} exceeded before attempt {}",
                self.policy.deadline, attempt
            )));
        }

        debug!(
            backend = self.backend.name(),
            engine = request.params.engine(),
            attempt,
            max_attempts,
            "dispatching search"
        );

        let outcome =
            tokio::time::timeout(remaining, self.backend.fetch(&request.params, credential)).await;

        match outcome {
            Ok(Ok(raw)) => {
                debug!(attempt, "backend returned a result");
                DispatchState::Succeeded(raw)
            }
            Ok(Err(err)) if err.is_retryable() && attempt < max_attempts => {
                let delay = self.policy.backoff_delay(attempt, err.retry_after());
                DispatchState::Waiting {
                    attempt,
                    delay,
                    last: err,
                }
            }
            Ok(Err(err)) if err.is_retryable() => {
                warn!(attempt, "giving up after {} attempts: {}", attempt, err);
                DispatchState::Failed(exhausted(err, attempt))
            }
            Ok(Err(err)) => {
                warn!(attempt, "terminal backend failure: {}", err);
                DispatchState::Failed(err)
            }
            Err(_) => DispatchState::Failed(SearchError::Timeout(format!(
                "deadline of {:?} exceeded during attempt {}",
                self.policy.deadline, attempt
            ))),
        }
    }

    fn elapsed_since(&self, started: Instant) -> Duration {
        self.clock.now().saturating_duration_since(started)
    }
}

/// Note the attempt count on a retryable failure that is being surfaced
fn exhausted(err: SearchError, attempts: u32) -> SearchError {
    match err {
        SearchError::RateLimited {
            message,
            retry_after,
        } => SearchError::RateLimited {
            message: format!("{message} (after {attempts} attempts)"),
            retry_after,
        },
        SearchError::TransientNetwork(message) => {
            SearchError::TransientNetwork(format!("{message} (after {attempts} attempts)"))
        }
        other => other,
    }
}
