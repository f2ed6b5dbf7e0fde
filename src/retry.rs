//! Bounded retry around a single network submission.
//!
//! The loop is deliberately iterative: the attempt limit is enforced by a
//! counter, never by recursion depth. The inter-attempt delay is fixed, not
//! exponential; it is an explicit, tunable policy parameter.

use crate::ledger::LedgerError;
use crate::shutdown::ShutdownCoordinator;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of attempts when retry is enabled.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Retry policy for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum total attempts (>= 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
    /// When false, the submission gets exactly one attempt
    pub enabled: bool,
}

impl RetryPolicy {
    /// Create an enabled policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            enabled: true,
        }
    }

    /// Policy with retries turned off (single attempt).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Number of attempts this policy actually grants.
    pub fn effective_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Outcome of an exhausted or interrupted submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Every granted attempt failed; carries the last underlying error
    #[error("retries exhausted after {attempts} attempt(s): {source}")]
    Exhausted {
        /// Attempts actually made
        attempts: u32,
        /// The final underlying failure
        #[source]
        source: LedgerError,
    },

    /// Shutdown was requested while waiting to retry
    #[error("submission cancelled by shutdown request")]
    Cancelled,
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// Any failure from `op` is treated as transient and retried; a timeout on
/// the underlying call feeds the same accounting as any other failure. One
/// warn-level event is emitted per failed attempt, carrying the attempt
/// index. When a shutdown handle is supplied, the inter-attempt delay is
/// interruptible and cancellation surfaces as [`SubmitError::Cancelled`].
pub async fn submit_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    shutdown: Option<&ShutdownCoordinator>,
    mut op: F,
) -> Result<T, SubmitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let max_attempts = policy.effective_attempts();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "submission succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "submission attempt failed"
                );
                crate::metrics::record_retry_attempt();

                if attempt >= max_attempts {
                    return Err(SubmitError::Exhausted {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }

        match shutdown {
            Some(shutdown) => {
                tokio::select! {
                    _ = tokio::time::sleep(policy.delay) => {}
                    _ = shutdown.wait_for_shutdown() => return Err(SubmitError::Cancelled),
                }
            }
            None => tokio::time::sleep(policy.delay).await,
        }
    }
}
