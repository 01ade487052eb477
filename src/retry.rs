//! Retry policy for pages whose request failed but whose callback asked to
//! keep going.
//!
//! The list callback decides *whether* a failed page is worth retrying (it
//! sees the error and can consult [`crate::is_temporary`]). The
//! [`RetryPolicy`] decides *how*: how many attempts are allowed and how long
//! to wait between them.
//!
//! [`RetryPolicy::default`] allows unlimited immediate retries, leaving the
//! decision entirely to the callback. [`RetryPolicy::exponential`] caps the
//! attempts and spaces them out.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use outline_core::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::exponential(3, Duration::from_millis(200), Duration::from_secs(5));
//! match policy.should_retry(1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Jitter is at most this fraction of the computed delay.
const JITTER_FRACTION: f64 = 0.25;

/// Decision on whether to retry a failed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the page after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Give up on the page.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// How often, and how far apart, a failed page may be retried.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
/// ```
///
/// where jitter is uniformly drawn from `0..=delay/4`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per page (including the initial attempt); `None` is unlimited.
    max_attempts: Option<u32>,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    /// Unlimited attempts, no delay.
    fn default() -> Self {
        Self {
            max_attempts: None,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Unlimited attempts, no delay between them.
    #[must_use]
    pub fn immediate() -> Self {
        Self::default()
    }

    /// At most `max_attempts` attempts per page (minimum 1), doubling the
    /// delay from `base_delay` up to `max_delay`.
    #[must_use]
    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            base_delay,
            max_delay,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Same policy with a different growth factor.
    #[must_use]
    pub fn with_multiplier(mut self, backoff_multiplier: f32) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Returns the configured attempt cap, `None` when unlimited.
    #[must_use]
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Decides whether the page that just failed for the `attempt`-th time
    /// (1-indexed) may be requested again.
    #[instrument(level = "trace", skip(self), fields(max_attempts = ?self.max_attempts))]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if let Some(max) = self.max_attempts
            && attempt >= max
        {
            debug!(attempt, max, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({max}) exhausted"),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry page"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt.saturating_add(1),
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        // attempt 1 waits exactly base_delay (multiplier^0)
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        let jitter_ms = Self::calculate_jitter(capped_ms);
        Duration::from_millis((capped_ms + jitter_ms) as u64)
    }

    fn calculate_jitter(delay_ms: f64) -> f64 {
        let upper = delay_ms * JITTER_FRACTION;
        if upper <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(0.0..=upper)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_default_policy_is_unlimited_and_immediate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), None);
        for attempt in [1, 2, 100, u32::MAX - 1] {
            assert_eq!(
                policy.should_retry(attempt),
                RetryDecision::Retry {
                    delay: Duration::ZERO,
                    attempt: attempt + 1
                }
            );
        }
    }

    #[test]
    fn test_exponential_max_attempts_minimum_is_one() {
        let policy = RetryPolicy::exponential(0, Duration::from_millis(10), Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), Some(1));
        assert!(matches!(
            policy.should_retry(1),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::exponential(3, Duration::from_millis(10), Duration::from_secs(1));

        assert!(matches!(policy.should_retry(1), RetryDecision::Retry { attempt: 2, .. }));
        assert!(matches!(policy.should_retry(2), RetryDecision::Retry { attempt: 3, .. }));

        let decision = policy.should_retry(3);
        match decision {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("exhausted")),
            other => panic!("Expected DoNotRetry, got: {other:?}"),
        }
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_calculation_grows_exponentially() {
        let policy = RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(32));

        let first = policy.calculate_delay(1);
        assert!(first >= Duration::from_secs(1));
        assert!(first <= Duration::from_millis(1250));

        let third = policy.calculate_delay(3);
        assert!(third >= Duration::from_secs(4));
        assert!(third <= Duration::from_millis(5000));
    }

    #[test]
    fn test_delay_calculation_respects_max_delay() {
        let policy = RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(5));
        // 6th attempt would be 32s, capped at 5s plus up to 25% jitter
        let delay = policy.calculate_delay(6);
        assert!(delay >= Duration::from_secs(5));
        assert!(delay <= Duration::from_millis(6250));
    }

    #[test]
    fn test_custom_multiplier() {
        let policy = RetryPolicy::exponential(10, Duration::from_millis(100), Duration::from_secs(60))
            .with_multiplier(3.0);
        // attempt 3: 100ms * 3^2 = 900ms
        let delay = policy.calculate_delay(3);
        assert!(delay >= Duration::from_millis(900));
        assert!(delay <= Duration::from_millis(1125));
    }

    // ==================== Jitter Tests ====================

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            let jitter = RetryPolicy::calculate_jitter(400.0);
            assert!((0.0..=100.0).contains(&jitter), "Jitter {jitter} out of range");
        }
    }

    #[test]
    fn test_jitter_zero_for_zero_delay() {
        assert!(RetryPolicy::calculate_jitter(0.0).abs() < f64::EPSILON);
    }
}
