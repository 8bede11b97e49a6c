//! Per-session throttling for generated orders.

use std::time::Duration;

use driftwood_core::SessionId;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Minimum spacing between accepted chaos submissions per session.
const SUBMISSION_COOLDOWN: Duration = Duration::from_secs(1);

/// Keyed rate limiter guarding the chaos order endpoint.
///
/// Each shopper session has its own single-token bucket that refills once
/// per [`SUBMISSION_COOLDOWN`].
pub struct SubmissionThrottle {
    limiter: DefaultKeyedRateLimiter<SessionId>,
}

impl SubmissionThrottle {
    /// # Panics
    ///
    /// Panics if the cooldown constant is zero.
    #[must_use]
    pub fn new() -> Self {
        let quota = Quota::with_period(SUBMISSION_COOLDOWN)
            .expect("submission cooldown must be non-zero");

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Returns `true` when the session may submit now.
    ///
    /// A rejected attempt does not consume the slot, so callers can retry
    /// as soon as the cooldown from the last accepted submission elapses.
    pub fn check_and_record(&self, session_id: &SessionId) -> bool {
        self.limiter.check_key(session_id).is_ok()
    }
}

impl Default for SubmissionThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_throttled_independently() {
        let throttle = SubmissionThrottle::new();
        let first = SessionId::generate();
        let second = SessionId::generate();

        assert!(throttle.check_and_record(&first));
        assert!(throttle.check_and_record(&second));
        assert!(!throttle.check_and_record(&first));
        assert!(!throttle.check_and_record(&second));
    }

    #[tokio::test]
    async fn test_cooldown_expires_after_a_second() {
        let throttle = SubmissionThrottle::new();
        let session_id = SessionId::generate();

        assert!(throttle.check_and_record(&session_id));
        assert!(!throttle.check_and_record(&session_id));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(throttle.check_and_record(&session_id));
    }

    #[tokio::test]
    async fn test_rejected_attempt_does_not_extend_cooldown() {
        let throttle = SubmissionThrottle::new();
        let session_id = SessionId::generate();

        assert!(throttle.check_and_record(&session_id));

        // A denied attempt mid-window must not push the refill time back.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!throttle.check_and_record(&session_id));

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert!(throttle.check_and_record(&session_id));
    }
}
