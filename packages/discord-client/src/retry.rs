//! Delay schedule between webhook attempts.

use std::time::Duration;

/// Attempts are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Linear backoff unit.
    pub backoff_step: Duration,
    /// Used when a `Retry-After` header is present but unreadable.
    pub rate_limit_fallback: Duration,
    /// Longest wait honored from a `Retry-After` header.
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(200),
            rate_limit_fallback: Duration::from_millis(1000),
            max_rate_limit_wait: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_step: Duration::ZERO,
            rate_limit_fallback: Duration::ZERO,
            max_rate_limit_wait: Duration::ZERO,
        }
    }

    /// Delay after the webhook answered with a non-success status.
    pub fn after_status(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        match retry_after {
            Some(value) => parse_retry_after(value)
                .unwrap_or(self.rate_limit_fallback)
                .min(self.max_rate_limit_wait),
            None => self.backoff_step * attempt,
        }
    }

    /// Delay after the request never produced a response.
    pub fn after_transport_error(&self, attempt: u32) -> Duration {
        self.backoff_step * (attempt + 1)
    }
}

/// `Retry-After` is in seconds and may be fractional.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_millis((seconds * 1000.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_header_wins() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_status(1, Some("2")), Duration::from_millis(2000));
        assert_eq!(policy.after_status(2, Some("0.35")), Duration::from_millis(350));
    }

    #[test]
    fn retry_after_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_status(1, Some("86400")), Duration::from_secs(5));
        assert_eq!(policy.after_status(1, Some("1e300")), Duration::from_secs(5));

        let patient = RetryPolicy {
            max_rate_limit_wait: Duration::from_secs(30),
            ..RetryPolicy::default()
        };
        assert_eq!(patient.after_status(1, Some("12")), Duration::from_secs(12));
    }

    #[test]
    fn unreadable_retry_after_falls_back_to_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_status(1, Some("soon")), Duration::from_millis(1000));
        assert_eq!(policy.after_status(1, Some("-4")), Duration::from_millis(1000));
        assert_eq!(policy.after_status(1, Some("NaN")), Duration::from_millis(1000));
    }

    #[test]
    fn status_without_hint_backs_off_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_status(1, None), Duration::from_millis(200));
        assert_eq!(policy.after_status(2, None), Duration::from_millis(400));
    }

    #[test]
    fn transport_errors_back_off_one_step_further() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.after_transport_error(1), Duration::from_millis(400));
        assert_eq!(policy.after_transport_error(2), Duration::from_millis(600));
    }

    #[test]
    fn immediate_policy_never_sleeps() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.after_status(2, None), Duration::ZERO);
        assert_eq!(policy.after_status(2, Some("garbage")), Duration::ZERO);
        assert_eq!(policy.after_transport_error(2), Duration::ZERO);
    }
}
