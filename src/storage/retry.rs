// ==========================================
// MatShop Catalog Pipeline - bounded retry combinator
// ==========================================
// One resilience policy covers both the delete and write paths of the
// media store; a consumer process transiently holding a file open must
// not fail the whole import batch.
// ==========================================

use std::time::Duration;
use tracing::warn;

// ==========================================
// RetryPolicy - bounded attempts, linear backoff
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Delay before retrying after the given (1-based) attempt:
    /// attempt n waits n * base.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 50)
    }
}

/// Run `operation` up to `policy.max_attempts` times, sleeping a linearly
/// increasing delay between attempts. The last error is propagated.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts {
                    warn!(
                        label = label,
                        attempts = attempt,
                        error = %err,
                        "operation exhausted retries"
                    );
                    return Err(err);
                }
                warn!(
                    label = label,
                    attempt = attempt,
                    error = %err,
                    "operation failed, retrying"
                );
                std::thread::sleep(policy.delay_after(attempt));
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_succeeds_first_try() {
        let policy = RetryPolicy::new(3, 0);
        let calls = Cell::new(0u32);

        let result: Result<u32, String> = with_retry(&policy, "noop", || {
            calls.set(calls.get() + 1);
            Ok(7)
        });

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, 0);
        let calls = Cell::new(0u32);

        let result: Result<&str, String> = with_retry(&policy, "flaky", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("locked".to_string())
            } else {
                Ok("done")
            }
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausts_and_returns_last_error() {
        let policy = RetryPolicy::new(3, 0);
        let calls = Cell::new(0u32);

        let result: Result<(), String> = with_retry(&policy, "stuck", || {
            calls.set(calls.get() + 1);
            Err(format!("attempt {}", calls.get()))
        });

        assert_eq!(result.unwrap_err(), "attempt 3");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_linear_backoff_schedule() {
        let policy = RetryPolicy::new(3, 10);
        assert_eq!(policy.delay_after(1), Duration::from_millis(10));
        assert_eq!(policy.delay_after(2), Duration::from_millis(20));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, 10);
        assert_eq!(policy.max_attempts, 1);
    }
}
