//! # Retry With Reconnect
//!
//! Every hardware operation runs inside [`with_retry`]. A failed attempt
//! closes the transport, waits, and reopens it before trying again:
//!
//! ```text
//! attempt 1 ──fail──► close ──► sleep ──► open ──► attempt 2 ──fail──► close ──► ...
//!                                                                         │
//!                                                final attempt: no reopen ┘
//! ```
//!
//! A failed close or reopen is logged and the loop keeps going; the next
//! attempt will surface the problem if the transport is still down.
//!
//! Sleeping goes through [`RetryPolicy`] so tests can swap in a no-op.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::config::DEFAULT_RETRY_DELAY;
use crate::error::ProxyError;
use crate::transport::Transport;

/// Blocking pause used between attempts.
pub type SleepFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// Delay between attempts and the function that waits it out.
#[derive(Clone)]
pub struct RetryPolicy {
    delay: Duration,
    sleep: SleepFn,
}

impl RetryPolicy {
    /// Sleep the calling thread for `delay` between attempts.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sleep: Arc::new(thread::sleep),
        }
    }

    /// Use a custom sleep function.
    pub fn with_sleep(delay: Duration, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            sleep: Arc::new(sleep),
        }
    }

    /// Retry without waiting at all.
    pub fn immediate() -> Self {
        Self::with_sleep(Duration::ZERO, |_| {})
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the configured delay.
    pub fn pause(&self) {
        self.pause_for(self.delay);
    }

    /// Wait out an arbitrary delay through the same sleep function.
    pub fn pause_for(&self, delay: Duration) {
        (self.sleep)(delay);
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Run `op` up to `attempts` times, reconnecting `transport` between tries.
///
/// - On success the value is returned immediately.
/// - On failure the transport is closed. Unless this was the last attempt,
///   the policy's delay is slept and the transport reopened.
/// - After the last failure the transport stays closed and that attempt's
///   error is returned.
///
/// An `attempts` of 0 is treated as 1.
pub fn with_retry<T, F>(
    transport: &mut dyn Transport,
    policy: &RetryPolicy,
    attempts: u32,
    mut op: F,
) -> Result<T, ProxyError>
where
    F: FnMut(&mut dyn Transport) -> Result<T, ProxyError>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op(&mut *transport) {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, attempts, "printer operation recovered");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        warn!(attempt, attempts, error = %err, "printer operation failed");

        if let Err(close_err) = transport.close() {
            warn!(error = %close_err, "error closing transport");
        }

        if attempt >= attempts {
            error!(attempts, error = %err, "giving up on printer operation");
            return Err(err);
        }

        debug!(delay = ?policy.delay(), conn = transport.target(), "reconnecting");
        policy.pause();
        if let Err(open_err) = transport.open() {
            warn!(error = %open_err, "failed to reconnect, retrying anyway");
        }

        attempt += 1;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NOT_CONNECTED;
    use crate::transport::mock::MockTransport;
    use std::sync::Mutex;

    fn fail() -> ProxyError {
        ProxyError::Connection("boom".to_string())
    }

    #[test]
    fn test_always_failing_stops_at_budget() {
        let mut mock = MockTransport::new();
        let mut calls = 0;

        let result: Result<(), _> = with_retry(&mut mock, &RetryPolicy::immediate(), 2, |_| {
            calls += 1;
            Err(fail())
        });

        assert!(result.is_err());
        assert_eq!(calls, 2);
        assert_eq!(mock.closes(), 2);
        assert_eq!(mock.opens(), 1);
        assert!(!mock.state().open);
    }

    #[test]
    fn test_success_on_third_of_five() {
        let mut mock = MockTransport::new();
        let mut calls = 0;

        let result = with_retry(&mut mock, &RetryPolicy::immediate(), 5, |_| {
            calls += 1;
            if calls < 3 { Err(fail()) } else { Ok(calls) }
        });

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
        assert_eq!(mock.closes(), 2);
        assert_eq!(mock.opens(), 2);
    }

    #[test]
    fn test_first_try_success_touches_nothing() {
        let mut mock = MockTransport::new();
        let result = with_retry(&mut mock, &RetryPolicy::immediate(), 8, |t| t.write_raw(&[1]));

        assert!(result.is_ok());
        assert_eq!(mock.closes(), 0);
        assert_eq!(mock.opens(), 0);
        assert_eq!(mock.written(), vec![vec![1]]);
    }

    #[test]
    fn test_close_failure_does_not_abort() {
        let mut mock = MockTransport::new().failing_close();
        let mut calls = 0;

        let _: Result<(), _> = with_retry(&mut mock, &RetryPolicy::immediate(), 3, |_| {
            calls += 1;
            Err(fail())
        });

        assert_eq!(calls, 3);
        assert_eq!(mock.closes(), 3);
        assert_eq!(mock.opens(), 2);
    }

    #[test]
    fn test_reopen_failure_does_not_abort() {
        // Attempt 2 runs on a closed transport and fails; attempt 3 follows a good reopen
        let mut mock = MockTransport::new().failing_writes(1).failing_opens(1);

        let result = with_retry(&mut mock, &RetryPolicy::immediate(), 3, |t| t.write_raw(&[7]));

        assert!(result.is_ok());
        assert_eq!(mock.write_calls(), 3);
        assert_eq!(mock.opens(), 2);
        assert_eq!(mock.written(), vec![vec![7]]);
    }

    #[test]
    fn test_failed_reopen_fails_next_attempt() {
        let mut mock = MockTransport::new().failing_writes(1).failing_opens(usize::MAX);

        let err = with_retry(&mut mock, &RetryPolicy::immediate(), 3, |t| t.write_raw(&[7]))
            .unwrap_err();

        assert_eq!(err.to_string(), format!("Connection error: {}", NOT_CONNECTED));
        assert_eq!(mock.write_calls(), 3);
        assert_eq!(mock.opens(), 2);
        assert!(mock.written().is_empty());
    }

    #[test]
    fn test_returns_last_error() {
        let mut mock = MockTransport::new();
        let mut calls = 0;

        let err = with_retry::<(), _>(&mut mock, &RetryPolicy::immediate(), 3, |_| {
            calls += 1;
            Err(ProxyError::Connection(format!("attempt {}", calls)))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "Connection error: attempt 3");
    }

    #[test]
    fn test_sleeps_between_attempts_only() {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sleeps);
        let policy = RetryPolicy::with_sleep(Duration::from_secs(2), move |d| {
            recorded.lock().unwrap().push(d);
        });

        let mut mock = MockTransport::new();
        let _ = with_retry::<(), _>(&mut mock, &policy, 4, |_| Err(fail()));

        assert_eq!(*sleeps.lock().unwrap(), vec![Duration::from_secs(2); 3]);
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let mut mock = MockTransport::new();
        let mut calls = 0;
        let _ = with_retry::<(), _>(&mut mock, &RetryPolicy::immediate(), 0, |_| {
            calls += 1;
            Err(fail())
        });

        assert_eq!(calls, 1);
        assert_eq!(mock.opens(), 0);
    }
}
