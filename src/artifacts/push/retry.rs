use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Bounded retry of a fallible operation
///
/// Every call of the operation counts as exactly one attempt. Attempts follow
/// each other immediately unless a backoff is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

/// Result of the last attempt together with how many attempts were made
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> anyhow::Result<Self> {
        if max_attempts == 0 {
            anyhow::bail!("at least one push attempt is required");
        }

        Ok(RetryPolicy {
            max_attempts,
            backoff,
        })
    }

    pub fn immediate(max_attempts: u32) -> anyhow::Result<Self> {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Call `operation` until it succeeds or the attempts run out. The closure
    /// receives the 1-based attempt number.
    pub fn run<T, E, F>(&self, mut operation: F) -> Attempted<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation(attempt) {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                Err(err) if attempt >= self.max_attempts => {
                    return Attempted {
                        result: Err(err),
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    warn!(
                        "failed to push, attempt {attempt} of {}: {err}",
                        self.max_attempts
                    );
                    if !self.backoff.is_zero() {
                        std::thread::sleep(self.backoff);
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::ZERO,
        }
    }
}
