//! Bounded exponential-backoff retry for fallible async loads.
//!
//! Failures are classified from their rendered message. Rate limiting and
//! transient network/chunk-load failures are retried; anything else is
//! returned to the caller on the spot. The caller always gets the original
//! error back, never a wrapper.

use crate::domain::ports::JitterSource;
use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "rate limit", "Too Many Requests"];
const NETWORK_MARKERS: [&str; 4] = [
    "Failed to fetch",
    "dynamically imported module",
    "Loading chunk",
    "NetworkError",
];

/// Jitter adds up to this fraction of the exponential term.
const JITTER_FACTOR: f64 = 0.3;
const RATE_LIMIT_BASE_MULTIPLIER: f64 = 2.0;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    RateLimited,
    NetworkTransient,
    Fatal,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureClass::Fatal)
    }
}

/// Classify a failure by the text of its message. Matching is case-sensitive.
pub fn classify_failure(message: &str) -> FailureClass {
    if RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m)) {
        FailureClass::RateLimited
    } else if NETWORK_MARKERS.iter().any(|m| message.contains(m)) {
        FailureClass::NetworkTransient
    } else {
        FailureClass::Fatal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Result<Self> {
        validate_positive_number("retry.base_delay_ms", base_delay_ms, 1)?;
        validate_positive_number("retry.max_delay_ms", max_delay_ms, 1)?;

        Ok(Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Total number of calls the loader may make: one plus the retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after attempt `attempt` (0-based) failed with `class`.
    ///
    /// `min(base * 2^attempt + jitter, max_delay)` where jitter is
    /// `jitter_unit * 0.3 * base * 2^attempt`. Rate-limited failures use twice
    /// the configured base. Fatal failures are never delayed.
    pub fn backoff_delay(&self, class: FailureClass, attempt: u32, jitter_unit: f64) -> Duration {
        let base = match class {
            FailureClass::RateLimited => self.base_delay_ms as f64 * RATE_LIMIT_BASE_MULTIPLIER,
            FailureClass::NetworkTransient => self.base_delay_ms as f64,
            FailureClass::Fatal => return Duration::ZERO,
        };

        let unit = if jitter_unit.is_finite() {
            jitter_unit.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let exponential = base * 2f64.powi(exponent);
        let jitter = unit * JITTER_FACTOR * exponential;
        let millis = (exponential + jitter).min(self.max_delay_ms as f64);

        Duration::from_micros((millis * 1000.0).round() as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Jitter drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Constant jitter, for reproducible timing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct RetryingLoader<J: JitterSource = RandomJitter> {
    policy: RetryPolicy,
    jitter: J,
}

impl RetryingLoader<RandomJitter> {
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, RandomJitter)
    }
}

impl<J: JitterSource> RetryingLoader<J> {
    pub fn new(policy: RetryPolicy, jitter: J) -> Self {
        Self { policy, jitter }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `load_fn` until it succeeds, fails fatally, or the attempt budget
    /// runs out. Attempts never overlap and nothing is cached between calls.
    pub async fn load<F, Fut, T, E>(&self, mut load_fn: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let err = match load_fn().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!("Load succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let class = classify_failure(&err.to_string());
            if !class.is_retryable() {
                tracing::debug!("Not retrying fatal failure: {}", err);
                return Err(err);
            }

            if attempt + 1 >= max_attempts {
                tracing::warn!(
                    "Giving up after {} attempts ({:?}): {}",
                    attempt + 1,
                    class,
                    err
                );
                return Err(err);
            }

            let delay = self
                .policy
                .backoff_delay(class, attempt, self.jitter.sample());
            tracing::warn!(
                "Attempt {}/{} failed ({:?}), retrying in {:?}: {}",
                attempt + 1,
                max_attempts,
                class,
                delay,
                err
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Retry `load_fn` with `policy`, or the default policy when `None`.
pub async fn load_with_retry<F, Fut, T, E>(
    load_fn: F,
    policy: Option<RetryPolicy>,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    RetryingLoader::with_policy(policy.unwrap_or_default())
        .load(load_fn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn counting_loader(
        calls: Arc<AtomicU32>,
        failures: u32,
        message: &'static str,
    ) -> impl FnMut() -> std::pin::Pin<
        Box<dyn Future<Output = std::result::Result<&'static str, String>> + Send>,
    > {
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    Err(message.to_string())
                } else {
                    Ok("module")
                }
            })
        }
    }

    #[test]
    fn test_classify_rate_limited() {
        assert_eq!(classify_failure("HTTP 429"), FailureClass::RateLimited);
        assert_eq!(classify_failure("hit the rate limit"), FailureClass::RateLimited);
        assert_eq!(classify_failure("Too Many Requests"), FailureClass::RateLimited);
    }

    #[test]
    fn test_classify_network() {
        assert_eq!(classify_failure("TypeError: Failed to fetch"), FailureClass::NetworkTransient);
        assert_eq!(
            classify_failure("error loading dynamically imported module"),
            FailureClass::NetworkTransient
        );
        assert_eq!(classify_failure("Loading chunk 4 failed"), FailureClass::NetworkTransient);
        assert_eq!(
            classify_failure("NetworkError when attempting to fetch resource"),
            FailureClass::NetworkTransient
        );
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify_failure("Rate Limit exceeded"), FailureClass::Fatal);
        assert_eq!(classify_failure("loading chunk 4 failed"), FailureClass::Fatal);
        assert_eq!(classify_failure("permission denied"), FailureClass::Fatal);
        assert_eq!(classify_failure(""), FailureClass::Fatal);
    }

    #[test]
    fn test_rate_limit_wins_over_network() {
        assert_eq!(
            classify_failure("NetworkError: 429 Too Many Requests"),
            FailureClass::RateLimited
        );
    }

    #[test]
    fn test_policy_defaults_and_validation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay_ms(), 1000);
        assert_eq!(policy.max_delay_ms(), 10_000);
        assert_eq!(policy.max_attempts(), 4);

        assert!(RetryPolicy::new(0, 1, 1).is_ok());
        assert!(RetryPolicy::new(3, 0, 1000).is_err());
        assert!(RetryPolicy::new(3, 1000, 0).is_err());
    }

    #[test]
    fn test_backoff_without_jitter() {
        let policy = RetryPolicy::default();

        let network: Vec<u128> = (0..4)
            .map(|i| policy.backoff_delay(FailureClass::NetworkTransient, i, 0.0).as_millis())
            .collect();
        assert_eq!(network, vec![1000, 2000, 4000, 8000]);

        let rate_limited: Vec<u128> = (0..4)
            .map(|i| policy.backoff_delay(FailureClass::RateLimited, i, 0.0).as_millis())
            .collect();
        assert_eq!(rate_limited, vec![2000, 4000, 8000, 10_000]);

        assert_eq!(policy.backoff_delay(FailureClass::Fatal, 2, 0.5), Duration::ZERO);
    }

    #[test]
    fn test_backoff_jitter_adds_up_to_thirty_percent() {
        let policy = RetryPolicy::default();
        let delay = policy.backoff_delay(FailureClass::NetworkTransient, 1, 0.5);
        assert_eq!(delay.as_millis(), 2300);

        // 0.999 * 0.3 * 8000 keeps the sum above the cap
        let capped = policy.backoff_delay(FailureClass::NetworkTransient, 3, 0.999);
        assert_eq!(capped, Duration::from_millis(10_000));

        let nan = policy.backoff_delay(FailureClass::NetworkTransient, 0, f64::NAN);
        assert_eq!(nan.as_millis(), 1000);
    }

    #[test]
    fn test_backoff_monotonic_and_capped() {
        let policy = RetryPolicy::new(12, 250, 10_000).unwrap();
        for class in [FailureClass::RateLimited, FailureClass::NetworkTransient] {
            for unit in [0.0, 0.29, 0.999] {
                let mut previous = Duration::ZERO;
                for attempt in 0..policy.max_retries() {
                    let delay = policy.backoff_delay(class, attempt, unit);
                    assert!(delay >= previous, "{:?} attempt {}", class, attempt);
                    assert!(delay <= Duration::from_millis(policy.max_delay_ms()));
                    previous = delay;
                }
            }
        }
    }

    #[test]
    fn test_backoff_huge_attempt_is_capped() {
        let policy = RetryPolicy::default();
        let delay = policy.backoff_delay(FailureClass::RateLimited, u32::MAX, 0.0);
        assert_eq!(delay, Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_makes_one_call_without_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let loader = RetryingLoader::new(RetryPolicy::default(), FixedJitter(0.0));
        let start = Instant::now();

        let result = loader.load(counting_loader(calls.clone(), 0, "unused")).await;

        assert_eq!(result, Ok("module"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, 1000, 10_000).unwrap();
        let loader = RetryingLoader::new(policy, FixedJitter(0.0));
        let start = Instant::now();

        let result = loader
            .load(counting_loader(calls.clone(), 2, "HTTP 429 from CDN"))
            .await;

        assert_eq!(result, Ok("module"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let expected = policy.backoff_delay(FailureClass::RateLimited, 0, 0.0)
            + policy.backoff_delay(FailureClass::RateLimited, 1, 0.0);
        assert_eq!(expected, Duration::from_millis(6000));
        let elapsed = start.elapsed();
        assert!(elapsed >= expected, "elapsed {:?}", elapsed);
        assert!(elapsed < expected + Duration::from_millis(10), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_failure_exhausts_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let loader = RetryingLoader::new(RetryPolicy::default(), FixedJitter(0.0));

        let result = loader
            .load(counting_loader(calls.clone(), u32::MAX, "Loading chunk 4 failed"))
            .await;

        assert_eq!(result, Err("Loading chunk 4 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let loader = RetryingLoader::new(
            RetryPolicy::new(10, 1000, 10_000).unwrap(),
            FixedJitter(0.0),
        );
        let start = Instant::now();

        let result = loader
            .load(counting_loader(calls.clone(), 1, "permission denied"))
            .await;

        assert_eq!(result, Err("permission denied".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let loader = RetryingLoader::new(RetryPolicy::new(0, 1000, 10_000).unwrap(), FixedJitter(0.0));

        let result = loader
            .load(counting_loader(calls.clone(), 1, "Failed to fetch"))
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_with_retry_uses_default_policy() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = load_with_retry(counting_loader(calls.clone(), 1, "NetworkError"), None).await;

        assert_eq!(result, Ok("module"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
