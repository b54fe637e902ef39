//! In-memory rate limiting for authentication attempts.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by normalized email. Two limits are enforced:
//! - Per-key: 10 attempts/min (login, reset-code requests share the key)
//! - Global: 200 attempts/min across all keys
//!
//! The hosted backend this service replaces enforced an equivalent limit and
//! the client already translates the rejection ("Muitas tentativas...").

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_PER_KEY_LIMIT: usize = 10;
const DEFAULT_PER_KEY_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 200;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

#[derive(Clone, Copy)]
struct RateLimitConfig {
    per_key_limit: usize,
    per_key_window: Duration,
    global_limit: usize,
    global_window: Duration,
}

impl RateLimitConfig {
    fn from_env() -> Self {
        let per_key_window_secs = env_parse("AUTH_RATE_LIMIT_PER_KEY_WINDOW_SECS", DEFAULT_PER_KEY_WINDOW_SECS);
        let global_window_secs = env_parse("AUTH_RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS);

        Self {
            per_key_limit: env_parse("AUTH_RATE_LIMIT_PER_KEY", DEFAULT_PER_KEY_LIMIT),
            per_key_window: Duration::from_secs(per_key_window_secs),
            global_limit: env_parse("AUTH_RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(global_window_secs),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded for this account (max {limit} attempts/{window_secs}s)")]
    KeyExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} attempts/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

struct RateLimiterInner {
    /// Per-key attempt timestamps.
    key_attempts: HashMap<String, VecDeque<Instant>>,
    /// Global attempt timestamps.
    global_attempts: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                key_attempts: HashMap::new(),
                global_attempts: VecDeque::new(),
            })),
            config: RateLimitConfig::from_env(),
        }
    }

    /// Check both per-key and global limits, then record the attempt.
    pub fn check_and_record(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(key, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_attempts, now, cfg.global_window);
        if inner.global_attempts.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let key_deque = inner.key_attempts.entry(key.to_owned()).or_default();
        prune_window(key_deque, now, cfg.per_key_window);
        if key_deque.len() >= cfg.per_key_limit {
            return Err(RateLimitError::KeyExceeded {
                limit: cfg.per_key_limit,
                window_secs: cfg.per_key_window.as_secs(),
            });
        }

        key_deque.push_back(now);
        inner.global_attempts.push_back(now);

        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
