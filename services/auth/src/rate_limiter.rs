//! Rate limiter for login brute-force lockout

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Number of attempts
    attempts: u32,
    /// Last attempt time
    last_attempt: Instant,
    /// Ban expiration time
    ban_expires: Option<Instant>,
}

/// Rate limiter keyed by login identifier
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if a key is allowed to make another attempt
    pub async fn is_allowed(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            last_attempt: now,
            ban_expires: None,
        });

        // Check if ban has expired
        if let Some(ban_expires) = entry.ban_expires {
            if now >= ban_expires {
                entry.attempts = 0;
                entry.ban_expires = None;
            } else {
                return Ok(false);
            }
        }

        // Check if window has expired
        if now.duration_since(entry.last_attempt) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.attempts = 0;
        }

        // Check if we're over the limit
        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return Ok(false);
        }

        entry.attempts += 1;
        entry.last_attempt = now;

        Ok(true)
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 2,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn test_attempts_under_limit_are_allowed() {
        let limiter = strict_limiter();
        assert!(limiter.is_allowed("user@example.com").await.unwrap());
        assert!(limiter.is_allowed("user@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_key_is_banned_over_limit() {
        let limiter = strict_limiter();
        assert!(limiter.is_allowed("user@example.com").await.unwrap());
        assert!(limiter.is_allowed("user@example.com").await.unwrap());
        assert!(!limiter.is_allowed("user@example.com").await.unwrap());
        // The ban sticks for subsequent attempts
        assert!(!limiter.is_allowed("user@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = strict_limiter();
        assert!(limiter.is_allowed("first@example.com").await.unwrap());
        assert!(limiter.is_allowed("first@example.com").await.unwrap());
        assert!(!limiter.is_allowed("first@example.com").await.unwrap());
        assert!(limiter.is_allowed("second@example.com").await.unwrap());
    }
}
