//! Refresh-token store
//!
//! Refresh tokens are opaque 64-character hex strings. Each one is stored
//! under `refresh:{token}` with the user id as the value and a TTL equal
//! to the refresh expiry, so expired tokens disappear from the store
//! without any sweeper. Uniqueness comes from the keyspace itself.

use anyhow::Result;
use rand::RngCore;
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

const TOKEN_BYTES: usize = 32;

/// Generate an opaque refresh token (64 hex characters)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn token_key(token: &str) -> String {
    format!("refresh:{}", token)
}

/// Redis-backed store for opaque refresh tokens
#[derive(Clone)]
pub struct RefreshTokenStore {
    redis: RedisPool,
    ttl_seconds: u64,
}

impl RefreshTokenStore {
    /// Create a new refresh-token store
    pub fn new(redis: RedisPool, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    /// Issue a new refresh token for a user
    pub async fn issue(&self, user_id: Uuid) -> Result<String> {
        let token = generate_token();
        self.redis
            .set(&token_key(&token), &user_id.to_string(), Some(self.ttl_seconds))
            .await?;

        info!("Issued refresh token for user: {}", user_id);
        Ok(token)
    }

    /// Resolve a refresh token to its user id, if it is live
    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let value = self.redis.get(&token_key(token)).await?;
        match value {
            Some(raw) => {
                let user_id = raw
                    .parse::<Uuid>()
                    .map_err(|e| anyhow::anyhow!("Corrupt refresh token entry: {}", e))?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    /// Delete a refresh token, returning whether it existed
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        self.redis.delete(&token_key(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_key_prefix() {
        assert_eq!(token_key("abc"), "refresh:abc");
    }
}
