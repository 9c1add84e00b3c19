//! Single-slot TTL cache for the site settings
//!
//! Settings are read on nearly every public page and change rarely, so a
//! short-lived in-process copy is enough. The one mutating path calls
//! `invalidate` right after persisting; a reader racing the invalidation
//! may see either value.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::models::settings::SiteSettings;

#[derive(Clone)]
struct CachedSettings {
    value: SiteSettings,
    fetched_at: Instant,
}

/// Cached accessor for the settings singleton
#[derive(Clone)]
pub struct SettingsCache {
    slot: Arc<RwLock<Option<CachedSettings>>>,
    ttl: Duration,
}

impl SettingsCache {
    /// Default time-to-live: five minutes
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// Create a new cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Return the cached settings, or load and cache them via `load`
    pub async fn get<F, Fut, E>(&self, load: F) -> Result<SiteSettings, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SiteSettings, E>>,
    {
        {
            let guard = self.slot.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.value.clone());
                }
            }
        }

        let value = load().await?;

        let mut guard = self.slot.write().await;
        *guard = Some(CachedSettings {
            value: value.clone(),
            fetched_at: Instant::now(),
        });

        Ok(value)
    }

    /// Drop the cached value so the next read reloads
    pub async fn invalidate(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_settings() -> SiteSettings {
        SiteSettings {
            site_title: "Stagepass".to_string(),
            contact_email: "box@stagepass.app".to_string(),
            contact_phone: None,
            homepage_html: None,
            ticket_notice: None,
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_second_read_within_ttl_hits_the_cache() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<_, Infallible> = cache
                .get(|| async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(sample_settings())
                })
                .await;
            assert_eq!(value.unwrap().site_title, "Stagepass");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_reloads() {
        let cache = SettingsCache::new(Duration::ZERO);
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<_, Infallible> = cache
                .get(|| async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(sample_settings())
                })
                .await;
        }

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        let _: Result<_, Infallible> = cache
            .get(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(sample_settings())
            })
            .await;

        cache.invalidate().await;

        let _: Result<_, Infallible> = cache
            .get(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(sample_settings())
            })
            .await;

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_failure_is_not_cached() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        let failed: Result<SiteSettings, &str> = cache
            .get(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Err("database down")
            })
            .await;
        assert!(failed.is_err());

        let ok: Result<_, &str> = cache
            .get(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(sample_settings())
            })
            .await;
        assert!(ok.is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
