//! In-memory rate cache. Entries share one expiry: the whole map is cleared
//! on a fixed period, there is no per-key TTL.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

struct Inner {
    rates: HashMap<String, f64>,
    cleared_at: DateTime<Utc>,
}

pub struct RateCache {
    inner: RwLock<Inner>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rates: HashMap::new(),
                cleared_at: Utc::now(),
            }),
        }
    }

    /// Splits `codes` into cached rates and the codes that still need a fetch.
    pub async fn lookup(&self, codes: &[String]) -> (HashMap<String, f64>, Vec<String>) {
        let inner = self.inner.read().await;
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for code in codes {
            match inner.rates.get(code) {
                Some(rate) => {
                    found.insert(code.clone(), *rate);
                }
                None if !missing.contains(code) => missing.push(code.clone()),
                None => {}
            }
        }
        debug!(hits = found.len(), misses = missing.len(), "rate cache lookup");
        (found, missing)
    }

    pub async fn store(&self, snapshot: &HashMap<String, f64>) {
        let mut inner = self.inner.write().await;
        inner
            .rates
            .extend(snapshot.iter().map(|(code, rate)| (code.clone(), *rate)));
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.rates.clear();
        inner.cleared_at = Utc::now();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rates.len()
    }

    pub async fn cleared_at(&self) -> DateTime<Utc> {
        self.inner.read().await.cleared_at
    }

    /// Clears the cache every `every`, starting one period from now.
    pub fn spawn_expiry(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let dropped = self.len().await;
                self.clear().await;
                info!(dropped, "rate cache cleared");
            }
        })
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    async fn cached(cache: &RateCache, code: &str) -> Option<f64> {
        let (found, _) = cache.lookup(&[code.to_string()]).await;
        found.get(code).copied()
    }

    #[tokio::test]
    async fn stores_and_reads_rates() {
        let cache = RateCache::new();
        assert!(cached(&cache, "EUR").await.is_none());

        cache.store(&snapshot(&[("EUR", 1.0), ("USD", 1.08)])).await;

        assert_eq!(cached(&cache, "USD").await, Some(1.08));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn lookup_splits_hits_and_misses() {
        let cache = RateCache::new();
        cache.store(&snapshot(&[("USD", 1.08)])).await;

        let codes = vec!["USD".to_string(), "GBP".to_string(), "GBP".to_string()];
        let (found, missing) = cache.lookup(&codes).await;

        assert_eq!(found.get("USD"), Some(&1.08));
        assert_eq!(missing, vec!["GBP".to_string()]);
    }

    #[tokio::test]
    async fn clear_drops_everything_and_stamps_time() {
        let cache = RateCache::new();
        let before = cache.cleared_at().await;
        cache.store(&snapshot(&[("USD", 1.08), ("JPY", 160.2)])).await;

        cache.clear().await;

        assert_eq!(cache.len().await, 0);
        assert!(cache.cleared_at().await >= before);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_task_clears_after_period() {
        let cache = Arc::new(RateCache::new());
        cache.store(&snapshot(&[("USD", 1.08)])).await;
        let handle = Arc::clone(&cache).spawn_expiry(Duration::from_secs(30 * 60));

        tokio::time::sleep(Duration::from_secs(29 * 60)).await;
        assert_eq!(cached(&cache, "USD").await, Some(1.08));

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert!(cached(&cache, "USD").await.is_none());

        handle.abort();
    }
}
