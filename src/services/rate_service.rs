use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::services::rate_cache::RateCache;
use crate::services::rate_client::{RateClient, RateProvider};
use crate::utils::error::ApiError;

/// Rate lookups served from the cache, falling back to one upstream fetch
/// covering every code the cache is missing.
pub struct RateService {
    client: RateClient,
    cache: Arc<RateCache>,
}

impl RateService {
    pub fn new(client: RateClient, cache: Arc<RateCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> Arc<RateCache> {
        Arc::clone(&self.cache)
    }

    pub fn provider(&self) -> RateProvider {
        self.client.provider()
    }

    /// Cached and freshly fetched rates for `codes`. Codes the upstream does
    /// not know are simply absent.
    pub async fn snapshot(&self, codes: &[String]) -> Result<HashMap<String, f64>, ApiError> {
        let (mut found, missing) = self.cache.lookup(codes).await;
        if missing.is_empty() {
            return Ok(found);
        }

        let fetched = self.client.fetch(&missing).await?;
        self.cache.store(&fetched).await;
        info!(requested = missing.len(), received = fetched.len(), "rates refreshed");

        for code in missing {
            if let Some(rate) = fetched.get(&code) {
                found.insert(code, *rate);
            }
        }
        Ok(found)
    }

    pub async fn rates(&self, codes: &[String]) -> Result<HashMap<String, f64>, ApiError> {
        let found = self.snapshot(codes).await?;
        if let Some(code) = codes.iter().find(|c| !found.contains_key(*c)) {
            return Err(ApiError::UnsupportedCurrency(code.clone()));
        }
        Ok(found)
    }
}
