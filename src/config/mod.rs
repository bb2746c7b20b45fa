use reqwest::Client;
use std::{env, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::services::rate_cache::RateCache;
use crate::services::rate_client::{RateClient, RateProvider};
use crate::services::rate_service::RateService;

#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateService>,
    pub max_targets: usize,
}

pub struct AppConfig {
    pub port: u16,
    pub api_key: Option<String>,
    pub provider: RateProvider,
    pub rates_url: String,
    pub base_currency: String,
    pub external_timeout_ms: u64,
    pub cache_ttl: Duration,
    pub max_targets: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let port: u16 = env::var("PORT").unwrap_or_else(|_| "8080".into()).parse()?;
        let api_key = env::var("FIXER_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let provider: RateProvider = env::var("RATE_PROVIDER")
            .unwrap_or_else(|_| "fixer".into())
            .parse()?;
        let rates_url = env::var("RATES_URL").unwrap_or_else(|_| provider.default_url().into());
        let base_currency = env::var("BASE_CURRENCY")
            .unwrap_or_else(|_| "EUR".into())
            .to_ascii_uppercase();
        let external_timeout_ms: u64 = env::var("EXTERNAL_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12_000);
        let cache_ttl_secs: u64 = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|s| *s > 0)
            .unwrap_or(30 * 60);
        let max_targets: usize = env::var("MAX_TARGETS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(32);
        Ok(Self {
            port,
            api_key,
            provider,
            rates_url,
            base_currency,
            external_timeout_ms,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            max_targets,
        })
    }

    pub fn build_state(&self) -> Result<AppState, anyhow::Error> {
        if self.api_key.is_none() {
            // Requests that miss the cache will fail with 500 until one is set.
            warn!("FIXER_API_KEY is not set");
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(self.external_timeout_ms))
            .build()?;

        let client = RateClient::new(
            http,
            self.provider,
            self.rates_url.clone(),
            self.api_key.clone(),
            self.base_currency.clone(),
        );
        let rates = RateService::new(client, Arc::new(RateCache::new()));
        info!(provider = %self.provider, url = %self.rates_url, "✅ Rate client ready");

        Ok(AppState {
            rates: Arc::new(rates),
            max_targets: self.max_targets,
        })
    }
}
