use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::types::external::FixerLatest;
use crate::utils::error::ApiError;

/// Which flavour of the Fixer API to call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateProvider {
    /// data.fixer.io, key passed as `access_key` query param.
    Fixer,
    /// api.apilayer.com/fixer, key passed in the `apikey` header.
    ApiLayer,
}

impl RateProvider {
    pub fn default_url(&self) -> &'static str {
        match self {
            RateProvider::Fixer => "https://data.fixer.io/api/latest",
            RateProvider::ApiLayer => "https://api.apilayer.com/fixer/latest",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RateProvider::Fixer => "fixer",
            RateProvider::ApiLayer => "apilayer",
        }
    }
}

impl fmt::Display for RateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RateProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixer" => Ok(RateProvider::Fixer),
            "apilayer" => Ok(RateProvider::ApiLayer),
            other => Err(anyhow::anyhow!(
                "unknown RATE_PROVIDER '{}', expected fixer or apilayer",
                other
            )),
        }
    }
}

pub struct RateClient {
    http: Client,
    provider: RateProvider,
    url: String,
    api_key: Option<String>,
    base_currency: String,
}

impl RateClient {
    pub fn new(
        http: Client,
        provider: RateProvider,
        url: String,
        api_key: Option<String>,
        base_currency: String,
    ) -> Self {
        Self { http, provider, url, api_key, base_currency }
    }

    pub fn provider(&self) -> RateProvider {
        self.provider
    }

    /// Fetches the latest rates for `symbols`. Codes the upstream does not
    /// know, or reports with a non-positive rate, are absent from the result.
    pub async fn fetch(&self, symbols: &[String]) -> Result<HashMap<String, f64>, ApiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Internal("API key not configured".into()))?;
        let symbols = symbols.join(",");

        let request = match self.provider {
            RateProvider::Fixer => self
                .http
                .get(&self.url)
                .query(&[("access_key", api_key), ("symbols", symbols.as_str())]),
            RateProvider::ApiLayer => self
                .http
                .get(&self.url)
                .header("apikey", api_key)
                .query(&[("base", self.base_currency.as_str()), ("symbols", symbols.as_str())]),
        };

        debug!(provider = %self.provider, %symbols, "fetching rates");
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::External(format!("Could not reach {}: {}", self.provider, e)))?;

        if resp.status() != StatusCode::OK {
            warn!(provider = %self.provider, status = %resp.status(), "rate API request failed");
            return Err(ApiError::External(format!(
                "{} responded with {}",
                self.provider,
                resp.status()
            )));
        }

        let body: FixerLatest = resp
            .json()
            .await
            .map_err(|e| ApiError::External(format!("Could not parse rates: {}", e)))?;

        if body.success == Some(false) {
            let reason = body
                .error
                .as_ref()
                .map(|e| e.describe())
                .unwrap_or_else(|| "unknown error".into());
            warn!(provider = %self.provider, %reason, "rate API reported failure");
            return Err(ApiError::External(format!("{} error: {}", self.provider, reason)));
        }

        debug!(
            base = body.base.as_deref().unwrap_or("?"),
            count = body.rates.len(),
            "rates received"
        );

        Ok(body
            .rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect())
    }
}
