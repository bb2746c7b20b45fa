use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::warn;

use crate::services::rate_service::RateService;
use crate::utils::error::ApiError;

/// Converts through the common base: `amount / from_rate` is the amount in
/// base units, multiplied by `to_rate`.
pub fn convert(amount: f64, from_rate: f64, to_rate: f64) -> f64 {
    amount * (to_rate / from_rate)
}

pub struct FanOut {
    pub converted: BTreeMap<String, f64>,
    pub skipped: Vec<String>,
}

/// Rejects results that overflowed; serde_json would write them as `null`.
pub fn checked(value: f64) -> Result<f64, ApiError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::Validation("converted amount out of range".into()))
    }
}

/// One task per target over a single upstream snapshot. Unsupported targets
/// are skipped; any other failure fails the whole conversion.
pub async fn convert_many(
    rates: Arc<RateService>,
    amount: f64,
    from: &str,
    targets: Vec<String>,
) -> Result<FanOut, ApiError> {
    let mut codes = Vec::with_capacity(targets.len() + 1);
    codes.push(from.to_string());
    codes.extend(targets.iter().cloned());
    let snapshot = Arc::new(rates.snapshot(&codes).await?);

    let from_rate = snapshot
        .get(from)
        .copied()
        .ok_or_else(|| ApiError::UnsupportedCurrency(from.to_string()))?;

    let converted = Arc::new(Mutex::new(BTreeMap::new()));
    let mut tasks = JoinSet::new();
    for target in targets {
        let snapshot = Arc::clone(&snapshot);
        let converted = Arc::clone(&converted);
        tasks.spawn(async move {
            let Some(to_rate) = snapshot.get(&target).copied() else {
                warn!(code = %target, "skipping unsupported target currency");
                return Ok(Some(target));
            };
            let value = checked(convert(amount, from_rate, to_rate))?;
            converted.lock().await.insert(target, value);
            Ok::<_, ApiError>(None)
        });
    }

    let mut skipped = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| ApiError::Internal(format!("conversion task failed: {}", e)))?;
        if let Some(code) = outcome? {
            skipped.push(code);
        }
    }
    skipped.sort();

    let converted = std::mem::take(&mut *converted.lock().await);
    Ok(FanOut { converted, skipped })
}
