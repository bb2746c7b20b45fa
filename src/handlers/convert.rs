use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::config::AppState;
use crate::models::conversion::{
    ConvertRequest, ConvertResponse, MultiConvertRequest, MultiConvertResponse,
};
use crate::services::conversion::{checked, convert as convert_amount, convert_many as fan_out};
use crate::utils::error::ApiError;

// --- Basic validation using ApiError::Validation(String) ---
fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("amount must be a positive number".into()));
    }
    Ok(())
}

/// Returns the upper-cased code, or 400 unless it is exactly three ASCII letters.
fn validate_currency(field: &str, code: &str) -> Result<String, ApiError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::Validation(format!(
            "{} must be a 3-letter ISO code (e.g., USD)",
            field
        )));
    }
    Ok(code.to_ascii_uppercase())
}

fn validate_targets(targets: &[String], max: usize) -> Result<Vec<String>, ApiError> {
    if targets.is_empty() {
        return Err(ApiError::Validation("to must list at least one currency".into()));
    }
    let mut out: Vec<String> = Vec::with_capacity(targets.len());
    for t in targets {
        let code = validate_currency("to", t)?;
        if !out.contains(&code) {
            out.push(code);
        }
    }
    if out.len() > max {
        return Err(ApiError::Validation(format!(
            "to must list at most {} currencies",
            max
        )));
    }
    Ok(out)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

pub async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    validate_amount(req.amount)?;
    let from = validate_currency("from", &req.from)?;
    let to = validate_currency("to", &req.to)?;

    let rates = state.rates.rates(&[from.clone(), to.clone()]).await?;
    let rate_of = |code: &String| {
        rates
            .get(code)
            .copied()
            .ok_or_else(|| ApiError::UnsupportedCurrency(code.clone()))
    };
    let from_rate = rate_of(&from)?;
    let to_rate = rate_of(&to)?;
    let converted = checked(convert_amount(req.amount, from_rate, to_rate))?;

    Ok((
        StatusCode::OK,
        Json(ConvertResponse {
            converted,
            message: format!("{:.2} {} = {:.2} {}", req.amount, from, converted, to),
            currency: to,
        }),
    ))
}

pub async fn convert_many(
    State(state): State<AppState>,
    payload: Result<Json<MultiConvertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    validate_amount(req.amount)?;
    let from = validate_currency("from", &req.from)?;
    let targets = validate_targets(&req.to, state.max_targets)?;
    let requested = targets.len();

    let result = fan_out(state.rates.clone(), req.amount, &from, targets).await?;

    let message = format!(
        "{:.2} {} converted to {} of {} currencies",
        req.amount,
        from,
        result.converted.len(),
        requested
    );
    Ok((
        StatusCode::OK,
        Json(MultiConvertResponse {
            amount: req.amount,
            from,
            converted: result.converted,
            skipped: result.skipped,
            message,
        }),
    ))
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.rates.cache();
    let cached = cache.len().await;
    let cleared_at = cache.cleared_at().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "provider": state.rates.provider().name(),
            "cached_currencies": cached,
            "cache_cleared_at": cleared_at.to_rfc3339(),
        })),
    )
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "ok": true })))
}
