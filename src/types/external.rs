use serde::Deserialize;
use std::collections::HashMap;

/// Body of `/latest` on both data.fixer.io and the apilayer mirror.
/// Failures arrive as HTTP 200 with `success: false` and an `error` object.
#[derive(Deserialize)]
pub struct FixerLatest {
    pub success: Option<bool>,
    pub base: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
    pub error: Option<FixerError>,
}

#[derive(Deserialize)]
pub struct FixerError {
    pub code: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub info: Option<String>,
}

impl FixerError {
    pub fn describe(&self) -> String {
        let code = self.code.map(|c| c.to_string()).unwrap_or_else(|| "?".into());
        let text = self
            .info
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("unknown error");
        format!("{} ({})", text, code)
    }
}
