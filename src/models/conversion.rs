use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
pub struct ConvertResponse {
    pub converted: f64,
    pub currency: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct MultiConvertRequest {
    pub amount: f64,
    pub from: String,
    #[serde(alias = "targets")]
    pub to: Vec<String>,
}

#[derive(Serialize)]
pub struct MultiConvertResponse {
    pub amount: f64,
    pub from: String,
    pub converted: BTreeMap<String, f64>,
    pub skipped: Vec<String>,
    pub message: String,
}
