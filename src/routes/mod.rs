use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppState;
use crate::handlers::convert::{convert, convert_many, health, status};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(convert)) // function-style entry point
        .route("/convert", post(convert))
        .route("/convert/many", post(convert_many))
        .route("/status", get(status))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
