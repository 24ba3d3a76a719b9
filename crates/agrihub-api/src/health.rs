use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::warn;

use agrihub_types::Envelope;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub version: &'static str,
    pub database: bool,
    pub gemini: bool,
    pub openrouter: bool,
    pub news: bool,
}

/// Round-trips the row store. When it is unreachable the answer is a 503
/// failure envelope.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Envelope<Health>>) {
    let database = state.db.check_connection().await.is_success();
    let health = Health {
        version: env!("CARGO_PKG_VERSION"),
        database,
        gemini: state.analysis.has_gemini(),
        openrouter: state.analysis.has_openrouter(),
        news: state.news.is_some(),
    };
    if database {
        (StatusCode::OK, Json(Envelope::Success(health)))
    } else {
        warn!(?health, "Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, Json(Envelope::failure("Database unreachable")))
    }
}
