use axum::{Json, extract::State};
use serde::Serialize;

use agrihub_services::openrouter::{DEFAULT_VISION_MODEL, PRICE_MODELS, VISION_MODELS, VisionModel};
use agrihub_services::prompts::VEGETABLES;
use agrihub_services::{AiReply, PriceForecast, Timeframe};

use crate::error::{ApiError, ApiResult, ok};
use crate::forms::{ImageForm, PriceForm, SoilForm};
use crate::state::AppState;

const FAILED: &str = "Analysis failed: ";

pub async fn plant(State(state): State<AppState>, Json(form): Json<ImageForm>) -> ApiResult<AiReply> {
    let (provider, image) = form.validate()?;
    let reply = state
        .analysis
        .analyze_plant(&provider, &image)
        .await
        .map_err(|e| ApiError::service(FAILED, e))?;
    ok(reply)
}

pub async fn pest(State(state): State<AppState>, Json(form): Json<ImageForm>) -> ApiResult<AiReply> {
    let (provider, image) = form.validate()?;
    let reply = state
        .analysis
        .analyze_pest(&provider, &image)
        .await
        .map_err(|e| ApiError::service(FAILED, e))?;
    ok(reply)
}

pub async fn soil(State(state): State<AppState>, Json(form): Json<SoilForm>) -> ApiResult<AiReply> {
    let (provider, sample) = form.validate()?;
    let reply = state
        .analysis
        .analyze_soil(&provider, &sample)
        .await
        .map_err(|e| ApiError::service(FAILED, e))?;
    ok(reply)
}

pub async fn price(State(state): State<AppState>, Json(form): Json<PriceForm>) -> ApiResult<PriceForecast> {
    let (vegetable, location, timeframe) = form.validate()?;
    let forecast = state
        .analysis
        .predict_price(&vegetable, &location, timeframe)
        .await
        .map_err(|e| ApiError::service("", e))?;
    ok(forecast)
}

#[derive(Debug, Serialize)]
pub struct TimeframeOption {
    pub weeks: u32,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Catalogue {
    pub vision_models: &'static [VisionModel],
    pub default_vision_model: &'static str,
    pub price_models: &'static [&'static str],
    pub vegetables: &'static [&'static str],
    pub timeframes: Vec<TimeframeOption>,
}

/// Choices offered by the analysis forms.
pub async fn models() -> ApiResult<Catalogue> {
    ok(Catalogue {
        vision_models: VISION_MODELS,
        default_vision_model: DEFAULT_VISION_MODEL,
        price_models: PRICE_MODELS,
        vegetables: VEGETABLES,
        timeframes: Timeframe::ALL
            .into_iter()
            .map(|t| TimeframeOption {
                weeks: t.weeks(),
                label: t.label(),
            })
            .collect(),
    })
}
