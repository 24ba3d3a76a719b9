use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ServiceError;
use crate::gemini::GeminiClient;
use crate::openrouter::{ChatMessage, ChatRequest, DEFAULT_VISION_MODEL, OpenRouterClient, PRICE_MODELS};
use crate::prompts::{self, SoilSample, Timeframe};
use crate::reply::{AiReply, PriceForecast, PricePrediction};

const PRICE_TEMPERATURE: f32 = 0.7;
const PRICE_MAX_TOKENS: u32 = 1000;

/// Which backend answers an analysis request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenRouter {
        #[serde(default = "default_vision_model")]
        model: String,
    },
}

fn default_vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}

/// Plant, pest and soil analysis plus price prediction. A provider without a
/// configured key reports [`ServiceError::MissingApiKey`] when used.
#[derive(Debug, Clone, Default)]
pub struct AnalysisService {
    gemini: Option<GeminiClient>,
    openrouter: Option<OpenRouterClient>,
}

impl AnalysisService {
    pub fn new(gemini_key: Option<String>, openrouter_key: Option<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            gemini: gemini_key.map(GeminiClient::new).transpose()?,
            openrouter: openrouter_key.map(OpenRouterClient::new).transpose()?,
        })
    }

    pub fn has_gemini(&self) -> bool {
        self.gemini.is_some()
    }

    pub fn has_openrouter(&self) -> bool {
        self.openrouter.is_some()
    }

    fn gemini(&self) -> Result<&GeminiClient, ServiceError> {
        self.gemini
            .as_ref()
            .ok_or(ServiceError::MissingApiKey("GEMINI_API_KEY"))
    }

    fn openrouter(&self) -> Result<&OpenRouterClient, ServiceError> {
        self.openrouter
            .as_ref()
            .ok_or(ServiceError::MissingApiKey("OPENROUTER_API_KEY"))
    }

    async fn ask(
        &self,
        provider: &Provider,
        prompt: &str,
        image: Option<&str>,
    ) -> Result<AiReply, ServiceError> {
        let text = match provider {
            Provider::Gemini => self.gemini()?.generate(prompt, image).await?,
            Provider::OpenRouter { model } => {
                let message = match image {
                    Some(image) => ChatMessage::user_with_image(prompt, image),
                    None => ChatMessage::user(prompt),
                };
                let request = ChatRequest {
                    model: model.clone(),
                    messages: vec![message],
                    temperature: None,
                    max_tokens: None,
                };
                self.openrouter()?.complete(&request).await?
            }
        };
        Ok(AiReply::Text(text))
    }

    pub async fn analyze_plant(&self, provider: &Provider, image: &str) -> Result<AiReply, ServiceError> {
        self.ask(provider, prompts::PLANT_HEALTH, Some(image)).await
    }

    pub async fn analyze_pest(&self, provider: &Provider, image: &str) -> Result<AiReply, ServiceError> {
        self.ask(provider, prompts::PEST_IDENTIFICATION, Some(image)).await
    }

    pub async fn analyze_soil(&self, provider: &Provider, sample: &SoilSample) -> Result<AiReply, ServiceError> {
        self.ask(provider, &prompts::soil_health(sample), None).await
    }

    /// Forecast via the OpenRouter fallback list.
    pub async fn predict_price(
        &self,
        vegetable: &str,
        location: &str,
        timeframe: Timeframe,
    ) -> Result<PriceForecast, ServiceError> {
        let client = self.openrouter()?;
        let messages = vec![
            ChatMessage::system(prompts::PRICE_SYSTEM),
            ChatMessage::user(prompts::price_prediction(vegetable, location, timeframe)),
        ];
        let raw = client
            .complete_with_fallback(PRICE_MODELS, messages, PRICE_TEMPERATURE, PRICE_MAX_TOKENS)
            .await?;

        let prediction = forecast_from_reply(&raw)?;
        info!(%vegetable, %location, timeframe = timeframe.label(), "Price predicted");
        Ok(PriceForecast::new(vegetable, location, timeframe, prediction))
    }
}

fn forecast_from_reply(raw: &str) -> Result<PricePrediction, ServiceError> {
    match AiReply::structured(raw)? {
        AiReply::Structured(map) => PricePrediction::from_structured(&map),
        AiReply::Text(_) => Err(ServiceError::InvalidFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_provider_reports_missing_key() {
        let service = AnalysisService::default();

        let err = service.analyze_plant(&Provider::Gemini, "AAAA").await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingApiKey("GEMINI_API_KEY")));

        let err = service
            .predict_price("Tomato", "Pune", Timeframe::OneWeek)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingApiKey("OPENROUTER_API_KEY")));
    }

    #[test]
    fn provider_selection_deserializes() {
        let p: Provider = serde_json::from_str(r#"{"provider":"gemini"}"#).unwrap();
        assert_eq!(p, Provider::Gemini);

        let p: Provider = serde_json::from_str(r#"{"provider":"openrouter"}"#).unwrap();
        assert_eq!(
            p,
            Provider::OpenRouter {
                model: DEFAULT_VISION_MODEL.to_string()
            }
        );

        let p: Provider =
            serde_json::from_str(r#"{"provider":"openrouter","model":"google/gemma-3-27b-it:free"}"#)
                .unwrap();
        assert!(matches!(p, Provider::OpenRouter { model } if model == "google/gemma-3-27b-it:free"));
    }

    #[test]
    fn reply_becomes_prediction() {
        let raw = "```json\n{\"currentPrice\": 40, \"predictedPrice\": 44, \"change\": 10, \"confidence\": \"High\"}\n```";
        let p = forecast_from_reply(raw).unwrap();
        assert_eq!(p.predicted_price, 44.0);
        assert_eq!(p.confidence, "High");

        assert!(matches!(
            forecast_from_reply("no json here"),
            Err(ServiceError::InvalidFormat)
        ));
    }
}
