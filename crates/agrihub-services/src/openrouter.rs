//! OpenRouter chat-completions client and the free vision model catalogue.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, map_reqwest_error};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const PROVIDER: &str = "OpenRouter";
const APP_TITLE: &str = "AgriHub";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisionModel {
    pub id: &'static str,
    pub name: &'static str,
}

pub const VISION_MODELS: &[VisionModel] = &[
    VisionModel { id: "google/gemini-2.0-flash-exp:free", name: "Gemini 2.0 Flash Experimental" },
    VisionModel { id: "qwen/qwen2.5-vl-72b-instruct:free", name: "Qwen2.5 VL 72B" },
    VisionModel { id: "meta-llama/llama-3.2-11b-vision-instruct:free", name: "Llama 3.2 11B Vision" },
    VisionModel { id: "qwen/qwen2.5-vl-32b-instruct:free", name: "Qwen2.5 VL 32B" },
    VisionModel { id: "moonshotai/kimi-vl-a3b-thinking:free", name: "Kimi VL A3B Thinking" },
    VisionModel { id: "google/gemma-3-27b-it:free", name: "Gemma 3 27B" },
    VisionModel { id: "google/gemma-3-12b-it:free", name: "Gemma 3 12B" },
    VisionModel { id: "mistralai/mistral-small-3.2-24b-instruct:free", name: "Mistral Small 3.2 24B" },
];

pub const DEFAULT_VISION_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// Tried in order for text-only price prediction.
pub const PRICE_MODELS: &[&str] = &[
    "microsoft/mai-ds-r1:free",
    "deepseek/deepseek-chat:free",
    "meta-llama/llama-3.3-70b-instruct:free",
    "google/gemini-2.0-flash-exp:free",
];

pub fn is_vision_model(id: &str) -> bool {
    VISION_MODELS.iter().any(|m| m.id == id)
}

// -- Wire types --

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(content.into()),
        }
    }

    /// User turn carrying an instruction and a base64 JPEG.
    pub fn user_with_image(text: impl Into<String>, image_base64: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{image_base64}"),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

// -- Client --

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
}

impl OpenRouterClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agrihub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self { http, api_key })
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ServiceError> {
        debug!(model = %request.model, "openrouter request");
        let res = self
            .http
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("X-Title", APP_TITLE)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            debug!(model = %request.model, status = status.as_u16(), %body, "openrouter error body");
            return Err(ServiceError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        res.json::<ChatResponse>()
            .await
            .map_err(|_| ServiceError::EmptyReply { provider: PROVIDER })?
            .text()
            .ok_or(ServiceError::EmptyReply { provider: PROVIDER })
    }

    /// Ask each model in `models` in turn until one answers.
    pub async fn complete_with_fallback(
        &self,
        models: &[&str],
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ServiceError> {
        first_answer(models, |model| {
            let request = ChatRequest {
                model: model.to_string(),
                messages: messages.clone(),
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
            };
            async move { self.complete(&request).await }
        })
        .await
    }
}

/// Walk `models` in order, returning the first successful answer. Model
/// failures move on to the next entry; any other error stops the walk.
pub async fn first_answer<F, Fut>(models: &[&str], mut attempt: F) -> Result<String, ServiceError>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<String, ServiceError>>,
{
    for &model in models {
        match attempt(model).await {
            Ok(answer) => {
                info!(%model, "Model answered");
                return Ok(answer);
            }
            Err(e) if e.is_model_failure() => {
                warn!(%model, "Model failed, trying next: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Err(ServiceError::AllModelsUnavailable)
}
