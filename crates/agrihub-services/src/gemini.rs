//! Google Gemini `generateContent` client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServiceError, map_reqwest_error};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const PROVIDER: &str = "Gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'static str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agrihub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One instruction, optionally with a base64 JPEG, answered as text.
    pub async fn generate(&self, prompt: &str, image: Option<&str>) -> Result<String, ServiceError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        debug!(model = %self.model, with_image = image.is_some(), "gemini request");

        let res = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body(prompt, image))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ServiceError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        res.json::<GenerateResponse>()
            .await
            .map_err(|_| ServiceError::EmptyReply { provider: PROVIDER })?
            .text()
            .ok_or(ServiceError::EmptyReply { provider: PROVIDER })
    }
}

fn request_body<'a>(prompt: &'a str, image: Option<&'a str>) -> GenerateRequest<'a> {
    let mut parts = vec![Part::Text { text: prompt }];
    if let Some(data) = image {
        parts.push(Part::Image {
            inline_data: InlineData {
                mime_type: "image/jpeg",
                data,
            },
        });
    }
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}
