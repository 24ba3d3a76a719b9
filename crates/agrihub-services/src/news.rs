//! GNews search client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ServiceError, map_reqwest_error};

const GNEWS_SEARCH_URL: &str = "https://gnews.io/api/v4/search";
const PROVIDER: &str = "GNews";
const MAX_ARTICLES: u32 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    #[default]
    Agriculture,
    Farming,
    Organic,
    Sustainable,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 4] = [
        Self::Agriculture,
        Self::Farming,
        Self::Organic,
        Self::Sustainable,
    ];

    /// Search keywords sent to the news endpoint.
    pub fn query(self) -> &'static str {
        match self {
            Self::Agriculture => "agriculture",
            Self::Farming => "farming",
            Self::Organic => "organic farming",
            Self::Sustainable => "sustainable agriculture",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Agriculture => "Agriculture",
            Self::Farming => "Farming",
            Self::Organic => "Organic",
            Self::Sustainable => "Sustainable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: ArticleSource,
}

impl Article {
    /// Publication date as shown on the card, e.g. "March 5, 2024".
    pub fn published_label(&self) -> String {
        self.published_at.format("%B %-d, %Y").to_string()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    api_key: String,
}

impl NewsClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agrihub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self { http, api_key })
    }

    pub fn search_url(&self, category: NewsCategory) -> Result<Url, ServiceError> {
        let max = MAX_ARTICLES.to_string();
        Url::parse_with_params(
            GNEWS_SEARCH_URL,
            &[
                ("q", category.query()),
                ("lang", "en"),
                ("country", "us"),
                ("max", max.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ServiceError::Transport(e.to_string()))
    }

    pub async fn search(&self, category: NewsCategory) -> Result<Vec<Article>, ServiceError> {
        let url = self.search_url(category)?;
        debug!(category = category.query(), "news search");

        let res = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        let status = res.status();
        if !status.is_success() {
            return Err(ServiceError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body = res.text().await.map_err(map_reqwest_error)?;
        parse_articles(&body)
    }
}

fn parse_articles(body: &str) -> Result<Vec<Article>, ServiceError> {
    serde_json::from_str::<SearchResponse>(body)
        .ok()
        .and_then(|res| res.articles)
        .ok_or(ServiceError::InvalidNewsData)
}
