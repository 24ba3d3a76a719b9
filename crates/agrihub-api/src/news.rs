use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::error;

use agrihub_services::{Article, NewsCategory, ServiceError};

use crate::error::{ApiError, ApiResult, ok};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub category: NewsCategory,
}

pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Vec<Article>> {
    let client = state
        .news
        .as_ref()
        .ok_or_else(|| ApiError::service("", ServiceError::MissingApiKey("GNEWS_API_KEY")))?;

    match client.search(query.category).await {
        Ok(articles) => ok(articles),
        Err(ServiceError::InvalidNewsData) => Err(ApiError::Upstream(
            ServiceError::InvalidNewsData.to_string(),
        )),
        Err(e) => {
            error!("Error fetching news: {e}");
            Err(ApiError::Upstream(
                "Failed to load news. Please try again later.".to_string(),
            ))
        }
    }
}
