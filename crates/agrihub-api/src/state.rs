use std::sync::Arc;

use agrihub_db::Database;
use agrihub_services::{AnalysisService, NewsClient};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub analysis: AnalysisService,
    /// `None` when no news API key is configured.
    pub news: Option<NewsClient>,
}
