mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use agrihub_api::{AppState, AppStateInner};
use agrihub_db::Database;
use agrihub_services::{AnalysisService, NewsClient};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrihub=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.supabase_url, &config.supabase_key)?;
    if let Some(e) = db.check_connection().await.error() {
        warn!("Database not reachable at startup: {e}");
    }

    let analysis = AnalysisService::new(config.gemini_key.clone(), config.openrouter_key.clone())?;
    if !analysis.has_gemini() {
        warn!("GEMINI_API_KEY not set; Gemini analysis disabled");
    }
    if !analysis.has_openrouter() {
        warn!("OPENROUTER_API_KEY not set; OpenRouter analysis and price prediction disabled");
    }
    let news = config.gnews_key.clone().map(NewsClient::new).transpose()?;
    if news.is_none() {
        warn!("GNEWS_API_KEY not set; news disabled");
    }

    let state: AppState = Arc::new(AppStateInner { db, analysis, news });

    let app = agrihub_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("AgriHub server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AgriHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
