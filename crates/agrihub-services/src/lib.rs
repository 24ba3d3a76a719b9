//! Third-party services behind the portal: two interchangeable generative
//! AI providers and a news search endpoint.

pub mod analysis;
pub mod error;
pub mod gemini;
pub mod news;
pub mod openrouter;
pub mod prompts;
pub mod reply;

pub use analysis::{AnalysisService, Provider};
pub use error::ServiceError;
pub use news::{Article, NewsCategory, NewsClient};
pub use prompts::{SoilSample, Timeframe};
pub use reply::{AiReply, PriceForecast, PricePrediction};
