//! The portal's view layer: per-feature boards that fetch, filter, validate
//! and refresh, and the axum JSON surface built on them.

pub mod actions;
pub mod analysis;
pub mod boards;
pub mod equipment;
pub mod error;
pub mod filters;
pub mod forms;
pub mod forum;
pub mod health;
pub mod land;
pub mod middleware;
pub mod news;
pub mod routes;
pub mod state;
pub mod support;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
