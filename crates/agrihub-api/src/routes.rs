use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::middleware::require_actor;
use crate::state::AppState;
use crate::{analysis, equipment, forum, health, land, news, support};

/// Every route the portal serves. Owner-scoped routes sit behind
/// [`require_actor`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/forum/posts", get(forum::list_posts))
        .route("/forum/posts/{post_id}", get(forum::get_post))
        .route("/support/cases", get(support::list_cases))
        .route(
            "/support/cases/{case_id}/donations",
            get(support::list_donations).post(support::donate),
        )
        .route("/land/listings", get(land::list_listings))
        .route("/land/listings/{listing_id}/proposals", get(land::list_proposals))
        .route("/equipment/listings", get(equipment::list_listings))
        .route("/equipment/listings/{listing_id}/rentals", get(equipment::list_rentals))
        .route("/analysis/models", get(analysis::models))
        .route("/analysis/plant", post(analysis::plant))
        .route("/analysis/pest", post(analysis::pest))
        .route("/analysis/soil", post(analysis::soil))
        .route("/analysis/price", post(analysis::price))
        .route("/news", get(news::latest))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/forum/posts", post(forum::create_post))
        .route(
            "/forum/posts/{post_id}",
            patch(forum::update_post).delete(forum::delete_post),
        )
        .route("/forum/posts/{post_id}/replies", post(forum::add_reply))
        .route("/forum/replies/{reply_id}", delete(forum::delete_reply))
        .route("/support/cases", post(support::create_case))
        .route("/land/listings", post(land::create_listing))
        .route("/land/listings/{listing_id}/proposals", post(land::propose))
        .route("/land/mine", get(land::my_listings))
        .route("/land/proposals/mine", get(land::my_proposals))
        .route("/equipment/listings", post(equipment::create_listing))
        .route("/equipment/listings/{listing_id}/rentals", post(equipment::rent))
        .route("/equipment/mine", get(equipment::my_listings))
        .route("/equipment/rentals/mine", get(equipment::my_rentals))
        .layer(middleware::from_fn(require_actor))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
