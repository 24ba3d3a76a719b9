use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use agrihub_types::models::{LandListing, LeaseProposal};
use agrihub_types::{Actor, Envelope};

use crate::actions;
use crate::boards::LandMarket;
use crate::error::{ApiError, ApiResult, fetched, found, ok};
use crate::filters::LandFilter;
use crate::forms::{LandListingForm, ProposalForm};
use crate::state::AppState;

pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<LandFilter>,
) -> ApiResult<Vec<LandListing>> {
    let mut market = LandMarket::new(state.db.clone());
    market.load().await;
    market.listings().status().map_err(ApiError::Upstream)?;
    ok(market.visible(&filter).into_iter().cloned().collect())
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<LandListingForm>,
) -> Result<(StatusCode, Json<Envelope<LandListing>>), ApiError> {
    let listing = actions::list_land(&state.db, &actor, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(listing))))
}

pub async fn propose(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<ProposalForm>,
) -> Result<(StatusCode, Json<Envelope<LeaseProposal>>), ApiError> {
    let listing = found(state.db.find_land_listing(listing_id).await, "Land listing not found")?;
    let proposal = actions::propose(&state.db, &actor, &listing, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(proposal))))
}

pub async fn list_proposals(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> ApiResult<Vec<LeaseProposal>> {
    fetched(state.db.list_proposals_for_listing(listing_id).await)
}

pub async fn my_listings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<LandListing>> {
    fetched(state.db.list_user_land_listings(&actor).await)
}

pub async fn my_proposals(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<LeaseProposal>> {
    fetched(state.db.list_user_lease_proposals(&actor).await)
}
