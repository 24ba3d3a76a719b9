use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use agrihub_types::models::{EquipmentListing, RentalRequest};
use agrihub_types::{Actor, Envelope};

use crate::actions;
use crate::boards::EquipmentMarket;
use crate::error::{ApiError, ApiResult, fetched, found, ok};
use crate::filters::EquipmentFilter;
use crate::forms::{EquipmentListingForm, RentalForm};
use crate::state::AppState;

pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<EquipmentFilter>,
) -> ApiResult<Vec<EquipmentListing>> {
    let mut market = EquipmentMarket::new(state.db.clone());
    market.load().await;
    market.listings().status().map_err(ApiError::Upstream)?;
    ok(market.visible(&filter).into_iter().cloned().collect())
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<EquipmentListingForm>,
) -> Result<(StatusCode, Json<Envelope<EquipmentListing>>), ApiError> {
    let listing = actions::list_equipment(&state.db, &actor, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(listing))))
}

pub async fn rent(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<RentalForm>,
) -> Result<(StatusCode, Json<Envelope<RentalRequest>>), ApiError> {
    let listing = found(state.db.find_equipment(listing_id).await, "Equipment listing not found")?;
    let request = actions::rent(&state.db, &actor, &listing, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(request))))
}

pub async fn list_rentals(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> ApiResult<Vec<RentalRequest>> {
    fetched(state.db.list_requests_for_equipment(listing_id).await)
}

pub async fn my_listings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<EquipmentListing>> {
    fetched(state.db.list_user_equipment(&actor).await)
}

pub async fn my_rentals(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<RentalRequest>> {
    fetched(state.db.list_user_rental_requests(&actor).await)
}
