use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use agrihub_types::models::{Donation, FarmerCase};
use agrihub_types::{Actor, Envelope};

use crate::actions;
use crate::boards::SupportBoard;
use crate::error::{ApiError, ApiResult, fetched, ok};
use crate::filters::CaseFilter;
use crate::forms::{CaseForm, DonationForm};
use crate::state::AppState;

pub async fn list_cases(
    State(state): State<AppState>,
    Query(filter): Query<CaseFilter>,
) -> ApiResult<Vec<FarmerCase>> {
    let mut board = SupportBoard::new(state.db.clone());
    board.load().await;
    board.cases().status().map_err(ApiError::Upstream)?;
    ok(board.visible(&filter).into_iter().cloned().collect())
}

pub async fn create_case(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<CaseForm>,
) -> Result<(StatusCode, Json<Envelope<FarmerCase>>), ApiError> {
    let case = actions::create_case(&state.db, &actor, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(case))))
}

/// Donations need no sign-in.
pub async fn donate(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(form): Json<DonationForm>,
) -> Result<(StatusCode, Json<Envelope<Donation>>), ApiError> {
    let donation = actions::donate(&state.db, case_id, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(donation))))
}

pub async fn list_donations(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> ApiResult<Vec<Donation>> {
    fetched(state.db.list_donations(case_id).await)
}
