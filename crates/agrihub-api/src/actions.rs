//! Validated mutations. Each one checks its form, then makes a single
//! data-layer call; refreshing any list afterwards is up to the caller.

use thiserror::Error;
use tracing::warn;

use agrihub_db::Database;
use agrihub_types::api::{NewLeaseProposal, NewRentalRequest};
use agrihub_types::models::{
    Donation, EquipmentListing, FarmerCase, ForumPost, ForumReply, LandListing, LeaseProposal,
    RentalRequest,
};
use agrihub_types::{Actor, Envelope};

use crate::forms::{
    CaseForm, DonationForm, EquipmentListingForm, LandListingForm, PostEditForm, PostForm,
    ProposalForm, RentalForm, ReplyForm, ValidationError,
};

pub const POST_GONE: &str = "Post not found or insufficient permissions";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Caught before any network call.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Refused by this layer or by the backend.
    #[error("{0}")]
    Rejected(String),
}

fn accepted<T>(envelope: Envelope<T>) -> Result<T, SubmitError> {
    envelope.into_result().map_err(SubmitError::Rejected)
}

// -- Forum --

pub async fn create_post(db: &Database, actor: &Actor, form: PostForm) -> Result<ForumPost, SubmitError> {
    let post = form.validate()?;
    accepted(db.create_post(actor, &post).await)
}

pub async fn edit_post(
    db: &Database,
    post_id: i64,
    form: PostEditForm,
    actor: &Actor,
) -> Result<ForumPost, SubmitError> {
    let patch = form.validate()?;
    accepted(db.update_post(post_id, &patch, actor).await)
}

/// Only the author may delete. The data layer removes replies before the
/// owner-filtered post delete, so strangers are stopped here first.
pub async fn delete_post(db: &Database, post: &ForumPost, actor: &Actor) -> Result<(), SubmitError> {
    if !post.is_owned_by(&actor.id) {
        warn!(post = post.id, user = %actor.id, "Delete refused for non-author");
        return Err(SubmitError::Rejected(POST_GONE.to_string()));
    }
    accepted(db.delete_post(post.id, actor).await)
}

pub async fn add_reply(
    db: &Database,
    actor: &Actor,
    post_id: i64,
    form: ReplyForm,
) -> Result<ForumReply, SubmitError> {
    let reply = form.validate(post_id)?;
    accepted(db.add_reply(actor, &reply).await)
}

pub async fn delete_reply(db: &Database, reply_id: i64, actor: &Actor) -> Result<(), SubmitError> {
    accepted(db.delete_reply(reply_id, actor).await)
}

// -- Farmer support --

pub async fn create_case(db: &Database, actor: &Actor, form: CaseForm) -> Result<FarmerCase, SubmitError> {
    let case = form.validate()?;
    accepted(db.create_case(actor, &case).await)
}

pub async fn donate(db: &Database, case_id: i64, form: DonationForm) -> Result<Donation, SubmitError> {
    let donation = form.validate(case_id)?;
    accepted(db.add_donation(&donation).await)
}

// -- Land lease --

pub async fn list_land(
    db: &Database,
    actor: &Actor,
    form: LandListingForm,
) -> Result<LandListing, SubmitError> {
    let listing = form.validate()?;
    accepted(db.create_land_listing(actor, &listing).await)
}

/// Offer on `listing`. Without an offer the asking price is proposed; any
/// offer is clamped into the negotiation range.
pub async fn propose(
    db: &Database,
    actor: &Actor,
    listing: &LandListing,
    form: ProposalForm,
) -> Result<LeaseProposal, SubmitError> {
    let offer = form.proposed_price.unwrap_or(listing.price_per_acre);
    let proposal = NewLeaseProposal::for_listing(listing, offer);
    accepted(db.create_lease_proposal(actor, &proposal).await)
}

// -- Equipment lease --

pub async fn list_equipment(
    db: &Database,
    actor: &Actor,
    form: EquipmentListingForm,
) -> Result<EquipmentListing, SubmitError> {
    let listing = form.validate()?;
    accepted(db.create_equipment_listing(actor, &listing).await)
}

/// Rent `listing` for `days`, clamped into its allowed range. Without a
/// duration the listing's minimum is used.
pub async fn rent(
    db: &Database,
    actor: &Actor,
    listing: &EquipmentListing,
    form: RentalForm,
) -> Result<RentalRequest, SubmitError> {
    let days = form.rental_days.unwrap_or(listing.min_days);
    let request = NewRentalRequest::for_listing(listing, days)
        .ok_or_else(|| ValidationError::new("rental_days", "total price is too large"))?;
    accepted(db.create_rental_request(actor, &request).await)
}
