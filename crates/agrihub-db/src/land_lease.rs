use agrihub_types::api::{NewLandListing, NewLeaseProposal};
use agrihub_types::models::{LandListing, LeaseProposal};
use agrihub_types::{Actor, Envelope};
use tracing::info;

use crate::error::DbError;
use crate::query::{Embed, Query};
use crate::schema::{LAND_LISTINGS, LAND_SUMMARY_COLUMNS, LEASE_PROPOSALS, OWNER_COLUMN};
use crate::{Database, Owned, finish};

impl Database {
    pub async fn list_land_listings(&self) -> Envelope<Vec<LandListing>> {
        let query = Query::table(LAND_LISTINGS).newest_first();
        finish("fetching land listings", self.fetch(&query).await)
    }

    pub async fn find_land_listing(&self, listing_id: i64) -> Envelope<Option<LandListing>> {
        let query = Query::table(LAND_LISTINGS).eq("id", listing_id);
        finish("fetching land listing", self.fetch_one(&query).await)
    }

    pub async fn create_land_listing(
        &self,
        actor: &Actor,
        listing: &NewLandListing,
    ) -> Envelope<LandListing> {
        self.set_user_context(actor).await;
        let body = Owned::named(actor, listing);
        let result: Result<LandListing, DbError> =
            self.insert_one(&Query::table(LAND_LISTINGS), &body).await;
        if let Ok(created) = &result {
            info!(listing = created.id, user = %actor.id, "Land listing created");
        }
        finish("creating land listing", result)
    }

    pub async fn create_lease_proposal(
        &self,
        actor: &Actor,
        proposal: &NewLeaseProposal,
    ) -> Envelope<LeaseProposal> {
        self.set_user_context(actor).await;
        let body = Owned::contact(actor, proposal);
        let result = self.insert_one(&Query::table(LEASE_PROPOSALS), &body).await;
        finish("creating lease proposal", result)
    }

    pub async fn list_proposals_for_listing(&self, listing_id: i64) -> Envelope<Vec<LeaseProposal>> {
        let query = Query::table(LEASE_PROPOSALS)
            .eq("land_listing_id", listing_id)
            .newest_first();
        finish("fetching lease proposals", self.fetch(&query).await)
    }

    pub async fn list_user_land_listings(&self, actor: &Actor) -> Envelope<Vec<LandListing>> {
        let query = Query::table(LAND_LISTINGS)
            .eq(OWNER_COLUMN, actor.id.as_str())
            .newest_first();
        finish("fetching user land listings", self.fetch(&query).await)
    }

    /// Proposals made by `actor`, each with a summary of the listing.
    pub async fn list_user_lease_proposals(&self, actor: &Actor) -> Envelope<Vec<LeaseProposal>> {
        let query = Query::table(LEASE_PROPOSALS)
            .embed(Embed::parent(LAND_LISTINGS, "land_listing_id", LAND_SUMMARY_COLUMNS))
            .eq(OWNER_COLUMN, actor.id.as_str())
            .newest_first();
        finish("fetching user lease proposals", self.fetch(&query).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agrihub_types::models::RequestStatus;

    use super::*;
    use crate::memory::MemoryStore;

    fn setup() -> Database {
        Database::from_arc(Arc::new(MemoryStore::new()))
    }

    fn owner() -> Actor {
        Actor::new("user_owner").with_name("Ramesh Kumar")
    }

    fn farmer() -> Actor {
        Actor::new("user_farmer")
            .with_name("Ravi Teja")
            .with_email("ravi@example.com")
    }

    fn paddy_field() -> NewLandListing {
        NewLandListing {
            title: "Fertile Paddy Field".to_string(),
            location: "Guntur".to_string(),
            state: "Andhra Pradesh".to_string(),
            area: 5.5,
            price_per_acre: 45_000,
            soil_type: "Black Soil".to_string(),
            lease_duration: 3,
            features: vec!["Borewell".to_string(), "Road access".to_string()],
            description: "Two crops a year".to_string(),
            owner_name: "Ramesh Kumar".to_string(),
            phone: "+91 9876543210".to_string(),
            email: "ramesh.k@email.com".to_string(),
            is_available: true,
        }
    }

    #[tokio::test]
    async fn listing_keeps_feature_order() {
        let db = setup();
        let created = db
            .create_land_listing(&owner(), &paddy_field())
            .await
            .into_result()
            .unwrap();

        assert_eq!(created.user_name, "Ramesh Kumar");
        assert_eq!(created.features, ["Borewell", "Road access"]);
    }

    #[tokio::test]
    async fn negotiated_proposal_is_stored_with_contact() {
        let db = setup();
        let listing = db
            .create_land_listing(&owner(), &paddy_field())
            .await
            .into_result()
            .unwrap();

        let new = NewLeaseProposal::for_listing(&listing, 40_000);
        let proposal = db
            .create_lease_proposal(&farmer(), &new)
            .await
            .into_result()
            .unwrap();

        assert_eq!(proposal.proposed_price, 40_000);
        assert_eq!(proposal.user_email, "ravi@example.com");
        assert_eq!(proposal.status, RequestStatus::Pending);
        assert_eq!(proposal.message, "Proposing ₹40,000/acre/year");
        assert_eq!(listing.deviation(proposal.proposed_price).to_string(), "11.1% below asking price");
    }

    #[tokio::test]
    async fn user_views_are_scoped_and_embed_listing() {
        let db = setup();
        let listing = db
            .create_land_listing(&owner(), &paddy_field())
            .await
            .into_result()
            .unwrap();
        db.create_lease_proposal(&farmer(), &NewLeaseProposal::for_listing(&listing, 45_000))
            .await
            .into_result()
            .unwrap();

        let mine = db.list_user_land_listings(&owner()).await.into_result().unwrap();
        assert_eq!(mine.len(), 1);
        assert!(db.list_user_land_listings(&farmer()).await.into_result().unwrap().is_empty());

        let proposals = db.list_user_lease_proposals(&farmer()).await.into_result().unwrap();
        let summary = proposals[0].listing.as_ref().unwrap();
        assert_eq!(summary.title, "Fertile Paddy Field");
        assert_eq!(summary.price_per_acre, 45_000);
        assert_eq!(proposals[0].message, "Accepting the listed price");

        let for_listing = db.list_proposals_for_listing(listing.id).await.into_result().unwrap();
        assert_eq!(for_listing.len(), 1);
        assert!(for_listing[0].listing.is_none());
    }
}
