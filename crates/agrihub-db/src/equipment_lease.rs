use agrihub_types::api::{NewEquipmentListing, NewRentalRequest};
use agrihub_types::models::{EquipmentListing, RentalRequest};
use agrihub_types::{Actor, Envelope};
use tracing::info;

use crate::error::DbError;
use crate::query::{Embed, Query};
use crate::schema::{EQUIPMENT_LISTINGS, EQUIPMENT_SUMMARY_COLUMNS, OWNER_COLUMN, RENTAL_REQUESTS};
use crate::{Database, Owned, finish};

impl Database {
    pub async fn list_equipment(&self) -> Envelope<Vec<EquipmentListing>> {
        let query = Query::table(EQUIPMENT_LISTINGS).newest_first();
        finish("fetching equipment listings", self.fetch(&query).await)
    }

    pub async fn find_equipment(&self, listing_id: i64) -> Envelope<Option<EquipmentListing>> {
        let query = Query::table(EQUIPMENT_LISTINGS).eq("id", listing_id);
        finish("fetching equipment listing", self.fetch_one(&query).await)
    }

    pub async fn create_equipment_listing(
        &self,
        actor: &Actor,
        listing: &NewEquipmentListing,
    ) -> Envelope<EquipmentListing> {
        self.set_user_context(actor).await;
        let body = Owned::named(actor, listing);
        let result: Result<EquipmentListing, DbError> =
            self.insert_one(&Query::table(EQUIPMENT_LISTINGS), &body).await;
        if let Ok(created) = &result {
            info!(listing = created.id, user = %actor.id, "Equipment listing created");
        }
        finish("creating equipment listing", result)
    }

    pub async fn create_rental_request(
        &self,
        actor: &Actor,
        request: &NewRentalRequest,
    ) -> Envelope<RentalRequest> {
        self.set_user_context(actor).await;
        let body = Owned::contact(actor, request);
        let result = self.insert_one(&Query::table(RENTAL_REQUESTS), &body).await;
        finish("creating rental request", result)
    }

    pub async fn list_requests_for_equipment(&self, listing_id: i64) -> Envelope<Vec<RentalRequest>> {
        let query = Query::table(RENTAL_REQUESTS)
            .eq("equipment_listing_id", listing_id)
            .newest_first();
        finish("fetching rental requests", self.fetch(&query).await)
    }

    pub async fn list_user_equipment(&self, actor: &Actor) -> Envelope<Vec<EquipmentListing>> {
        let query = Query::table(EQUIPMENT_LISTINGS)
            .eq(OWNER_COLUMN, actor.id.as_str())
            .newest_first();
        finish("fetching user equipment", self.fetch(&query).await)
    }

    /// Requests made by `actor`, each with a summary of the equipment.
    pub async fn list_user_rental_requests(&self, actor: &Actor) -> Envelope<Vec<RentalRequest>> {
        let query = Query::table(RENTAL_REQUESTS)
            .embed(Embed::parent(
                EQUIPMENT_LISTINGS,
                "equipment_listing_id",
                EQUIPMENT_SUMMARY_COLUMNS,
            ))
            .eq(OWNER_COLUMN, actor.id.as_str())
            .newest_first();
        finish("fetching user rental requests", self.fetch(&query).await)
    }
}
