//! Per-feature boards: the last fetched rows plus an error banner, with
//! validated submits that re-fetch the whole list on success.

use tracing::warn;

use agrihub_db::Database;
use agrihub_types::models::{
    Donation, EquipmentListing, FarmerCase, ForumPost, ForumReply, LandListing, LeaseProposal,
    RentalRequest,
};
use agrihub_types::{Actor, Envelope};

use crate::actions::{self, POST_GONE, SubmitError};
use crate::filters::{CaseFilter, EquipmentFilter, ForumFilter, LandFilter, RowFilter};
use crate::forms::{
    CaseForm, DonationForm, EquipmentListingForm, LandListingForm, PostEditForm, PostForm,
    ProposalForm, RentalForm, ReplyForm,
};

/// Rows from the most recent fetch. A failed fetch keeps the previous rows
/// and raises the banner until the next successful one.
#[derive(Debug, Clone)]
pub struct Board<T> {
    rows: Vec<T>,
    banner: Option<String>,
}

impl<T> Default for Board<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            banner: None,
        }
    }
}

impl<T> Board<T> {
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn visible<F: RowFilter<T>>(&self, filter: &F) -> Vec<&T> {
        filter.apply(&self.rows)
    }

    fn absorb(&mut self, fetched: Envelope<Vec<T>>) {
        match fetched {
            Envelope::Success(rows) => {
                self.rows = rows;
                self.banner = None;
            }
            Envelope::Failure(e) => {
                warn!("List refresh failed: {e}");
                self.banner = Some(e);
            }
        }
    }

    /// The fetch error, if the last load failed.
    pub fn status(&self) -> Result<(), String> {
        match &self.banner {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// The first loaded row matching `pick`, or the fetch error if the last load failed.
    fn find(&self, pick: impl Fn(&T) -> bool, missing: &str) -> Result<&T, SubmitError> {
        self.rows.iter().find(|r| pick(r)).ok_or_else(|| {
            SubmitError::Rejected(self.banner.as_deref().unwrap_or(missing).to_string())
        })
    }
}

// -- Forum --

pub struct ForumBoard {
    db: Database,
    posts: Board<ForumPost>,
}

impl ForumBoard {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            posts: Board::default(),
        }
    }

    pub fn posts(&self) -> &Board<ForumPost> {
        &self.posts
    }

    pub fn visible(&self, filter: &ForumFilter) -> Vec<&ForumPost> {
        self.posts.visible(filter)
    }

    pub async fn load(&mut self) {
        let fetched = self.db.list_posts().await;
        self.posts.absorb(fetched);
    }

    pub async fn submit_post(&mut self, actor: &Actor, form: PostForm) -> Result<ForumPost, SubmitError> {
        let created = actions::create_post(&self.db, actor, form).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn edit_post(
        &mut self,
        post_id: i64,
        form: PostEditForm,
        actor: &Actor,
    ) -> Result<ForumPost, SubmitError> {
        let updated = actions::edit_post(&self.db, post_id, form, actor).await?;
        self.load().await;
        Ok(updated)
    }

    /// Delete a loaded post. Only its author gets past the check.
    pub async fn delete_post(&mut self, post_id: i64, actor: &Actor) -> Result<(), SubmitError> {
        let post = self.posts.find(|p| p.id == post_id, POST_GONE)?;
        actions::delete_post(&self.db, post, actor).await?;
        self.load().await;
        Ok(())
    }

    pub async fn reply(
        &mut self,
        actor: &Actor,
        post_id: i64,
        form: ReplyForm,
    ) -> Result<ForumReply, SubmitError> {
        let created = actions::add_reply(&self.db, actor, post_id, form).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn delete_reply(&mut self, reply_id: i64, actor: &Actor) -> Result<(), SubmitError> {
        actions::delete_reply(&self.db, reply_id, actor).await?;
        self.load().await;
        Ok(())
    }
}

// -- Farmer support --

pub struct SupportBoard {
    db: Database,
    cases: Board<FarmerCase>,
}

impl SupportBoard {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cases: Board::default(),
        }
    }

    pub fn cases(&self) -> &Board<FarmerCase> {
        &self.cases
    }

    pub fn visible(&self, filter: &CaseFilter) -> Vec<&FarmerCase> {
        self.cases.visible(filter)
    }

    pub async fn load(&mut self) {
        let fetched = self.db.list_cases().await;
        self.cases.absorb(fetched);
    }

    pub async fn submit_case(&mut self, actor: &Actor, form: CaseForm) -> Result<FarmerCase, SubmitError> {
        let created = actions::create_case(&self.db, actor, form).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn donate(&mut self, case_id: i64, form: DonationForm) -> Result<Donation, SubmitError> {
        let created = actions::donate(&self.db, case_id, form).await?;
        self.load().await;
        Ok(created)
    }
}

// -- Land lease --

pub struct LandMarket {
    db: Database,
    listings: Board<LandListing>,
}

impl LandMarket {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            listings: Board::default(),
        }
    }

    pub fn listings(&self) -> &Board<LandListing> {
        &self.listings
    }

    pub fn visible(&self, filter: &LandFilter) -> Vec<&LandListing> {
        self.listings.visible(filter)
    }

    pub async fn load(&mut self) {
        let fetched = self.db.list_land_listings().await;
        self.listings.absorb(fetched);
    }

    pub async fn list_land(
        &mut self,
        actor: &Actor,
        form: LandListingForm,
    ) -> Result<LandListing, SubmitError> {
        let created = actions::list_land(&self.db, actor, form).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn propose(
        &mut self,
        actor: &Actor,
        listing_id: i64,
        form: ProposalForm,
    ) -> Result<LeaseProposal, SubmitError> {
        let listing = self
            .listings
            .find(|l| l.id == listing_id, "Land listing not found")?;
        let created = actions::propose(&self.db, actor, listing, form).await?;
        self.load().await;
        Ok(created)
    }
}

// -- Equipment lease --

pub struct EquipmentMarket {
    db: Database,
    listings: Board<EquipmentListing>,
}

impl EquipmentMarket {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            listings: Board::default(),
        }
    }

    pub fn listings(&self) -> &Board<EquipmentListing> {
        &self.listings
    }

    pub fn visible(&self, filter: &EquipmentFilter) -> Vec<&EquipmentListing> {
        self.listings.visible(filter)
    }

    pub async fn load(&mut self) {
        let fetched = self.db.list_equipment().await;
        self.listings.absorb(fetched);
    }

    pub async fn list_equipment(
        &mut self,
        actor: &Actor,
        form: EquipmentListingForm,
    ) -> Result<EquipmentListing, SubmitError> {
        let created = actions::list_equipment(&self.db, actor, form).await?;
        self.load().await;
        Ok(created)
    }

    pub async fn rent(
        &mut self,
        actor: &Actor,
        listing_id: i64,
        form: RentalForm,
    ) -> Result<RentalRequest, SubmitError> {
        let listing = self
            .listings
            .find(|l| l.id == listing_id, "Equipment listing not found")?;
        let created = actions::rent(&self.db, actor, listing, form).await?;
        self.load().await;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrihub_db::MemoryStore;
    use agrihub_db::memory::Op;
    use agrihub_db::schema;
    use agrihub_types::api::NewEquipmentListing;
    use std::sync::Arc;

    fn actor() -> Actor {
        Actor::new("user_7")
            .with_name("Meena Patel")
            .with_email("meena@example.com")
    }

    fn setup() -> (Arc<MemoryStore>, Database) {
        let store = Arc::new(MemoryStore::new());
        let db = Database::from_arc(store.clone());
        (store, db)
    }

    fn post_form(title: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            content: "Leaves curling after rain".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn submit_refreshes_the_list() {
        let (_store, db) = setup();
        let mut board = ForumBoard::new(db);
        board.load().await;
        assert!(board.posts().rows().is_empty());

        board.submit_post(&actor(), post_form("Tomato leaf curl")).await.unwrap();
        assert_eq!(board.posts().rows().len(), 1);
        assert_eq!(board.posts().rows()[0].user_name, "Meena Patel");
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let (store, db) = setup();
        let mut board = ForumBoard::new(db);

        let err = board.submit_post(&actor(), post_form("  ")).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ref v) if v.field == "title"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_load_raises_banner_and_keeps_rows() {
        let (store, db) = setup();
        let mut board = ForumBoard::new(db);
        board.submit_post(&actor(), post_form("First")).await.unwrap();

        store.fail(Op::Select, schema::FORUMS, "connection reset");
        board.load().await;
        assert_eq!(board.posts().banner(), Some("connection reset"));
        assert_eq!(board.posts().rows().len(), 1);
        assert!(board.posts().status().is_err());

        store.clear_faults();
        board.load().await;
        assert_eq!(board.posts().banner(), None);
    }

    #[tokio::test]
    async fn proposal_uses_loaded_listing() {
        let (_store, db) = setup();
        let mut market = LandMarket::new(db);
        let form: LandListingForm = serde_json::from_value(serde_json::json!({
            "title": "Paddy field", "location": "Guntur", "state": "Andhra Pradesh",
            "area": 5.5, "price_per_acre": 45000, "soil_type": "Black Soil",
            "lease_duration": 3, "owner_name": "Ramesh", "phone": "1", "email": "r@example.com"
        }))
        .unwrap();
        let listing = market.list_land(&actor(), form).await.unwrap();

        let proposal = market
            .propose(&actor(), listing.id, ProposalForm { proposed_price: Some(40000) })
            .await
            .unwrap();
        assert_eq!(proposal.proposed_price, 40000);
        assert_eq!(proposal.land_listing_id, listing.id);

        let err = market
            .propose(&actor(), listing.id + 1000, ProposalForm::default())
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Rejected("Land listing not found".to_string()));
    }

    #[tokio::test]
    async fn rental_defaults_to_minimum_days() {
        let (_store, db) = setup();
        let mut market = EquipmentMarket::new(db);
        let form: EquipmentListingForm = serde_json::from_value(serde_json::json!({
            "name": "Rotavator", "type": "Rotavator", "location": "Nashik",
            "state": "Maharashtra", "power_spec": "45 HP", "condition": "Good",
            "year": 2020, "price_per_day": 800, "min_days": 2, "max_days": 30,
            "owner_name": "Sunil", "phone": "1", "email": "s@example.com"
        }))
        .unwrap();
        let listing = market.list_equipment(&actor(), form).await.unwrap();

        let request = market
            .rent(&actor(), listing.id, RentalForm::default())
            .await
            .unwrap();
        assert_eq!(request.rental_days, 2);
        assert_eq!(request.total_price, 1600);

        let request = market
            .rent(&actor(), listing.id, RentalForm { rental_days: Some(5) })
            .await
            .unwrap();
        assert_eq!(request.total_price, 4000);
    }

    #[tokio::test]
    async fn anonymous_donation_reaches_the_case() {
        let (_store, db) = setup();
        let mut board = SupportBoard::new(db);
        let case = board
            .submit_case(
                &actor(),
                CaseForm {
                    name: "Lakshmi".to_string(),
                    location: "Medak".to_string(),
                    story: "Hailstorm destroyed the crop".to_string(),
                    amount_needed: Some(50_000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let donation = board
            .donate(
                case.id,
                DonationForm {
                    donor_name: "Asha".to_string(),
                    amount: Some(5000.0),
                    is_anonymous: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(donation.donor_name, "Anonymous");
        assert_eq!(board.cases().rows().len(), 1);
    }

    #[tokio::test]
    async fn stranger_cannot_delete_and_replies_survive() {
        let (store, db) = setup();
        let mut board = ForumBoard::new(db);
        let post = board.submit_post(&actor(), post_form("Seed drill advice")).await.unwrap();
        board
            .reply(&Actor::new("user_9"), post.id, ReplyForm { content: "Try the 9-row".to_string() })
            .await
            .unwrap();
        let deletes_before = store.calls().iter().filter(|c| c.op == Op::Delete).count();

        let err = board.delete_post(post.id, &Actor::new("user_9")).await.unwrap_err();
        assert_eq!(err, SubmitError::Rejected(POST_GONE.to_string()));
        assert_eq!(store.row_count(schema::FORUM_REPLIES), 1);
        assert_eq!(store.row_count(schema::FORUMS), 1);
        let deletes_after = store.calls().iter().filter(|c| c.op == Op::Delete).count();
        assert_eq!(deletes_before, deletes_after);

        board.delete_post(post.id, &actor()).await.unwrap();
        assert_eq!(store.row_count(schema::FORUM_REPLIES), 0);
        assert!(board.posts().rows().is_empty());
    }

    #[tokio::test]
    async fn overflowing_rental_is_refused_before_the_store() {
        let (store, db) = setup();
        let listing = NewEquipmentListing {
            name: "Harvester".to_string(),
            kind: "Harvester".to_string(),
            location: "Karnal".to_string(),
            state: "Haryana".to_string(),
            power_spec: "100 HP".to_string(),
            condition: "Good".to_string(),
            year: 2021,
            price_per_day: i64::MAX,
            min_days: 1,
            max_days: 30,
            availability: None,
            features: Vec::new(),
            description: String::new(),
            owner_name: "Gurpreet".to_string(),
            phone: "1".to_string(),
            email: "g@example.com".to_string(),
            is_available: true,
        };
        db.create_equipment_listing(&actor(), &listing).await.into_result().unwrap();

        let mut market = EquipmentMarket::new(db);
        market.load().await;
        let id = market.listings().rows()[0].id;

        let err = market
            .rent(&actor(), id, RentalForm { rental_days: Some(2) })
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ref v) if v.field == "rental_days"));
        assert_eq!(store.row_count(schema::RENTAL_REQUESTS), 0);
    }
}
