use agrihub_types::api::{NewDonation, NewFarmerCase};
use agrihub_types::models::{Donation, FarmerCase};
use agrihub_types::{Actor, Envelope};
use tracing::info;

use crate::error::DbError;
use crate::query::{Embed, Query};
use crate::schema::{DONATION_COLUMNS, DONATIONS, FARMER_CASES};
use crate::{Database, Owned, finish};

impl Database {
    /// Every case, newest first, with its donations embedded.
    pub async fn list_cases(&self) -> Envelope<Vec<FarmerCase>> {
        let query = Query::table(FARMER_CASES)
            .embed(Embed::children(DONATIONS, "case_id", DONATION_COLUMNS))
            .newest_first();
        finish("fetching farmer cases", self.fetch(&query).await)
    }

    pub async fn create_case(&self, actor: &Actor, case: &NewFarmerCase) -> Envelope<FarmerCase> {
        self.set_user_context(actor).await;
        let body = Owned::id_only(actor, case);
        let result: Result<FarmerCase, DbError> =
            self.insert_one(&Query::table(FARMER_CASES), &body).await;
        if let Ok(created) = &result {
            info!(case = created.id, user = %actor.id, "Farmer case created");
        }
        finish("creating farmer case", result)
    }

    /// Donations are open to any visitor; no identity is attached.
    pub async fn add_donation(&self, donation: &NewDonation) -> Envelope<Donation> {
        let result: Result<Donation, DbError> =
            self.insert_one(&Query::table(DONATIONS), donation).await;
        if let Ok(created) = &result {
            info!(case = created.case_id, amount = created.amount, "Donation recorded");
        }
        finish("adding donation", result)
    }

    pub async fn list_donations(&self, case_id: i64) -> Envelope<Vec<Donation>> {
        let query = Query::table(DONATIONS).eq("case_id", case_id).newest_first();
        finish("fetching donations", self.fetch(&query).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::memory::{MemoryStore, Op};

    fn setup() -> (Arc<MemoryStore>, Database) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Database::from_arc(store))
    }

    fn lakshmi() -> NewFarmerCase {
        NewFarmerCase {
            name: "Lakshmi".to_string(),
            age: Some(45),
            location: "Medak, Telangana".to_string(),
            family_size: Some(5),
            land_size: Some(2.5),
            amount_needed: 50_000.0,
            story: "Crop loss after unseasonal rain".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 12, 31),
            verified_by: None,
            is_verified: false,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn create_case_stamps_owner_only() {
        let (_, db) = setup();
        let actor = Actor::new("user_a").with_name("Field Officer");

        let created = db.create_case(&actor, &lakshmi()).await.into_result().unwrap();

        assert_eq!(created.clerk_user_id, "user_a");
        assert_eq!(created.amount_raised, 0.0);
        assert!(created.is_active);
        assert!(!created.is_verified);
    }

    #[tokio::test]
    async fn donation_name_follows_anonymity() {
        let (store, db) = setup();

        let named = NewDonation::new(42, "Asha", 5000.0, "", false);
        let hidden = NewDonation::new(42, "Asha", 5000.0, "", true);

        let named = db.add_donation(&named).await.into_result().unwrap();
        let hidden = db.add_donation(&hidden).await.into_result().unwrap();

        assert_eq!(named.donor_name, "Asha");
        assert_eq!(named.case_id, 42);
        assert_eq!(named.amount, 5000.0);
        assert_eq!(hidden.donor_name, "Anonymous");
        assert!(store.calls().iter().all(|c| c.op != Op::Rpc));
    }

    #[tokio::test]
    async fn cases_embed_their_donations() {
        let (_, db) = setup();
        let actor = Actor::new("user_a");
        let case = db.create_case(&actor, &lakshmi()).await.into_result().unwrap();
        db.create_case(&actor, &lakshmi()).await.into_result().unwrap();
        for amount in [1000.0, 2500.0] {
            let d = NewDonation::new(case.id, "Asha", amount, "Stay strong", false);
            db.add_donation(&d).await.into_result().unwrap();
        }

        let cases = db.list_cases().await.into_result().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].supporter_count(), 0);
        assert_eq!(cases[1].id, case.id);
        assert_eq!(cases[1].supporter_count(), 2);

        let donations = db.list_donations(case.id).await.into_result().unwrap();
        let amounts: Vec<_> = donations.iter().map(|d| d.amount).collect();
        assert_eq!(amounts, [2500.0, 1000.0]);
    }

    #[tokio::test]
    async fn list_failure_is_enveloped() {
        let (store, db) = setup();
        store.fail(Op::Select, "farmer_cases", "JWT expired");

        assert_eq!(db.list_cases().await.error(), Some("JWT expired"));
    }
}
