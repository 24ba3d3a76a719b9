//! Rows as stored in the hosted backend. Field names match the table columns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::money::format_inr;

fn default_true() -> bool {
    true
}

/// Nullable text/array columns come back as `null`; treat that as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// -- Catalogues --

pub const STATES: &[&str] = &[
    "Andhra Pradesh",
    "Telangana",
    "Karnataka",
    "Tamil Nadu",
    "Kerala",
    "Maharashtra",
    "Gujarat",
    "Punjab",
    "Haryana",
];

pub const SOIL_TYPES: &[&str] = &[
    "Black Soil",
    "Red Soil",
    "Alluvial Soil",
    "Loamy Soil",
    "Sandy Soil",
    "Clay Soil",
    "Laterite Soil",
];

pub const EQUIPMENT_TYPES: &[&str] = &[
    "Tractor",
    "Harvester",
    "Tillage Equipment",
    "Spraying Equipment",
    "Seeding Equipment",
    "Irrigation Equipment",
    "Thresher",
    "Cultivator",
];

pub const EQUIPMENT_CONDITIONS: &[&str] = &["Excellent", "Good", "Fair"];

// -- Forum --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForumCategory {
    #[default]
    General,
    Crops,
    Irrigation,
    Pests,
    Soil,
    Equipment,
    Market,
    Weather,
}

impl ForumCategory {
    pub const ALL: [ForumCategory; 8] = [
        Self::General,
        Self::Crops,
        Self::Irrigation,
        Self::Pests,
        Self::Soil,
        Self::Equipment,
        Self::Market,
        Self::Weather,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Crops => "crops",
            Self::Irrigation => "irrigation",
            Self::Pests => "pests",
            Self::Soil => "soil",
            Self::Equipment => "equipment",
            Self::Market => "market",
            Self::Weather => "weather",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General Discussion",
            Self::Crops => "Crops & Planting",
            Self::Irrigation => "Irrigation & Water",
            Self::Pests => "Pest Control",
            Self::Soil => "Soil Management",
            Self::Equipment => "Equipment & Tools",
            Self::Market => "Market & Pricing",
            Self::Weather => "Weather & Climate",
        }
    }
}

impl fmt::Display for ForumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown forum category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ForumCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: ForumCategory,
    /// Maintained by the backend; absent on freshly inserted rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forum_replies: Vec<ForumReply>,
}

impl ForumPost {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.clerk_user_id == user_id
    }

    pub fn replies_label(&self) -> String {
        let count = self.reply_count.unwrap_or(self.forum_replies.len() as i64);
        if count == 1 {
            "1 reply".to_string()
        } else {
            format!("{count} replies")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumReply {
    pub id: i64,
    pub forum_id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    pub content: String,
    #[serde(default)]
    pub is_solution: bool,
    pub created_at: DateTime<Utc>,
}

// -- Farmer support --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerCase {
    pub id: i64,
    pub clerk_user_id: String,
    pub name: String,
    pub age: Option<i32>,
    pub location: String,
    pub family_size: Option<i32>,
    pub land_size: Option<f64>,
    pub amount_needed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount_raised: f64,
    pub story: String,
    pub deadline: Option<NaiveDate>,
    pub verified_by: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub donations: Vec<Donation>,
}

impl FarmerCase {
    /// Share of the goal raised so far, in percent. Not clamped.
    pub fn progress_percent(&self) -> f64 {
        if self.amount_needed > 0.0 {
            self.amount_raised / self.amount_needed * 100.0
        } else {
            0.0
        }
    }

    /// Progress bar width, clamped to 100.
    pub fn progress_bar_width(&self) -> f64 {
        self.progress_percent().min(100.0)
    }

    /// Whole days until the deadline (rounded up, never negative).
    /// `None` when the case has no deadline.
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        let deadline = self.deadline?.and_hms_opt(0, 0, 0)?.and_utc();
        let secs = (deadline - now).num_seconds();
        let days = secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) != 0);
        Some(days.max(0))
    }

    pub fn supporter_count(&self) -> usize {
        self.donations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub case_id: i64,
    pub donor_name: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

// -- Land lease --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandListing {
    pub id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    pub title: String,
    pub location: String,
    pub state: String,
    pub area: f64,
    pub price_per_acre: i64,
    pub soil_type: String,
    /// Years.
    pub lease_duration: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// How far a proposed price sits from the asking price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDeviation {
    AtAsking,
    Below(f64),
    Above(f64),
}

impl fmt::Display for PriceDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtAsking => f.write_str("at asking price"),
            Self::Below(pct) => write!(f, "{pct:.1}% below asking price"),
            Self::Above(pct) => write!(f, "{pct:.1}% above asking price"),
        }
    }
}

impl LandListing {
    /// Slider bounds for negotiation: 15% either side of the asking price.
    pub fn negotiation_range(&self) -> (i64, i64) {
        let price = self.price_per_acre as f64;
        ((price * 0.85).floor() as i64, (price * 1.15).ceil() as i64)
    }

    pub fn clamp_offer(&self, offer: i64) -> i64 {
        let (min, max) = self.negotiation_range();
        offer.max(min).min(max)
    }

    pub fn deviation(&self, offer: i64) -> PriceDeviation {
        let asking = self.price_per_acre;
        if offer == asking || asking == 0 {
            return PriceDeviation::AtAsking;
        }
        let pct = (asking - offer).abs() as f64 / asking as f64 * 100.0;
        if offer < asking {
            PriceDeviation::Below(pct)
        } else {
            PriceDeviation::Above(pct)
        }
    }

    pub fn proposal_message(&self, offer: i64) -> String {
        if offer == self.price_per_acre {
            "Accepting the listed price".to_string()
        } else {
            format!("Proposing ₹{}/acre/year", format_inr(offer))
        }
    }
}

/// The listing columns embedded in a user's proposal list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandSummary {
    pub title: String,
    pub location: String,
    pub area: f64,
    pub price_per_acre: i64,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseProposal {
    pub id: i64,
    pub land_listing_id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_email: String,
    pub proposed_price: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "land_listings", default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<LandSummary>,
}

// -- Equipment lease --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentListing {
    pub id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub state: String,
    pub power_spec: String,
    pub condition: String,
    pub year: i32,
    pub price_per_day: i64,
    pub min_days: i32,
    pub max_days: i32,
    pub availability: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Price for a rental of `days` days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuote {
    pub days: i32,
    pub total_price: i64,
}

impl EquipmentListing {
    pub fn clamp_days(&self, days: i32) -> i32 {
        days.max(self.min_days).min(self.max_days)
    }

    /// Quote for the requested duration after clamping it into the
    /// listing's allowed range. `None` when the total does not fit in an i64.
    pub fn quote(&self, days: i32) -> Option<RentalQuote> {
        let days = self.clamp_days(days);
        let total_price = i64::from(days).checked_mul(self.price_per_day)?;
        Some(RentalQuote { days, total_price })
    }

    pub fn rental_message(quote: RentalQuote) -> String {
        format!(
            "Rental request for {} days. Total: ₹{}",
            quote.days,
            format_inr(quote.total_price)
        )
    }
}

/// The listing columns embedded in a user's rental request list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub price_per_day: i64,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRequest {
    pub id: i64,
    pub equipment_listing_id: i64,
    pub clerk_user_id: String,
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_email: String,
    pub rental_days: i32,
    pub total_price: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "equipment_listings", default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<EquipmentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn land(price_per_acre: i64) -> LandListing {
        serde_json::from_value(json!({
            "id": 1,
            "clerk_user_id": "user_owner",
            "user_name": "Ramesh Kumar",
            "title": "Fertile Paddy Field",
            "location": "Guntur",
            "state": "Andhra Pradesh",
            "area": 5.5,
            "price_per_acre": price_per_acre,
            "soil_type": "Black Soil",
            "lease_duration": 3,
            "owner_name": "Ramesh Kumar",
            "phone": "+91 9876543210",
            "email": "ramesh.k@email.com",
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap()
    }

    fn tractor(price_per_day: i64, min_days: i32, max_days: i32) -> EquipmentListing {
        serde_json::from_value(json!({
            "id": 7,
            "clerk_user_id": "user_owner",
            "user_name": "Suresh",
            "name": "John Deere 5045D",
            "type": "Tractor",
            "location": "Warangal",
            "state": "Telangana",
            "power_spec": "45 HP",
            "condition": "Good",
            "year": 2019,
            "price_per_day": price_per_day,
            "min_days": min_days,
            "max_days": max_days,
            "features": ["4WD", "PTO"],
            "owner_name": "Suresh",
            "phone": "+91 9876543211",
            "email": "suresh@email.com",
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap()
    }

    fn case(needed: f64, raised: f64, deadline: Option<&str>) -> FarmerCase {
        serde_json::from_value(json!({
            "id": 42,
            "clerk_user_id": "user_a",
            "name": "Lakshmi",
            "location": "Medak, Telangana",
            "amount_needed": needed,
            "amount_raised": raised,
            "story": "Crop loss after unseasonal rain",
            "deadline": deadline,
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap()
    }

    #[test]
    fn negotiated_discount_is_reported_to_one_decimal() {
        let listing = land(45_000);
        let deviation = listing.deviation(40_000);
        assert_eq!(deviation.to_string(), "11.1% below asking price");
        assert_eq!(listing.deviation(45_000), PriceDeviation::AtAsking);
        assert_eq!(listing.deviation(49_500).to_string(), "10.0% above asking price");
    }

    #[test]
    fn negotiation_range_is_fifteen_percent_each_way() {
        let listing = land(45_000);
        assert_eq!(listing.negotiation_range(), (38_250, 51_750));
        assert_eq!(listing.clamp_offer(10_000), 38_250);
        assert_eq!(listing.clamp_offer(40_000), 40_000);
    }

    #[test]
    fn proposal_message_depends_on_offer() {
        let listing = land(45_000);
        assert_eq!(listing.proposal_message(45_000), "Accepting the listed price");
        assert_eq!(listing.proposal_message(40_000), "Proposing ₹40,000/acre/year");
    }

    #[test]
    fn rental_total_is_days_times_rate() {
        let listing = tractor(800, 1, 30);
        let quote = listing.quote(5).unwrap();
        assert_eq!(quote, RentalQuote { days: 5, total_price: 4000 });
        assert_eq!(
            EquipmentListing::rental_message(quote),
            "Rental request for 5 days. Total: ₹4,000"
        );
    }

    #[test]
    fn rental_days_are_clamped() {
        let listing = tractor(800, 2, 10);
        assert_eq!(listing.quote(0).unwrap().days, 2);
        assert_eq!(listing.quote(45), Some(RentalQuote { days: 10, total_price: 8000 }));
    }

    #[test]
    fn oversized_rate_has_no_quote() {
        let listing = tractor(i64::MAX, 1, 30);
        assert_eq!(listing.quote(2), None);
        assert_eq!(listing.quote(1).unwrap().total_price, i64::MAX);
    }

    #[test]
    fn negative_asking_price_does_not_panic_the_clamp() {
        let listing = land(-1_000);
        let (min, max) = listing.negotiation_range();
        assert!(min > max);
        assert_eq!(listing.clamp_offer(5_000), max);
    }

    #[test]
    fn progress_is_clamped_only_for_the_bar() {
        let over = case(10_000.0, 15_000.0, None);
        assert_eq!(over.progress_percent(), 150.0);
        assert_eq!(over.progress_bar_width(), 100.0);
        assert_eq!(case(0.0, 500.0, None).progress_percent(), 0.0);
    }

    #[test]
    fn days_left_rounds_up_and_floors_at_zero() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(case(1.0, 0.0, Some("2024-06-03")).days_left(now), Some(2));
        assert_eq!(case(1.0, 0.0, Some("2024-05-20")).days_left(now), Some(0));
        assert_eq!(case(1.0, 0.0, None).days_left(now), None);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in ForumCategory::ALL {
            assert_eq!(category.as_str().parse::<ForumCategory>(), Ok(category));
        }
        assert!("gossip".parse::<ForumCategory>().is_err());
    }

    #[test]
    fn equipment_type_column_is_named_type() {
        let listing = tractor(800, 1, 30);
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["type"], "Tractor");
        assert!(value.get("kind").is_none());
    }
}
