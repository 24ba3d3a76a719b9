//! Insert payloads: the entity minus server-generated columns and minus the
//! owner columns, which the data-access layer stamps from the acting user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EquipmentListing, ForumCategory, LandListing, RequestStatus};

// -- Forum --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewForumPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: ForumCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewForumReply {
    pub forum_id: i64,
    pub content: String,
}

/// Partial update of a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForumPostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ForumCategory>,
}

impl ForumPostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none()
    }
}

// -- Farmer support --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFarmerCase {
    pub name: String,
    pub age: Option<i32>,
    pub location: String,
    pub family_size: Option<i32>,
    pub land_size: Option<f64>,
    pub amount_needed: f64,
    pub story: String,
    pub deadline: Option<NaiveDate>,
    pub verified_by: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDonation {
    pub case_id: i64,
    pub donor_name: String,
    pub amount: f64,
    pub message: String,
    pub is_anonymous: bool,
}

impl NewDonation {
    /// Anonymous donations never carry the entered name.
    pub fn new(
        case_id: i64,
        donor_name: &str,
        amount: f64,
        message: &str,
        is_anonymous: bool,
    ) -> Self {
        let donor_name = if is_anonymous {
            "Anonymous".to_string()
        } else {
            donor_name.trim().to_string()
        };
        Self {
            case_id,
            donor_name,
            amount,
            message: message.trim().to_string(),
            is_anonymous,
        }
    }
}

// -- Land lease --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLandListing {
    pub title: String,
    pub location: String,
    pub state: String,
    pub area: f64,
    pub price_per_acre: i64,
    pub soil_type: String,
    pub lease_duration: i32,
    pub features: Vec<String>,
    pub description: String,
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLeaseProposal {
    pub land_listing_id: i64,
    pub proposed_price: i64,
    pub message: String,
    pub status: RequestStatus,
}

impl NewLeaseProposal {
    /// Proposal for `offer`, clamped into the listing's negotiation range.
    pub fn for_listing(listing: &LandListing, offer: i64) -> Self {
        let offer = listing.clamp_offer(offer);
        Self {
            land_listing_id: listing.id,
            proposed_price: offer,
            message: listing.proposal_message(offer),
            status: RequestStatus::Pending,
        }
    }
}

// -- Equipment lease --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipmentListing {
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
    pub features: Vec<String>,
    pub description: String,
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRentalRequest {
    pub equipment_listing_id: i64,
    pub rental_days: i32,
    pub total_price: i64,
    pub message: String,
    pub status: RequestStatus,
}

impl NewRentalRequest {
    /// `None` when the quote overflows.
    pub fn for_listing(listing: &EquipmentListing, days: i32) -> Option<Self> {
        let quote = listing.quote(days)?;
        Some(Self {
            equipment_listing_id: listing.id,
            rental_days: quote.days,
            total_price: quote.total_price,
            message: EquipmentListing::rental_message(quote),
            status: RequestStatus::Pending,
        })
    }
}
