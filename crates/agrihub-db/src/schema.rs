//! Table names and the column lists used for embedded relations.

pub const FORUMS: &str = "forums";
pub const FORUM_REPLIES: &str = "forum_replies";
pub const FARMER_CASES: &str = "farmer_cases";
pub const DONATIONS: &str = "donations";
pub const LAND_LISTINGS: &str = "land_listings";
pub const LEASE_PROPOSALS: &str = "lease_proposals";
pub const EQUIPMENT_LISTINGS: &str = "equipment_listings";
pub const RENTAL_REQUESTS: &str = "equipment_rental_requests";

/// Column holding the identity-widget user id on owner-scoped tables.
pub const OWNER_COLUMN: &str = "clerk_user_id";
pub const CREATED_AT: &str = "created_at";

/// RPC that sets the `sub` claim for row-level security on the backend.
pub const SET_CLAIM_RPC: &str = "set_claim";

pub const REPLY_COLUMNS: &[&str] = &[
    "id",
    "forum_id",
    "clerk_user_id",
    "user_name",
    "content",
    "is_solution",
    "created_at",
];

pub const DONATION_COLUMNS: &[&str] = &[
    "id",
    "case_id",
    "donor_name",
    "amount",
    "message",
    "is_anonymous",
    "created_at",
];

pub const LAND_SUMMARY_COLUMNS: &[&str] =
    &["title", "location", "area", "price_per_acre", "owner_name"];

pub const EQUIPMENT_SUMMARY_COLUMNS: &[&str] =
    &["name", "type", "location", "price_per_day", "owner_name"];
