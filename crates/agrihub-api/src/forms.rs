//! Form input as submitted by the browser, and the presence/range checks
//! applied before anything reaches the network.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use agrihub_services::openrouter::DEFAULT_VISION_MODEL;
use agrihub_services::{Provider, SoilSample, Timeframe};
use agrihub_types::api::{
    ForumPostPatch, NewDonation, NewEquipmentListing, NewFarmerCase, NewForumPost, NewForumReply,
    NewLandListing,
};
use agrihub_types::models::ForumCategory;

/// Highest daily rate a listing may ask.
pub const MAX_PRICE_PER_DAY: i64 = 1_000_000;

/// Largest image accepted for analysis, after base64 decoding.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

type Checked<T> = Result<T, ValidationError>;

fn required(field: &'static str, value: &str) -> Checked<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(value.to_string())
}

fn present<T>(field: &'static str, value: Option<T>) -> Checked<T> {
    value.ok_or_else(|| ValidationError::new(field, "is required"))
}

fn at_least<T: PartialOrd + std::fmt::Display>(field: &'static str, value: T, min: T) -> Checked<T> {
    if value < min {
        return Err(ValidationError::new(field, format!("must be at least {min}")));
    }
    Ok(value)
}

fn between<T: PartialOrd + std::fmt::Display>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Checked<T> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// "Borewell, Road access,," -> ["Borewell", "Road access"]
pub fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

// -- Forum --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: ForumCategory,
}

impl PostForm {
    pub fn validate(self) -> Checked<NewForumPost> {
        Ok(NewForumPost {
            title: required("title", &self.title)?,
            content: required("content", &self.content)?,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostEditForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<ForumCategory>,
}

impl PostEditForm {
    /// Supplied text fields must not be blank.
    pub fn validate(self) -> Checked<ForumPostPatch> {
        Ok(ForumPostPatch {
            title: self.title.map(|t| required("title", &t)).transpose()?,
            content: self.content.map(|c| required("content", &c)).transpose()?,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub content: String,
}

impl ReplyForm {
    pub fn validate(self, forum_id: i64) -> Checked<NewForumReply> {
        Ok(NewForumReply {
            forum_id,
            content: required("content", &self.content)?,
        })
    }
}

// -- Farmer support --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseForm {
    #[serde(default)]
    pub name: String,
    pub age: Option<i32>,
    #[serde(default)]
    pub location: String,
    pub family_size: Option<i32>,
    pub land_size: Option<f64>,
    pub amount_needed: Option<f64>,
    #[serde(default)]
    pub story: String,
    pub deadline: Option<NaiveDate>,
    pub verified_by: Option<String>,
}

impl CaseForm {
    pub fn validate(self) -> Checked<NewFarmerCase> {
        Ok(NewFarmerCase {
            name: required("name", &self.name)?,
            age: self.age.map(|a| between("age", a, 1, 120)).transpose()?,
            location: required("location", &self.location)?,
            family_size: self
                .family_size
                .map(|f| at_least("family_size", f, 1))
                .transpose()?,
            land_size: self
                .land_size
                .map(|l| at_least("land_size", l, 0.0))
                .transpose()?,
            amount_needed: at_least("amount_needed", present("amount_needed", self.amount_needed)?, 1.0)?,
            story: required("story", &self.story)?,
            deadline: self.deadline,
            verified_by: optional_text(self.verified_by),
            is_verified: false,
            is_active: true,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationForm {
    #[serde(default)]
    pub donor_name: String,
    pub amount: Option<f64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl DonationForm {
    pub fn validate(self, case_id: i64) -> Checked<NewDonation> {
        let donor_name = required("donor_name", &self.donor_name)?;
        let amount = at_least("amount", present("amount", self.amount)?, 1.0)?;
        Ok(NewDonation::new(
            case_id,
            &donor_name,
            amount,
            &self.message,
            self.is_anonymous,
        ))
    }
}

// -- Land lease --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub state: String,
    pub area: Option<f64>,
    pub price_per_acre: Option<i64>,
    #[serde(default)]
    pub soil_type: String,
    pub lease_duration: Option<i32>,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl LandListingForm {
    pub fn validate(self) -> Checked<NewLandListing> {
        Ok(NewLandListing {
            title: required("title", &self.title)?,
            location: required("location", &self.location)?,
            state: required("state", &self.state)?,
            area: at_least("area", present("area", self.area)?, 0.1)?,
            price_per_acre: at_least(
                "price_per_acre",
                present("price_per_acre", self.price_per_acre)?,
                1000,
            )?,
            soil_type: required("soil_type", &self.soil_type)?,
            lease_duration: between(
                "lease_duration",
                present("lease_duration", self.lease_duration)?,
                1,
                10,
            )?,
            features: split_features(&self.features),
            description: self.description.trim().to_string(),
            owner_name: required("owner_name", &self.owner_name)?,
            phone: required("phone", &self.phone)?,
            email: required("email", &self.email)?,
            is_available: true,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalForm {
    pub proposed_price: Option<i64>,
}

// -- Equipment lease --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentListingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub power_spec: String,
    #[serde(default)]
    pub condition: String,
    pub year: Option<i32>,
    pub price_per_day: Option<i64>,
    pub min_days: Option<i32>,
    pub max_days: Option<i32>,
    pub availability: Option<String>,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl EquipmentListingForm {
    pub fn validate(self) -> Checked<NewEquipmentListing> {
        Ok(NewEquipmentListing {
            name: required("name", &self.name)?,
            kind: required("type", &self.kind)?,
            location: required("location", &self.location)?,
            state: required("state", &self.state)?,
            power_spec: required("power_spec", &self.power_spec)?,
            condition: required("condition", &self.condition)?,
            year: between("year", present("year", self.year)?, 2000, 2024)?,
            price_per_day: between(
                "price_per_day",
                present("price_per_day", self.price_per_day)?,
                100,
                MAX_PRICE_PER_DAY,
            )?,
            min_days: at_least("min_days", present("min_days", self.min_days)?, 1)?,
            max_days: between("max_days", present("max_days", self.max_days)?, 1, 365)?,
            availability: optional_text(self.availability),
            features: split_features(&self.features),
            description: self.description.trim().to_string(),
            owner_name: required("owner_name", &self.owner_name)?,
            phone: required("phone", &self.phone)?,
            email: required("email", &self.email)?,
            is_available: true,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentalForm {
    pub rental_days: Option<i32>,
}

// -- Analysis --

/// `provider` is "gemini" (the default) or "openrouter" with an optional `model`.
fn provider(name: Option<&str>, model: Option<String>) -> Checked<Provider> {
    match name.map(str::trim) {
        None | Some("") | Some("gemini") => Ok(Provider::Gemini),
        Some("openrouter") => Ok(Provider::OpenRouter {
            model: optional_text(model).unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        }),
        Some(other) => Err(ValidationError::new(
            "provider",
            format!("unknown provider {other}"),
        )),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageForm {
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Base64 image, with or without a `data:` URL prefix.
    #[serde(default)]
    pub image: String,
}

impl ImageForm {
    /// The bare base64 payload, checked to decode and to fit the size cap.
    pub fn validate(self) -> Checked<(Provider, String)> {
        let raw = required("image", &self.image)?;
        let data = match raw.split_once(";base64,") {
            Some((_, data)) => data.to_string(),
            None => raw,
        };
        let bytes = B64
            .decode(data.as_bytes())
            .map_err(|_| ValidationError::new("image", "is not valid base64"))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::new("image", "Image size should be less than 10MB"));
        }
        Ok((provider(self.provider.as_deref(), self.model)?, data))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoilForm {
    pub provider: Option<String>,
    pub model: Option<String>,
    #[serde(flatten)]
    pub sample: SoilSample,
}

impl SoilForm {
    pub fn validate(self) -> Checked<(Provider, SoilSample)> {
        let s = &self.sample;
        for (field, value) in [
            ("pH", &s.ph),
            ("nitrogen", &s.nitrogen),
            ("phosphorus", &s.phosphorus),
            ("potassium", &s.potassium),
            ("organicMatter", &s.organic_matter),
            ("texture", &s.texture),
            ("moisture", &s.moisture),
            ("conductivity", &s.conductivity),
        ] {
            required(field, value)?;
        }
        Ok((provider(self.provider.as_deref(), self.model)?, self.sample))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceForm {
    #[serde(default)]
    pub vegetable: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub timeframe: Timeframe,
}

impl PriceForm {
    pub fn validate(self) -> Checked<(String, String, Timeframe)> {
        Ok((
            required("vegetable", &self.vegetable)?,
            required("location", &self.location)?,
            self.timeframe,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn land_form() -> LandListingForm {
        serde_json::from_value(json!({
            "title": "Fertile Paddy Field",
            "location": "Guntur",
            "state": "Andhra Pradesh",
            "area": 5.5,
            "price_per_acre": 45000,
            "soil_type": "Black Soil",
            "lease_duration": 3,
            "features": "Borewell, Road access, ,",
            "owner_name": "Ramesh Kumar",
            "phone": "+91 9876543210",
            "email": "ramesh.k@email.com"
        }))
        .unwrap()
    }

    #[test]
    fn land_form_splits_features() {
        let listing = land_form().validate().unwrap();
        assert_eq!(listing.features, ["Borewell", "Road access"]);
        assert!(listing.is_available);
    }

    #[test]
    fn land_ranges_are_enforced() {
        let mut form = land_form();
        form.price_per_acre = Some(999);
        assert_eq!(form.validate().unwrap_err().field, "price_per_acre");

        let mut form = land_form();
        form.lease_duration = Some(11);
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "lease_duration: must be between 1 and 10");

        let mut form = land_form();
        form.area = None;
        assert_eq!(form.validate().unwrap_err().to_string(), "area: is required");
    }

    #[test]
    fn blank_required_text_is_rejected() {
        let err = PostForm {
            title: "   ".to_string(),
            content: "body".to_string(),
            category: ForumCategory::General,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn equipment_year_window() {
        let form: EquipmentListingForm = serde_json::from_value(json!({
            "name": "Harvester", "type": "Harvester", "location": "Ludhiana",
            "state": "Punjab", "power_spec": "100 HP", "condition": "Fair",
            "year": 1999, "price_per_day": 2500, "min_days": 1, "max_days": 10,
            "owner_name": "Gurpreet", "phone": "1", "email": "g@example.com"
        }))
        .unwrap();
        assert_eq!(form.validate().unwrap_err().field, "year");
    }

    #[test]
    fn equipment_daily_rate_is_capped() {
        let mut form: EquipmentListingForm = serde_json::from_value(json!({
            "name": "Harvester", "type": "Harvester", "location": "Ludhiana",
            "state": "Punjab", "power_spec": "100 HP", "condition": "Fair",
            "year": 2018, "price_per_day": i64::MAX, "min_days": 1, "max_days": 10,
            "owner_name": "Gurpreet", "phone": "1", "email": "g@example.com"
        }))
        .unwrap();
        let err = form.clone().validate().unwrap_err();
        assert_eq!(err.to_string(), "price_per_day: must be between 100 and 1000000");

        form.price_per_day = Some(MAX_PRICE_PER_DAY);
        assert_eq!(form.validate().unwrap().price_per_day, MAX_PRICE_PER_DAY);
    }

    #[test]
    fn donation_checks_amount_and_name() {
        let form = DonationForm {
            donor_name: "Asha".to_string(),
            amount: Some(0.5),
            ..Default::default()
        };
        assert_eq!(form.validate(42).unwrap_err().field, "amount");

        let form = DonationForm {
            donor_name: "Asha".to_string(),
            amount: Some(5000.0),
            is_anonymous: true,
            ..Default::default()
        };
        assert_eq!(form.validate(42).unwrap().donor_name, "Anonymous");
    }

    #[test]
    fn case_optional_fields_are_checked_when_given() {
        let form = CaseForm {
            name: "Lakshmi".to_string(),
            location: "Medak".to_string(),
            story: "Crop loss".to_string(),
            amount_needed: Some(50_000.0),
            age: Some(130),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().field, "age");

        let form = CaseForm {
            name: "Lakshmi".to_string(),
            location: "Medak".to_string(),
            story: "Crop loss".to_string(),
            amount_needed: Some(50_000.0),
            ..Default::default()
        };
        let case = form.validate().unwrap();
        assert!(case.is_active && !case.is_verified);
    }

    #[test]
    fn image_accepts_data_url_and_caps_size() {
        let form: ImageForm = serde_json::from_value(json!({
            "provider": "openrouter",
            "image": "data:image/jpeg;base64,QUJD"
        }))
        .unwrap();
        let (provider, data) = form.validate().unwrap();
        assert_eq!(data, "QUJD");
        assert!(matches!(provider, Provider::OpenRouter { .. }));

        let form: ImageForm = serde_json::from_value(json!({ "image": "not base64!" })).unwrap();
        assert_eq!(form.validate().unwrap_err().field, "image");

        let form: ImageForm =
            serde_json::from_value(json!({ "provider": "openai", "image": "QUJD" })).unwrap();
        assert_eq!(form.validate().unwrap_err().field, "provider");
    }

    #[test]
    fn soil_requires_all_measurements() {
        let form: SoilForm = serde_json::from_value(json!({
            "provider": "gemini",
            "pH": "6.5", "nitrogen": "280", "phosphorus": "25", "potassium": "",
            "organicMatter": "2", "texture": "Loamy", "moisture": "18", "conductivity": "0.4"
        }))
        .unwrap();
        assert_eq!(form.validate().unwrap_err().field, "potassium");
    }

    #[test]
    fn price_requires_vegetable_and_location() {
        let form: PriceForm = serde_json::from_value(json!({ "vegetable": "Okra", "timeframe": 4 })).unwrap();
        assert_eq!(form.validate().unwrap_err().field, "location");
    }
}
