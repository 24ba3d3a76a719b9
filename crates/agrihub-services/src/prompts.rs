//! Instructions sent to the generative models.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

pub const PLANT_HEALTH: &str = "Analyze this plant image and provide a comprehensive health assessment. \
Please structure your response as follows:

**Plant Identification:**
- Plant name/species (if identifiable)
- Growth stage

**Health Status:**
- Overall health rating (Healthy/Mild Stress/Diseased/Severely Diseased)
- Confidence level (%)

**Disease or Deficiency Analysis:**
- Visible symptoms
- Likely disease, pest damage or nutrient deficiency
- Severity and spread risk

**Treatment Recommendations:**
- Immediate actions
- Organic/natural treatments
- Chemical treatments with dosage and safety precautions

**Prevention Strategies:**
- Cultural practices
- Watering and fertilization guidance
- Monitoring schedule

Please be specific and practical. If you are uncertain, mention alternative possibilities and confidence levels.";

pub const PEST_IDENTIFICATION: &str = "Analyze this image for pest identification and provide a comprehensive assessment. \
Please structure your response as follows:

**Pest Identification:**
- Pest name/species (if identifiable)
- Common name and scientific name
- Pest category (insect, mite, nematode, etc.)
- Life stage visible (egg, larva, adult, etc.)

**Physical Characteristics:**
- Size, color, markings and distinctive features

**Threat Assessment:**
- Threat level (Low/Moderate/High/Severe)
- Confidence level (%)
- Potential damage severity and economic impact

**Damage Analysis:**
- Type of damage caused and affected plant parts
- Damage symptoms to look for

**Host Plants:**
- Primary and secondary host plants
- Seasonal preferences

**Control Methods:**
- Immediate action needed
- Biological, chemical and organic options
- IPM (Integrated Pest Management) approach

**Prevention Strategies:**
- Cultural practices, monitoring and early detection
- Resistant varieties

**Treatment Recommendations:**
- Specific pesticides/insecticides, application method, dosage and frequency
- Safety precautions and re-application schedule

Please be specific and practical in your recommendations. If you're uncertain about identification, \
please mention alternative possibilities and confidence levels.";

const SOIL_HEALTH_HEADER: &str = "Analyze this soil data and provide a comprehensive soil health assessment. \
Please structure your response as follows:

**Soil Health Summary:**
- Overall soil health rating (Excellent/Good/Fair/Poor)
- Key strengths and weaknesses

**pH Analysis:**
- Interpretation, impact on nutrient availability, suitable amendments

**Nutrient Analysis:**
- Nitrogen, phosphorus and potassium status
- Fertilizer recommendations with specific NPK ratios

**Organic Matter Assessment:**
- Current status and composting suggestions

**Physical Properties:**
- Texture, moisture retention, drainage and tillage recommendations

**Salinity Assessment:**
- Electrical conductivity interpretation and management

**Crop Suitability:**
- Most suitable crops, crops to avoid, rotation recommendations

**Soil Improvement Plan:**
- Short-term (1-6 months), medium-term (6-12 months) and long-term (1-3 years) actions

**Economic Considerations:**
- Cost-effective strategies and budget-friendly alternatives
";

const SOIL_HEALTH_FOOTER: &str = "Please provide specific, actionable recommendations based on these soil parameters. \
Include both immediate actions and long-term soil health strategies.";

pub const PRICE_SYSTEM: &str = "You are an expert agricultural economist with deep knowledge of vegetable markets, \
weather patterns, supply chains, and regional farming conditions. Analyze real market factors and provide genuine \
price predictions. Consider current season, weather impacts, transportation costs, regional supply/demand, farming \
cycles, and economic conditions. Respond with ONLY a JSON object - no markdown, no explanations, just pure JSON.";

pub const VEGETABLES: &[&str] = &[
    "Tomato",
    "Potato",
    "Onion",
    "Carrot",
    "Cauliflower",
    "Cabbage",
    "Brinjal",
    "Okra",
    "Peas",
    "Spinach",
    "Cucumber",
    "Green Chili",
];

/// Measurements from a soil test, as entered on the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoilSample {
    #[serde(rename = "pH")]
    pub ph: String,
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    pub organic_matter: String,
    pub texture: String,
    pub moisture: String,
    pub conductivity: String,
    pub location: String,
    pub crop_type: String,
}

/// Prediction horizon, carried on the wire as a number of weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Timeframe {
    #[default]
    OneWeek,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Self::OneWeek,
        Self::TwoWeeks,
        Self::OneMonth,
        Self::ThreeMonths,
    ];

    pub fn weeks(self) -> u32 {
        match self {
            Self::OneWeek => 1,
            Self::TwoWeeks => 2,
            Self::OneMonth => 4,
            Self::ThreeMonths => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneWeek => "1 Week",
            Self::TwoWeeks => "2 Weeks",
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
        }
    }
}

/// Unknown horizons fall back to one week.
impl From<u32> for Timeframe {
    fn from(weeks: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.weeks() == weeks)
            .unwrap_or_default()
    }
}

impl From<Timeframe> for u32 {
    fn from(t: Timeframe) -> Self {
        t.weeks()
    }
}

pub fn soil_health(sample: &SoilSample) -> String {
    let mut prompt = String::from(SOIL_HEALTH_HEADER);
    prompt.push_str("\nSoil Data:\n");
    let _ = writeln!(prompt, "- pH: {}", sample.ph);
    let _ = writeln!(prompt, "- Nitrogen: {} mg/kg", sample.nitrogen);
    let _ = writeln!(prompt, "- Phosphorus: {} mg/kg", sample.phosphorus);
    let _ = writeln!(prompt, "- Potassium: {} mg/kg", sample.potassium);
    let _ = writeln!(prompt, "- Organic Matter: {}%", sample.organic_matter);
    let _ = writeln!(prompt, "- Soil Texture: {}", sample.texture);
    let _ = writeln!(prompt, "- Moisture: {}%", sample.moisture);
    let _ = writeln!(prompt, "- Electrical Conductivity: {} dS/m", sample.conductivity);
    let _ = writeln!(prompt, "- Location: {}", sample.location);
    let _ = writeln!(prompt, "- Intended Crop: {}", sample.crop_type);
    prompt.push('\n');
    prompt.push_str(SOIL_HEALTH_FOOTER);
    prompt
}

pub fn price_prediction(vegetable: &str, location: &str, timeframe: Timeframe) -> String {
    format!(
        "Analyze and predict the price of {vegetable} in {location} for the next {}.

Consider current market conditions, seasonal factors, regional trends, weather patterns, supply chain issues, and economic factors.

Respond with ONLY a JSON object with these fields:
- currentPrice: current market price per kg in INR
- predictedPrice: your predicted price per kg in INR
- change: percentage change (positive or negative)
- confidence: your confidence level (High/Medium/Low)
- factors: array of 3-4 specific market factors affecting the price
- recommendations: array of 3-4 actionable recommendations

Base your analysis on real market dynamics and provide genuine predictions.",
        timeframe.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_labels_follow_weeks() {
        assert_eq!(Timeframe::from(4).label(), "1 Month");
        assert_eq!(Timeframe::from(12).label(), "3 Months");
        assert_eq!(Timeframe::from(3), Timeframe::OneWeek);
        assert_eq!(serde_json::to_string(&Timeframe::TwoWeeks).unwrap(), "2");
    }

    #[test]
    fn soil_prompt_lists_every_measurement() {
        let sample = SoilSample {
            ph: "6.5".to_string(),
            nitrogen: "280".to_string(),
            phosphorus: "25".to_string(),
            potassium: "180".to_string(),
            organic_matter: "2.1".to_string(),
            texture: "Loamy".to_string(),
            moisture: "18".to_string(),
            conductivity: "0.4".to_string(),
            location: "Nashik".to_string(),
            crop_type: "Grapes".to_string(),
        };
        let prompt = soil_health(&sample);
        assert!(prompt.contains("- pH: 6.5\n"));
        assert!(prompt.contains("- Nitrogen: 280 mg/kg\n"));
        assert!(prompt.contains("- Electrical Conductivity: 0.4 dS/m\n"));
        assert!(prompt.contains("- Intended Crop: Grapes\n"));
        assert!(prompt.ends_with("long-term soil health strategies."));
    }

    #[test]
    fn soil_sample_uses_form_field_names() {
        let sample: SoilSample = serde_json::from_str(
            r#"{"pH":"7","nitrogen":"1","phosphorus":"2","potassium":"3",
                "organicMatter":"4","texture":"Clay","moisture":"5","conductivity":"6"}"#,
        )
        .unwrap();
        assert_eq!(sample.ph, "7");
        assert_eq!(sample.organic_matter, "4");
        assert!(sample.crop_type.is_empty());
    }

    #[test]
    fn price_prompt_names_horizon() {
        let prompt = price_prediction("Tomato", "Pune", Timeframe::OneMonth);
        assert!(prompt.starts_with("Analyze and predict the price of Tomato in Pune for the next 1 Month."));
        assert!(prompt.contains("- currentPrice:"));
    }
}
