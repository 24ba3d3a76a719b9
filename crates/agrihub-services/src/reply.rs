//! Model replies: free-form markdown or a JSON object pulled out of the text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServiceError;
use crate::prompts::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum AiReply {
    Text(String),
    Structured(Map<String, Value>),
}

impl AiReply {
    /// Interpret `raw` as JSON-in-markdown.
    pub fn structured(raw: &str) -> Result<Self, ServiceError> {
        parse_structured(raw).map(Self::Structured)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

/// Strip code fences and parse the first `{` through the last `}`.
pub fn parse_structured(raw: &str) -> Result<Map<String, Value>, ServiceError> {
    let cleaned = raw.trim().replace("```json", "").replace("```", "");
    let candidate = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned.trim(),
    };
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ServiceError::InvalidFormat),
    }
}

/// A vegetable price forecast in rupees per kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePrediction {
    pub current_price: f64,
    pub predicted_price: f64,
    pub change: f64,
    pub confidence: String,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

impl PricePrediction {
    /// Both prices must be present and non-zero; the rest is best-effort.
    pub fn from_structured(map: &Map<String, Value>) -> Result<Self, ServiceError> {
        let price = |key: &str| number(map.get(key)).filter(|p| *p != 0.0);
        let (Some(current_price), Some(predicted_price)) =
            (price("currentPrice"), price("predictedPrice"))
        else {
            return Err(ServiceError::IncompletePrediction);
        };

        Ok(Self {
            current_price,
            predicted_price,
            change: number(map.get("change")).unwrap_or(0.0),
            confidence: map
                .get("confidence")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            factors: strings(map.get("factors")),
            recommendations: strings(map.get("recommendations")),
        })
    }

    pub fn is_rising(&self) -> bool {
        self.change >= 0.0
    }
}

/// A prediction together with what was asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceForecast {
    pub vegetable: String,
    pub location: String,
    pub timeframe: String,
    #[serde(flatten)]
    pub prediction: PricePrediction,
}

impl PriceForecast {
    pub fn new(vegetable: &str, location: &str, timeframe: Timeframe, prediction: PricePrediction) -> Self {
        Self {
            vegetable: vegetable.to_string(),
            location: location.to_string(),
            timeframe: timeframe.label().to_string(),
            prediction,
        }
    }
}

/// Numbers sometimes come back quoted, with a currency sign or a percent.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('₹')
            .trim_end_matches('%')
            .trim()
            .parse()
            .ok(),
        _ => None,
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}
