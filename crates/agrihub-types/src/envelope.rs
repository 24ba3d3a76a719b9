use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Uniform result of a data-access or service call.
///
/// On the wire this is `{ "success": true, "data": ... }` or
/// `{ "success": false, "error": "..." }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(String),
}

impl<T> Envelope<T> {
    pub fn failure(error: impl fmt::Display) -> Self {
        Self::Failure(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Self::Success(data) => Envelope::Success(f(data)),
            Self::Failure(error) => Envelope::Failure(error),
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Envelope<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Self::Success(data) => {
                st.serialize_field("success", &true)?;
                st.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                st.serialize_field("success", &false)?;
                st.serialize_field("error", error)?;
            }
        }
        st.end()
    }
}

#[derive(Deserialize)]
struct EnvelopeWire {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
    error: Option<String>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = EnvelopeWire::deserialize(deserializer)?;
        if wire.success {
            T::deserialize(wire.data)
                .map(Self::Success)
                .map_err(D::Error::custom)
        } else {
            wire.error
                .map(Self::Failure)
                .ok_or_else(|| D::Error::missing_field("error"))
        }
    }
}
