//! The raw per-city forecast payload and the typed view the extractor reads from it.

use crate::types::condition::Condition;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One city's forecast response, exactly as the provider returned it.
///
/// The payload is kept as untyped JSON until extraction, so a malformed response
/// is reported as a schema error by the parser rather than as a transport
/// failure by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCityPayload(pub Value);

impl RawCityPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The province name, if the payload has one. Used for error context only.
    pub fn city_hint(&self) -> Option<&str> {
        self.0
            .pointer("/geo_object/province/name")
            .and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawCityPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// --- Typed schema (only the fields the pipeline reads) ---
//
// Forecast days and hours stay untyped until the extractor picks the ones it
// uses, so a malformed later day or an out-of-window hour is never inspected.

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub geo_object: GeoObject,
    pub forecasts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoObject {
    pub province: Province,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Province {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DayForecast {
    pub hours: Vec<Value>,
}

/// Just the hour of an hour entry, read before deciding whether the entry matters.
#[derive(Debug, Deserialize)]
pub(crate) struct HourOfDay {
    #[serde(deserialize_with = "hour_of_day")]
    pub hour: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourEntry {
    #[serde(deserialize_with = "hour_of_day")]
    pub hour: u32,
    pub hour_ts: i64,
    pub temp: f64,
    pub condition: Condition,
    pub is_thunder: bool,
    pub wind_speed: f64,
    pub humidity: f64,
}

/// The provider sends the hour as a string (`"13"`); older fixtures use a number.
fn hour_of_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct HourVisitor;

    impl<'de> de::Visitor<'de> for HourVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an hour of day as an integer or a numeric string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::custom(format!("hour {v} out of range")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::custom(format!("hour {v} out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
            v.trim()
                .parse::<u32>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(HourVisitor)
}
