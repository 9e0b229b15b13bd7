//! Row types flowing between pipeline stages.

use crate::types::condition::Condition;
use chrono::NaiveDate;
use serde::Serialize;

/// One forecast hour inside the daytime window, normalized from a raw payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Province name the payload was issued for.
    pub city: String,
    /// Hour of day, always within `START_HOUR..=END_HOUR`.
    pub hour: u32,
    /// UTC timestamp formatted as `YYYY-MM-DD HH:MM:SS`.
    pub hour_ts: String,
    pub temp: f64,
    pub condition: Condition,
    pub is_thunder: bool,
    pub wind_speed: f64,
    pub humidity: f64,
}

impl HourlyRecord {
    /// The calendar day of `hour_ts`, used as the aggregation key.
    ///
    /// Returns `None` if `hour_ts` was not produced by the extractor's formatter.
    pub fn day_date(&self) -> Option<NaiveDate> {
        self.hour_ts
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }
}

/// Daily metrics for one city, one row per (city, day_date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityDayAggregate {
    pub city: String,
    pub day_date: NaiveDate,
    /// Number of `clear`/`cloudy` hours in the daytime window.
    pub without_precipitation: i64,
    /// Mean temperature over every daytime hour of that day.
    pub average_temp: f64,
}
