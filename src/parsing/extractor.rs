use crate::parsing::error::ParseError;
use crate::types::payload::{DayForecast, ForecastResponse, HourEntry, HourOfDay, RawCityPayload};
use crate::types::records::HourlyRecord;
use chrono::DateTime;
use log::debug;
use serde::Deserialize;

/// First hour of the daytime window (inclusive).
pub const START_HOUR: u32 = 9;
/// Last hour of the daytime window (inclusive).
pub const END_HOUR: u32 = 19;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats epoch seconds as a UTC `YYYY-MM-DD HH:MM:SS` string.
///
/// ```rust
/// use trip_forecast::to_datetime;
///
/// assert_eq!(to_datetime(123123123).unwrap(), "1973-11-26 00:52:03");
/// ```
pub fn to_datetime(unix_seconds: i64) -> Result<String, ParseError> {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .ok_or(ParseError::TimestampOutOfRange(unix_seconds))
}

fn schema_error(city: &str, source: serde_json::Error) -> ParseError {
    ParseError::Schema {
        city: city.to_string(),
        source,
    }
}

/// Extracts the daytime hours of the first forecast day from one city's payload.
///
/// Hours keep the payload's order. A payload without any hour in
/// `START_HOUR..=END_HOUR` yields an empty vector. Later forecast days and hour
/// entries outside the window are not validated beyond their `hour` field.
///
/// # Errors
///
/// Returns [`ParseError::Schema`] when a field that is read is missing or has the
/// wrong type, and [`ParseError::MissingForecastDay`] when `forecasts` is empty.
pub fn extract_hourly_records(payload: &RawCityPayload) -> Result<Vec<HourlyRecord>, ParseError> {
    let response = ForecastResponse::deserialize(payload.as_value())
        .map_err(|e| schema_error(payload.city_hint().unwrap_or("<unknown>"), e))?;

    let city = response.geo_object.province.name;
    debug!("Start parsing {}", city);

    let first_day = response
        .forecasts
        .first()
        .ok_or_else(|| ParseError::MissingForecastDay(city.clone()))?;
    let day = DayForecast::deserialize(first_day).map_err(|e| schema_error(&city, e))?;

    let mut records = Vec::new();
    for raw_hour in &day.hours {
        let HourOfDay { hour } =
            HourOfDay::deserialize(raw_hour).map_err(|e| schema_error(&city, e))?;
        if !(START_HOUR..=END_HOUR).contains(&hour) {
            continue;
        }
        let hour = HourEntry::deserialize(raw_hour).map_err(|e| schema_error(&city, e))?;
        records.push(HourlyRecord {
            city: city.clone(),
            hour: hour.hour,
            hour_ts: to_datetime(hour.hour_ts)?,
            temp: hour.temp,
            condition: hour.condition,
            is_thunder: hour.is_thunder,
            wind_speed: hour.wind_speed,
            humidity: hour.humidity,
        });
    }

    debug!("End parsing {}", city);
    Ok(records)
}
