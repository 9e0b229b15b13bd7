//! Groups hourly records into per-city, per-day metrics using Polars.

use crate::analysis::error::AnalysisError;
use crate::types::condition::Condition;
use crate::types::records::{CityDayAggregate, HourlyRecord};
use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const COL_CITY: &str = "city";
pub const COL_HOUR: &str = "hour";
pub const COL_HOUR_TS: &str = "hour_ts";
pub const COL_TEMP: &str = "temp";
pub const COL_CONDITION: &str = "condition";
pub const COL_IS_THUNDER: &str = "is_thunder";
pub const COL_WIND_SPEED: &str = "wind_speed";
pub const COL_HUMIDITY: &str = "humidity";
pub const COL_DAY_DATE: &str = "day_date";
pub const COL_WITHOUT_PRECIPITATION: &str = "without_precipitation";
pub const COL_AVERAGE_TEMP: &str = "average_temp";

pub const DAY_FORMAT: &str = "%Y-%m-%d";

fn get_column<'a>(df: &'a DataFrame, col: &str) -> Result<&'a Column, AnalysisError> {
    df.column(col)
        .map_err(|e| AnalysisError::ColumnNotFound(col.to_string(), e))
}

fn null_at(column: &str, row: usize) -> AnalysisError {
    AnalysisError::NullValue {
        column: column.to_string(),
        row,
    }
}

/// Builds the flat hourly table, adding the `day_date` column derived from `hour_ts`.
pub fn records_to_dataframe(records: &[HourlyRecord]) -> Result<DataFrame, AnalysisError> {
    let day_dates = records
        .iter()
        .map(|r| {
            r.day_date()
                .map(|day| day.format(DAY_FORMAT).to_string())
                .ok_or_else(|| AnalysisError::InvalidTimestamp(r.hour_ts.clone()))
        })
        .collect::<Result<Vec<String>, AnalysisError>>()?;

    let df = df!(
        COL_CITY => records.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
        COL_HOUR => records.iter().map(|r| i64::from(r.hour)).collect::<Vec<_>>(),
        COL_HOUR_TS => records.iter().map(|r| r.hour_ts.as_str()).collect::<Vec<_>>(),
        COL_TEMP => records.iter().map(|r| r.temp).collect::<Vec<_>>(),
        COL_CONDITION => records.iter().map(|r| r.condition.as_str()).collect::<Vec<_>>(),
        COL_IS_THUNDER => records.iter().map(|r| r.is_thunder).collect::<Vec<_>>(),
        COL_WIND_SPEED => records.iter().map(|r| r.wind_speed).collect::<Vec<_>>(),
        COL_HUMIDITY => records.iter().map(|r| r.humidity).collect::<Vec<_>>(),
        COL_DAY_DATE => day_dates,
    )?;
    Ok(df)
}

/// Writes `df` as CSV with a leading, unnamed row-index column.
///
/// The header line is written here rather than by the CSV writer, which would
/// quote the empty index name as `""`.
pub fn save_to_csv(df: &DataFrame, path: &Path) -> Result<(), AnalysisError> {
    let mut indexed = df.with_row_index(PlSmallStr::from_str(""), None)?;
    let header = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut file =
        File::create(path).map_err(|e| AnalysisError::ArtifactCreate(path.to_path_buf(), e))?;
    writeln!(file, ",{}", header)
        .map_err(|e| AnalysisError::ArtifactHeader(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(false)
        .finish(&mut indexed)
        .map_err(|e| AnalysisError::ArtifactWrite(path.to_path_buf(), e))?;
    Ok(())
}

/// Turns the flat hourly table into one [`CityDayAggregate`] per (city, day_date).
///
/// Both metrics are grouped separately and then inner-joined, so a day on which a
/// city has no `clear` or `cloudy` hour at all is dropped from the result rather
/// than reported with a zero count.
pub struct Aggregator {
    artifact_path: Option<PathBuf>,
}

impl Aggregator {
    /// `artifact_path`, when set, receives the flat pre-aggregation table as CSV.
    pub fn new(artifact_path: Option<PathBuf>) -> Self {
        Self { artifact_path }
    }

    pub fn aggregate(&self, records: &[HourlyRecord]) -> Result<Vec<CityDayAggregate>, AnalysisError> {
        let flat = records_to_dataframe(records)?;
        let merged = aggregate_frame(flat.clone().lazy()).collect()?;

        if let Some(path) = &self.artifact_path {
            save_to_csv(&flat, path)?;
            info!("Saved {} hourly rows to {:?}", flat.height(), path);
        }

        frame_to_aggregates(&merged)
    }
}

/// Lazy plan computing both metrics and joining them on (city, day_date).
///
/// Output is sorted by city, then day_date.
pub fn aggregate_frame(flat: LazyFrame) -> LazyFrame {
    let keys = [col(COL_CITY), col(COL_DAY_DATE)];

    debug!("Calculating without precipitation");
    let without_precipitation = flat
        .clone()
        .filter(
            col(COL_CONDITION)
                .eq(lit(Condition::Clear.as_str()))
                .or(col(COL_CONDITION).eq(lit(Condition::Cloudy.as_str()))),
        )
        .group_by(keys.clone())
        .agg([col(COL_CONDITION)
            .count()
            .cast(DataType::Int64)
            .alias(COL_WITHOUT_PRECIPITATION)]);

    debug!("Calculating average temperature");
    let average_temp = flat
        .group_by(keys.clone())
        .agg([col(COL_TEMP).mean().alias(COL_AVERAGE_TEMP)]);

    debug!("Joining tables with condition and temperature");
    without_precipitation
        .join(
            average_temp,
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs(keys, SortMultipleOptions::default())
}

/// Reads the joined frame back into typed rows.
pub fn frame_to_aggregates(df: &DataFrame) -> Result<Vec<CityDayAggregate>, AnalysisError> {
    let cities = get_column(df, COL_CITY)?.str()?;
    let days = get_column(df, COL_DAY_DATE)?.str()?;
    let dry_hours = get_column(df, COL_WITHOUT_PRECIPITATION)?.i64()?;
    let temps = get_column(df, COL_AVERAGE_TEMP)?.f64()?;

    (0..df.height())
        .map(|row| {
            let city = cities.get(row).ok_or_else(|| null_at(COL_CITY, row))?;
            let day = days.get(row).ok_or_else(|| null_at(COL_DAY_DATE, row))?;
            let day_date = NaiveDate::parse_from_str(day, DAY_FORMAT)
                .map_err(|e| AnalysisError::InvalidDayDate(day.to_string(), e))?;
            Ok(CityDayAggregate {
                city: city.to_string(),
                day_date,
                without_precipitation: dry_hours
                    .get(row)
                    .ok_or_else(|| null_at(COL_WITHOUT_PRECIPITATION, row))?,
                average_temp: temps
                    .get(row)
                    .ok_or_else(|| null_at(COL_AVERAGE_TEMP, row))?,
            })
        })
        .collect()
}
