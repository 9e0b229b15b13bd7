//! The wide, ranked comparison table produced by the ranker.

use crate::analysis::aggregator::{COL_AVERAGE_TEMP, COL_CITY, COL_WITHOUT_PRECIPITATION, DAY_FORMAT};
use crate::analysis::error::AnalysisError;
use crate::analysis::ranker::day_columns;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;

pub const COL_PARAMETER: &str = "parameter";
pub const COL_AVERAGE: &str = "average";
pub const COL_RATING: &str = "rating";

/// The metric a report row carries.
///
/// Ordering follows the metric names, so `AverageTemp` sorts before
/// `WithoutPrecipitation` exactly as the column labels do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    AverageTemp,
    WithoutPrecipitation,
}

impl Parameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::AverageTemp => COL_AVERAGE_TEMP,
            Parameter::WithoutPrecipitation => COL_WITHOUT_PRECIPITATION,
        }
    }

    /// The parameter whose metric column is named `name`.
    pub fn from_column(name: &str) -> Option<Self> {
        match name {
            COL_AVERAGE_TEMP => Some(Parameter::AverageTemp),
            COL_WITHOUT_PRECIPITATION => Some(Parameter::WithoutPrecipitation),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (city, parameter) row of the wide report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    pub city: String,
    pub parameter: Parameter,
    /// One score per entry of [`AnalysisReport::days`], zero where the city had no
    /// data for that day.
    pub scores: Vec<f64>,
    /// Mean of `scores`.
    pub average: f64,
    /// Dense rank of `city` in alphabetical order, starting at 1.
    pub rating: u32,
}

/// Wide per-city report: two rows per city, one score column per observed day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisReport {
    /// Day columns in ascending order.
    pub days: Vec<NaiveDate>,
    /// Rows ordered by city, then parameter.
    pub rows: Vec<AnalysisRow>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, city: &str, parameter: Parameter) -> Option<&AnalysisRow> {
        self.rows
            .iter()
            .find(|r| r.city == city && r.parameter == parameter)
    }

    /// The score of `city` for `parameter` on `day`, if the day is a report column.
    pub fn score(&self, city: &str, parameter: Parameter, day: NaiveDate) -> Option<f64> {
        let idx = self.days.iter().position(|d| *d == day)?;
        self.row(city, parameter)
            .and_then(|r| r.scores.get(idx).copied())
    }

    /// Distinct cities in report order.
    pub fn cities(&self) -> Vec<&str> {
        let mut cities: Vec<&str> = self.rows.iter().map(|r| r.city.as_str()).collect();
        cities.dedup();
        cities
    }

    /// The city with the warmest average daytime temperature.
    ///
    /// Ties go to the city with more non-precipitating hours on average, then to
    /// the alphabetically first city.
    pub fn best_city(&self) -> Option<&str> {
        let average_of = |city: &str, parameter| {
            self.row(city, parameter)
                .map(|r| r.average)
                .unwrap_or(f64::NEG_INFINITY)
        };
        self.cities().into_iter().reduce(|best, city| {
            let by_temp = average_of(city, Parameter::AverageTemp)
                .total_cmp(&average_of(best, Parameter::AverageTemp));
            let by_dry = average_of(city, Parameter::WithoutPrecipitation)
                .total_cmp(&average_of(best, Parameter::WithoutPrecipitation));
            if by_temp.then(by_dry).is_gt() {
                city
            } else {
                best
            }
        })
    }

    /// Reads a wide frame with columns `city, parameter, <day...>, average, rating`.
    ///
    /// Day columns are taken in frame order and must be named `YYYY-MM-DD`.
    pub fn from_dataframe(wide: &DataFrame) -> Result<Self, AnalysisError> {
        let day_names = day_columns(wide);
        let days = day_names
            .iter()
            .map(|name| {
                NaiveDate::parse_from_str(name, DAY_FORMAT)
                    .map_err(|e| AnalysisError::InvalidDayDate(name.clone(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cities = column(wide, COL_CITY)?.str()?;
        let parameters = column(wide, COL_PARAMETER)?.str()?;
        let averages = column(wide, COL_AVERAGE)?.f64()?;
        let ratings = column(wide, COL_RATING)?.u32()?;
        let scores = day_names
            .iter()
            .map(|name| Ok(column(wide, name)?.f64()?))
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let rows = (0..wide.height())
            .map(|row| {
                let parameter = parameters.get(row).ok_or_else(|| null_at(COL_PARAMETER, row))?;
                Ok(AnalysisRow {
                    city: cities
                        .get(row)
                        .ok_or_else(|| null_at(COL_CITY, row))?
                        .to_string(),
                    parameter: Parameter::from_column(parameter)
                        .ok_or_else(|| AnalysisError::UnknownParameter(parameter.to_string()))?,
                    scores: scores
                        .iter()
                        .zip(&day_names)
                        .map(|(day, name)| day.get(row).ok_or_else(|| null_at(name, row)))
                        .collect::<Result<_, _>>()?,
                    average: averages.get(row).ok_or_else(|| null_at(COL_AVERAGE, row))?,
                    rating: ratings.get(row).ok_or_else(|| null_at(COL_RATING, row))?,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        Ok(Self { days, rows })
    }

    /// Renders the report as a DataFrame with columns
    /// `city, parameter, <day...>, average, rating`.
    ///
    /// A row with fewer scores than there are days gets nulls in the missing cells.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.days.len() + 4);
        columns.push(Column::new(
            COL_CITY.into(),
            self.rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            COL_PARAMETER.into(),
            self.rows
                .iter()
                .map(|r| r.parameter.as_str())
                .collect::<Vec<_>>(),
        ));
        for (idx, day) in self.days.iter().enumerate() {
            columns.push(Column::new(
                PlSmallStr::from(day.format(DAY_FORMAT).to_string()),
                self.rows
                    .iter()
                    .map(|r| r.scores.get(idx).copied())
                    .collect::<Vec<Option<f64>>>(),
            ));
        }
        columns.push(Column::new(
            COL_AVERAGE.into(),
            self.rows.iter().map(|r| r.average).collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            COL_RATING.into(),
            self.rows.iter().map(|r| r.rating).collect::<Vec<u32>>(),
        ));
        DataFrame::new(columns)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, AnalysisError> {
    df.column(name)
        .map_err(|e| AnalysisError::ColumnNotFound(name.to_string(), e))
}

fn null_at(column: &str, row: usize) -> AnalysisError {
    AnalysisError::NullValue {
        column: column.to_string(),
        row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, n).unwrap()
    }

    fn row(city: &str, parameter: Parameter, scores: Vec<f64>, rating: u32) -> AnalysisRow {
        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        AnalysisRow {
            city: city.to_string(),
            parameter,
            scores,
            average,
            rating,
        }
    }

    #[test]
    fn test_short_score_row_does_not_panic() -> Result<(), PolarsError> {
        let report = AnalysisReport {
            days: vec![day(26), day(27)],
            rows: vec![row("Paris", Parameter::AverageTemp, vec![18.0], 1)],
        };

        assert_eq!(report.score("Paris", Parameter::AverageTemp, day(26)), Some(18.0));
        assert_eq!(report.score("Paris", Parameter::AverageTemp, day(27)), None);

        let df = report.to_dataframe()?;
        assert_eq!(df.column("2022-05-26")?.f64()?.get(0), Some(18.0));
        assert_eq!(df.column("2022-05-27")?.f64()?.get(0), None);
        Ok(())
    }

    #[test]
    fn test_dataframe_round_trip_keeps_layout() -> Result<(), AnalysisError> {
        let report = AnalysisReport {
            days: vec![day(26), day(27)],
            rows: vec![
                row("Berlin", Parameter::AverageTemp, vec![14.0, 16.0], 1),
                row("Berlin", Parameter::WithoutPrecipitation, vec![3.0, 0.0], 1),
                row("Cairo", Parameter::AverageTemp, vec![31.0, 33.0], 2),
                row("Cairo", Parameter::WithoutPrecipitation, vec![11.0, 10.0], 2),
            ],
        };

        let df = report.to_dataframe()?;
        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["city", "parameter", "2022-05-26", "2022-05-27", "average", "rating"]);
        assert_eq!(AnalysisReport::from_dataframe(&df)?, report);
        Ok(())
    }

    #[test]
    fn test_best_city_prefers_warmth_then_dry_hours() {
        let report = AnalysisReport {
            days: vec![day(26)],
            rows: vec![
                row("Berlin", Parameter::AverageTemp, vec![20.0], 1),
                row("Berlin", Parameter::WithoutPrecipitation, vec![4.0], 1),
                row("Paris", Parameter::AverageTemp, vec![20.0], 2),
                row("Paris", Parameter::WithoutPrecipitation, vec![7.0], 2),
            ],
        };
        assert_eq!(report.best_city(), Some("Paris"));
        assert_eq!(report.cities(), ["Berlin", "Paris"]);
    }

    #[test]
    fn test_unknown_parameter_is_rejected() -> Result<(), PolarsError> {
        let df = df!(
            COL_CITY => ["Berlin"],
            COL_PARAMETER => ["humidity"],
            "2022-05-26" => [60.0],
            COL_AVERAGE => [60.0],
            COL_RATING => [1u32],
        )?;
        assert!(matches!(
            AnalysisReport::from_dataframe(&df),
            Err(AnalysisError::UnknownParameter(name)) if name == "humidity"
        ));
        Ok(())
    }
}
