//! Reshapes daily aggregates into the wide, rated report.
//!
//! The steps run as Polars frame operations: sort, unpivot to long form, pivot
//! to wide form, average each row, and rate cities. Each step is public so it
//! can be inspected on its own.

use crate::analysis::aggregator::{
    COL_AVERAGE_TEMP, COL_CITY, COL_DAY_DATE, COL_WITHOUT_PRECIPITATION, DAY_FORMAT,
};
use crate::analysis::error::AnalysisError;
use crate::analysis::report::{AnalysisReport, COL_AVERAGE, COL_PARAMETER, COL_RATING};
use crate::types::records::CityDayAggregate;
use log::debug;
use polars::lazy::frame::pivot::pivot_stable;
use polars::prelude::*;

/// Score column of the long form.
pub const COL_SCORE: &str = "score";

/// Runs every reshape step and returns the final report.
pub fn analyze(aggregates: &[CityDayAggregate]) -> Result<AnalysisReport, AnalysisError> {
    if aggregates.is_empty() {
        return Ok(AnalysisReport::default());
    }

    let sorted = sort_by_favorability(aggregates_to_dataframe(aggregates)?.lazy()).collect()?;
    let long = melt(&sorted)?;
    let wide = pivot(&long)?;
    let wide = compute_row_averages(wide)?;
    let wide = assign_ratings(wide)?;
    AnalysisReport::from_dataframe(&wide)
}

/// One row per aggregate: `city, day_date, without_precipitation, average_temp`.
pub fn aggregates_to_dataframe(aggregates: &[CityDayAggregate]) -> PolarsResult<DataFrame> {
    df!(
        COL_CITY => aggregates.iter().map(|a| a.city.as_str()).collect::<Vec<_>>(),
        COL_DAY_DATE => aggregates
            .iter()
            .map(|a| a.day_date.format(DAY_FORMAT).to_string())
            .collect::<Vec<_>>(),
        COL_WITHOUT_PRECIPITATION => aggregates
            .iter()
            .map(|a| a.without_precipitation)
            .collect::<Vec<_>>(),
        COL_AVERAGE_TEMP => aggregates.iter().map(|a| a.average_temp).collect::<Vec<_>>(),
    )
}

/// Orders rows by `average_temp`, then `without_precipitation`, both descending.
/// The sort is stable; remaining ties keep their input order.
pub fn sort_by_favorability(aggregates: LazyFrame) -> LazyFrame {
    debug!("Sorting values by avg temp and precipitation");
    aggregates.sort_by_exprs(
        [col(COL_AVERAGE_TEMP), col(COL_WITHOUT_PRECIPITATION)],
        SortMultipleOptions::default()
            .with_order_descending_multi([true, true])
            .with_maintain_order(true),
    )
}

/// Stacks both metric columns into `(city, day_date, parameter, score)` rows:
/// every `without_precipitation` row first, then every `average_temp` row.
pub fn melt(aggregates: &DataFrame) -> PolarsResult<DataFrame> {
    debug!("Melting precipitation and avg temp columns into parameter/score pairs");
    let aggregates = aggregates
        .clone()
        .lazy()
        .with_column(col(COL_WITHOUT_PRECIPITATION).cast(DataType::Float64))
        .collect()?;
    aggregates.unpivot2(UnpivotArgsIR {
        on: vec![COL_WITHOUT_PRECIPITATION.into(), COL_AVERAGE_TEMP.into()],
        index: vec![COL_CITY.into(), COL_DAY_DATE.into()],
        variable_name: Some(COL_PARAMETER.into()),
        value_name: Some(COL_SCORE.into()),
    })
}

/// Pivots long rows to one row per (city, parameter) with one column per day.
///
/// Cells sum their scores and missing cells are zero. Rows come out sorted by
/// city, then parameter; day columns ascending. A transient `rating` column
/// holds the dense rank of the city.
pub fn pivot(long: &DataFrame) -> PolarsResult<DataFrame> {
    debug!("Pivoting day rows into columns");
    let wide = pivot_stable(
        long,
        [COL_DAY_DATE],
        Some([COL_CITY, COL_PARAMETER]),
        Some([COL_SCORE]),
        true,
        Some(col(COL_SCORE).sum()),
        None,
    )?;

    let fill_missing: Vec<Expr> = day_columns(&wide)
        .iter()
        .map(|day| col(day.as_str()).fill_null(lit(0.0)))
        .collect();
    wide.lazy()
        .with_columns(fill_missing)
        .sort_by_exprs(
            [col(COL_CITY), col(COL_PARAMETER)],
            SortMultipleOptions::default(),
        )
        .with_column(dense_rank(COL_CITY).alias(COL_RATING))
        .collect()
}

/// Adds `average`: the mean of every day column in the row.
///
/// Both parameter rows are averaged the same way, so the `without_precipitation`
/// row's average is in hours and the `average_temp` row's in degrees.
pub fn compute_row_averages(wide: DataFrame) -> PolarsResult<DataFrame> {
    debug!("Calculating average over date columns");
    let days: Vec<Expr> = day_columns(&wide)
        .iter()
        .map(|day| col(day.as_str()))
        .collect();
    if days.is_empty() {
        return wide
            .lazy()
            .with_column(lit(f64::NAN).alias(COL_AVERAGE))
            .collect();
    }
    wide.lazy()
        .with_column(mean_horizontal(days, false)?.alias(COL_AVERAGE))
        .collect()
}

/// Sets `rating` to the dense rank of the city name, ascending from 1.
pub fn assign_ratings(wide: DataFrame) -> PolarsResult<DataFrame> {
    wide.lazy()
        .with_column(dense_rank(COL_CITY).alias(COL_RATING))
        .collect()
}

/// Dense rank of `column` in ascending order, starting at 1, as `u32`.
pub fn dense_rank(column: &str) -> Expr {
    col(column)
        .rank(
            RankOptions {
                method: RankMethod::Dense,
                descending: false,
            },
            None,
        )
        .cast(DataType::UInt32)
}

/// Names of the per-day columns of a wide frame, in frame order.
pub fn day_columns(wide: &DataFrame) -> Vec<String> {
    wide.get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .filter(|name| ![COL_CITY, COL_PARAMETER, COL_AVERAGE, COL_RATING].contains(name))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::Parameter;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, n).unwrap()
    }

    fn aggregate(city: &str, day_date: NaiveDate, temp: f64, dry: i64) -> CityDayAggregate {
        CityDayAggregate {
            city: city.to_string(),
            day_date,
            without_precipitation: dry,
            average_temp: temp,
        }
    }

    fn two_city_input() -> Vec<CityDayAggregate> {
        vec![
            aggregate("CityA", day(26), 10.0, 5),
            aggregate("CityA", day(27), 12.0, 3),
            aggregate("CityB", day(26), 8.0, 6),
            aggregate("CityB", day(27), 9.0, 2),
        ]
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<String> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sort_descending_temp_then_dry_hours() -> Result<(), PolarsError> {
        let input = vec![
            aggregate("CityB", day(26), 8.0, 6),
            aggregate("CityA", day(26), 10.0, 5),
            aggregate("CityC", day(26), 10.0, 7),
            aggregate("CityA", day(27), 12.0, 3),
        ];
        let sorted = sort_by_favorability(aggregates_to_dataframe(&input)?.lazy()).collect()?;

        assert_eq!(strings(&sorted, COL_CITY), ["CityA", "CityC", "CityA", "CityB"]);
        assert_eq!(
            strings(&sorted, COL_DAY_DATE),
            ["2022-05-27", "2022-05-26", "2022-05-26", "2022-05-26"]
        );
        Ok(())
    }

    #[test]
    fn test_melt_stacks_dry_hours_then_temperatures() -> Result<(), PolarsError> {
        let long = melt(&aggregates_to_dataframe(&two_city_input())?)?;

        assert_eq!(long.height(), 8);
        let parameters = strings(&long, COL_PARAMETER);
        assert!(parameters[..4].iter().all(|p| p == COL_WITHOUT_PRECIPITATION));
        assert!(parameters[4..].iter().all(|p| p == COL_AVERAGE_TEMP));
        let scores = long.column(COL_SCORE)?.f64()?;
        assert_eq!(scores.get(0), Some(5.0));
        assert_eq!(scores.get(4), Some(10.0));
        Ok(())
    }

    #[test]
    fn test_pivot_fills_missing_days_with_zero() -> Result<(), AnalysisError> {
        let input = vec![
            aggregate("CityA", day(26), 10.0, 5),
            aggregate("CityB", day(27), 9.0, 2),
        ];
        let wide = pivot(&melt(&aggregates_to_dataframe(&input)?)?)?;

        assert_eq!(day_columns(&wide), ["2022-05-26", "2022-05-27"]);
        assert_eq!(wide.height(), 4);
        let ratings = wide.column(COL_RATING)?.u32()?;
        assert_eq!(ratings.into_iter().collect::<Vec<_>>(), [Some(1), Some(1), Some(2), Some(2)]);

        let report = AnalysisReport::from_dataframe(&compute_row_averages(wide)?)?;
        assert_eq!(report.score("CityA", Parameter::AverageTemp, day(27)), Some(0.0));
        assert_eq!(report.score("CityB", Parameter::WithoutPrecipitation, day(26)), Some(0.0));
        assert_eq!(report.score("CityB", Parameter::AverageTemp, day(27)), Some(9.0));
        Ok(())
    }

    #[test]
    fn test_pivot_sums_duplicate_cells() -> Result<(), PolarsError> {
        let long = df!(
            COL_CITY => ["CityA", "CityA"],
            COL_DAY_DATE => ["2022-05-26", "2022-05-26"],
            COL_PARAMETER => [COL_AVERAGE_TEMP, COL_AVERAGE_TEMP],
            COL_SCORE => [1.5, 2.0],
        )?;
        let wide = pivot(&long)?;

        assert_eq!(wide.height(), 1);
        assert_eq!(wide.column("2022-05-26")?.f64()?.get(0), Some(3.5));
        Ok(())
    }

    #[test]
    fn test_two_city_two_day_report() -> Result<(), AnalysisError> {
        let report = analyze(&two_city_input())?;

        assert_eq!(report.days, vec![day(26), day(27)]);
        assert_eq!(report.rows.len(), 4);
        let layout: Vec<(&str, Parameter, u32)> = report
            .rows
            .iter()
            .map(|r| (r.city.as_str(), r.parameter, r.rating))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("CityA", Parameter::AverageTemp, 1),
                ("CityA", Parameter::WithoutPrecipitation, 1),
                ("CityB", Parameter::AverageTemp, 2),
                ("CityB", Parameter::WithoutPrecipitation, 2),
            ]
        );
        for row in &report.rows {
            let mean = row.scores.iter().sum::<f64>() / row.scores.len() as f64;
            assert!((row.average - mean).abs() < 1e-9);
        }
        assert_eq!(report.row("CityA", Parameter::AverageTemp).map(|r| r.average), Some(11.0));
        assert_eq!(report.row("CityA", Parameter::WithoutPrecipitation).map(|r| r.average), Some(4.0));
        assert_eq!(report.row("CityB", Parameter::AverageTemp).map(|r| r.average), Some(8.5));
        assert_eq!(report.best_city(), Some("CityA"));
        Ok(())
    }

    #[test]
    fn test_nonzero_temperature_cells_match_input_keys() -> Result<(), AnalysisError> {
        let input = vec![
            aggregate("Roma", day(26), 21.0, 8),
            aggregate("Cairo", day(27), 33.0, 11),
            aggregate("Roma", day(28), 19.5, 4),
        ];
        let report = analyze(&input)?;

        let mut cells = BTreeSet::new();
        for row in report.rows.iter().filter(|r| r.parameter == Parameter::AverageTemp) {
            for (day, score) in report.days.iter().zip(&row.scores) {
                if *score != 0.0 {
                    cells.insert((row.city.clone(), *day));
                }
            }
        }
        let expected: BTreeSet<(String, NaiveDate)> =
            input.iter().map(|a| (a.city.clone(), a.day_date)).collect();
        assert_eq!(cells, expected);
        Ok(())
    }

    #[test]
    fn test_ratings_are_dense_and_alphabetical() -> Result<(), AnalysisError> {
        let input = vec![
            aggregate("Warszawa", day(26), 15.0, 6),
            aggregate("Abudhabi", day(26), 34.0, 11),
            aggregate("Moscow", day(26), 12.0, 2),
            aggregate("Moscow", day(27), 13.0, 4),
        ];
        let report = analyze(&input)?;

        let ratings: Vec<(&str, u32)> = report
            .rows
            .iter()
            .map(|r| (r.city.as_str(), r.rating))
            .collect();
        assert_eq!(
            ratings,
            vec![
                ("Abudhabi", 1),
                ("Abudhabi", 1),
                ("Moscow", 2),
                ("Moscow", 2),
                ("Warszawa", 3),
                ("Warszawa", 3),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_dense_rank_ignores_duplicates() -> Result<(), PolarsError> {
        let ranked = df!(COL_CITY => ["b", "a", "b", "c"])?
            .lazy()
            .select([dense_rank(COL_CITY)])
            .collect()?;
        let ranks: Vec<Option<u32>> = ranked.column(COL_CITY)?.u32()?.into_iter().collect();
        assert_eq!(ranks, [Some(2), Some(1), Some(2), Some(3)]);
        Ok(())
    }

    #[test]
    fn test_empty_input_gives_empty_report() -> Result<(), AnalysisError> {
        let report = analyze(&[])?;
        assert!(report.is_empty());
        assert!(report.days.is_empty());
        assert_eq!(report.best_city(), None);
        Ok(())
    }
}
