//! Compare hourly weather forecasts across cities and rank them for a trip.
//!
//! A run fetches one forecast payload per city, keeps the daytime hours
//! (09:00 to 19:00 UTC), aggregates them into per-day metrics with Polars and
//! reshapes the metrics into a wide report with one row per city and metric.

mod analysis;
mod config;
mod error;
mod fetching;
mod parsing;
mod pipeline;
mod types;

pub use config::{CityEntry, CityRegistry, PipelineSettings};
pub use error::ForecastError;
pub use pipeline::ForecastPipeline;

pub use fetching::error::FetchError;
pub use fetching::fetcher::{default_fetch_concurrency, ConcurrentFetcher};
pub use fetching::provider::{ForecastProvider, HttpForecastProvider, InMemoryProvider};

pub use parsing::error::ParseError;
pub use parsing::extractor::{extract_hourly_records, to_datetime, END_HOUR, START_HOUR};
pub use parsing::parser::{ParallelParser, DEFAULT_CHUNK_SIZE, DEFAULT_PARSE_WORKERS};

pub use analysis::aggregator::{aggregate_frame, records_to_dataframe, save_to_csv, Aggregator};
pub use analysis::error::AnalysisError;
pub use analysis::ranker::{
    aggregates_to_dataframe, analyze, assign_ratings, compute_row_averages, day_columns,
    dense_rank, melt, pivot, sort_by_favorability, COL_SCORE,
};
pub use analysis::report::{AnalysisReport, AnalysisRow, Parameter};

pub use types::condition::Condition;
pub use types::payload::RawCityPayload;
pub use types::records::{CityDayAggregate, HourlyRecord};
