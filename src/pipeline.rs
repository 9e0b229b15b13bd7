//! End-to-end run: fetch, parse, aggregate, rank.

use crate::analysis::aggregator::Aggregator;
use crate::analysis::ranker;
use crate::analysis::report::AnalysisReport;
use crate::config::{CityRegistry, PipelineSettings};
use crate::error::ForecastError;
use crate::fetching::fetcher::ConcurrentFetcher;
use crate::fetching::provider::{ForecastProvider, HttpForecastProvider};
use crate::parsing::parser::ParallelParser;
use bon::Builder;
use log::info;
use tokio::task;

/// A configured forecast comparison.
///
/// Stages run strictly one after another; each consumes the complete output of
/// the previous one. Any stage failure aborts the run.
///
/// ```rust,no_run
/// use trip_forecast::{CityRegistry, ForecastError, ForecastPipeline, PipelineSettings};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ForecastError> {
/// let settings = PipelineSettings::builder()
///     .artifact_path("analyze.csv".into())
///     .build();
/// let pipeline = ForecastPipeline::from_registry(CityRegistry::default(), settings);
/// let report = pipeline.run().await?;
/// println!("{}", report.to_dataframe().map_err(trip_forecast::AnalysisError::from)?);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct ForecastPipeline<P: ForecastProvider> {
    provider: P,
    /// City keys, fetched in this order.
    #[builder(into)]
    cities: Vec<String>,
    #[builder(default)]
    settings: PipelineSettings,
}

impl ForecastPipeline<HttpForecastProvider> {
    /// Queries every city of `registry` over HTTP.
    pub fn from_registry(registry: CityRegistry, settings: PipelineSettings) -> Self {
        let cities = registry.keys().into_iter().map(String::from).collect();
        Self {
            provider: HttpForecastProvider::new(registry),
            cities,
            settings,
        }
    }
}

impl<P: ForecastProvider> ForecastPipeline<P> {
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<AnalysisReport, ForecastError> {
        let fetcher = ConcurrentFetcher::new(self.settings.fetch_concurrency);
        let payloads = fetcher.fetch_all(&self.provider, self.cities.as_slice()).await?;
        info!("Fetched {} forecast payloads", payloads.len());

        let parser = ParallelParser::new(self.settings.parse_workers, self.settings.chunk_size);
        let records = task::spawn_blocking(move || parser.parse(&payloads)).await??;
        info!("Extracted {} daytime hourly records", records.len());

        let aggregator = Aggregator::new(self.settings.artifact_path.clone());
        let aggregates = task::spawn_blocking(move || aggregator.aggregate(&records)).await??;
        info!("Aggregated {} city-day rows", aggregates.len());

        let report = task::spawn_blocking(move || ranker::analyze(&aggregates)).await??;
        info!("Ranked {} cities", report.cities().len());
        Ok(report)
    }
}
