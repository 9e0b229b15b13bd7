use log::info;
use std::env;
use std::path::PathBuf;
use trip_forecast::{AnalysisError, CityRegistry, ForecastError, ForecastPipeline, PipelineSettings};

const REGISTRY_ENV: &str = "TRIP_FORECAST_CITIES";
const ARTIFACT_FILE: &str = "analyze.csv";

#[tokio::main]
async fn main() -> Result<(), ForecastError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    configure_polars_display();

    let registry = match env::var_os(REGISTRY_ENV) {
        Some(path) => CityRegistry::load(&PathBuf::from(path))?,
        None => CityRegistry::default(),
    };
    info!("Comparing forecasts for {} cities", registry.len());

    let settings = PipelineSettings::builder()
        .artifact_path(PathBuf::from(ARTIFACT_FILE))
        .build();
    let report = ForecastPipeline::from_registry(registry, settings)
        .run()
        .await?;

    let table = report.to_dataframe().map_err(AnalysisError::from)?;
    println!("{}", table);
    match report.best_city() {
        Some(city) => println!("Most favorable city for the trip: {}", city),
        None => println!("No city had a dry daytime hour in the forecast period."),
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column and every row
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "-1");
}
