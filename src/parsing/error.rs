use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed forecast payload for city '{city}'")]
    Schema {
        city: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Forecast payload for city '{0}' contains no forecast days")]
    MissingForecastDay(String),

    #[error("Timestamp {0} is outside the representable date range")]
    TimestampOutOfRange(i64),

    #[error("Failed to build parser thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
