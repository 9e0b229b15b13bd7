use crate::analysis::error::AnalysisError;
use crate::fetching::error::FetchError;
use crate::parsing::error::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to read city registry '{0}'")]
    RegistryRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse city registry '{0}'")]
    RegistryParse(PathBuf, #[source] toml::de::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
