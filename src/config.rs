//! Pipeline settings and the city registry.

use crate::error::ForecastError;
use crate::fetching::fetcher::default_fetch_concurrency;
use crate::parsing::parser::{DEFAULT_CHUNK_SIZE, DEFAULT_PARSE_WORKERS};
use bon::Builder;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const FORECAST_BASE_URL: &str = "https://code.s3.yandex.net/async-module";

/// City keys queried when no registry file is supplied, with their URL slug.
const DEFAULT_CITIES: [(&str, &str); 15] = [
    ("MOSCOW", "moscow"),
    ("PARIS", "paris"),
    ("LONDON", "london"),
    ("BERLIN", "berlin"),
    ("BEIJING", "beijing"),
    ("KAZAN", "kazan"),
    ("SPETERSBURG", "spetersburg"),
    ("VOLGOGRAD", "volgograd"),
    ("NOVOSIBIRSK", "novosibirsk"),
    ("KALININGRAD", "kaliningrad"),
    ("ABUDHABI", "abudhabi"),
    ("WARSZAWA", "warszawa"),
    ("BUCHAREST", "bucharest"),
    ("ROMA", "roma"),
    ("CAIRO", "cairo"),
];

/// Tuning knobs for one pipeline run.
///
/// ```rust
/// use trip_forecast::PipelineSettings;
///
/// let settings = PipelineSettings::builder()
///     .parse_workers(2)
///     .artifact_path("analyze.csv".into())
///     .build();
/// assert_eq!(settings.chunk_size, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct PipelineSettings {
    /// Maximum number of forecast requests in flight.
    #[builder(default = default_fetch_concurrency())]
    pub fetch_concurrency: usize,
    /// Size of the parser thread pool.
    #[builder(default = DEFAULT_PARSE_WORKERS)]
    pub parse_workers: usize,
    /// Minimum number of payloads a parser worker handles per split.
    #[builder(default = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Where the pre-aggregation table is written. `None` skips the artifact.
    pub artifact_path: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One city key and the URL its forecast is served from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityEntry {
    pub key: String,
    pub url: String,
}

/// Ordered mapping of city keys to forecast URLs.
///
/// The registry's order is the order in which cities are fetched. A registry
/// file is TOML with one `[[city]]` table per entry:
///
/// ```toml
/// [[city]]
/// key = "MOSCOW"
/// url = "https://code.s3.yandex.net/async-module/moscow-response.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityRegistry {
    #[serde(rename = "city", default)]
    entries: Vec<CityEntry>,
}

impl Default for CityRegistry {
    fn default() -> Self {
        let entries = DEFAULT_CITIES
            .iter()
            .map(|(key, slug)| CityEntry {
                key: key.to_string(),
                url: format!("{}/{}-response.json", FORECAST_BASE_URL, slug),
            })
            .collect();
        Self { entries }
    }
}

impl CityRegistry {
    pub fn new(entries: Vec<CityEntry>) -> Self {
        Self { entries }
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Reads a registry file.
    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let toml = fs::read_to_string(path)
            .map_err(|e| ForecastError::RegistryRead(path.to_path_buf(), e))?;
        Self::from_toml_str(&toml).map_err(|e| ForecastError::RegistryParse(path.to_path_buf(), e))
    }

    /// City keys in registry order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn url_for(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
