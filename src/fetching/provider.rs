//! Sources of raw forecast payloads.
//!
//! [`ForecastProvider`] is the seam between the pipeline and the upstream weather
//! service. [`HttpForecastProvider`] talks to the real service through the city
//! registry; [`InMemoryProvider`] serves fixed payloads for offline runs and tests.

use crate::config::CityRegistry;
use crate::fetching::error::FetchError;
use crate::types::payload::RawCityPayload;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

/// Retrieves the raw forecast payload for one city key.
///
/// Implementations must tolerate concurrent calls: the fetcher keeps several
/// requests in flight against the same provider.
pub trait ForecastProvider: Send + Sync {
    /// Fetches the payload for `city`.
    ///
    /// # Errors
    ///
    /// [`FetchError::UnknownCity`] if the key is not known to the provider, or a
    /// transport variant if the upstream request fails.
    fn fetch(&self, city: &str) -> impl Future<Output = Result<RawCityPayload, FetchError>> + Send;
}

/// Fetches forecasts over HTTP, resolving each city key to its URL via a [`CityRegistry`].
pub struct HttpForecastProvider {
    registry: CityRegistry,
    client: Client,
}

impl HttpForecastProvider {
    pub fn new(registry: CityRegistry) -> Self {
        Self {
            registry,
            client: Client::new(),
        }
    }

    pub fn registry(&self) -> &CityRegistry {
        &self.registry
    }
}

impl ForecastProvider for HttpForecastProvider {
    async fn fetch(&self, city: &str) -> Result<RawCityPayload, FetchError> {
        let url = self
            .registry
            .url_for(city)
            .ok_or_else(|| FetchError::UnknownCity(city.to_string()))?;
        debug!("Requesting forecast for {} from {}", city, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidBody {
                url: url.to_string(),
                source: e,
            })?;
        Ok(RawCityPayload::new(body))
    }
}

/// Serves pre-loaded payloads keyed by city.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    payloads: HashMap<String, RawCityPayload>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, city: impl Into<String>, payload: RawCityPayload) -> Self {
        self.payloads.insert(city.into(), payload);
        self
    }
}

impl ForecastProvider for InMemoryProvider {
    async fn fetch(&self, city: &str) -> Result<RawCityPayload, FetchError> {
        self.payloads
            .get(city)
            .cloned()
            .ok_or_else(|| FetchError::UnknownCity(city.to_string()))
    }
}
