use crate::fetching::error::FetchError;
use crate::fetching::provider::ForecastProvider;
use crate::types::payload::RawCityPayload;
use futures_util::{stream, StreamExt, TryStreamExt};
use log::info;
use std::thread;

/// Upper bound on the default number of requests in flight.
const MAX_DEFAULT_IN_FLIGHT: usize = 32;

/// Default concurrency: the number of available cores plus four, capped at 32.
pub fn default_fetch_concurrency() -> usize {
    let cores = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores + 4).min(MAX_DEFAULT_IN_FLIGHT)
}

/// Fetches the payloads of many cities with a bounded number of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentFetcher {
    max_in_flight: usize,
}

impl Default for ConcurrentFetcher {
    fn default() -> Self {
        Self::new(default_fetch_concurrency())
    }
}

impl ConcurrentFetcher {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Fetches every city, returning payloads in the same order as `cities`.
    ///
    /// Requests complete in any order but results are re-aligned with the input.
    /// The first failing city aborts the fetch; outstanding requests are dropped
    /// and no partial result is returned.
    pub async fn fetch_all<P, S>(
        &self,
        provider: &P,
        cities: &[S],
    ) -> Result<Vec<RawCityPayload>, FetchError>
    where
        P: ForecastProvider,
        S: AsRef<str>,
    {
        info!("Start sending requests");
        stream::iter(cities)
            .map(|city| provider.fetch(city.as_ref()))
            .buffered(self.max_in_flight)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetching::provider::InMemoryProvider;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers with the city key after a delay that shrinks with the key's position,
    /// so later cities finish first.
    struct SlowProvider {
        cities: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ForecastProvider for SlowProvider {
        async fn fetch(&self, city: &str) -> Result<RawCityPayload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let position = self
                .cities
                .iter()
                .position(|c| *c == city)
                .ok_or_else(|| FetchError::UnknownCity(city.to_string()))?;
            let delay = (self.cities.len() - position) as u64 * 10;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(RawCityPayload::new(json!({ "city": city })))
        }
    }

    #[tokio::test]
    async fn test_results_follow_input_order() -> Result<(), FetchError> {
        let cities = vec!["MOSCOW", "PARIS", "LONDON", "BERLIN"];
        let provider = SlowProvider {
            cities: cities.clone(),
            calls: AtomicUsize::new(0),
        };

        let payloads = ConcurrentFetcher::new(4).fetch_all(&provider, cities.as_slice()).await?;

        let returned: Vec<&str> = payloads
            .iter()
            .filter_map(|p| p.as_value()["city"].as_str())
            .collect();
        assert_eq!(returned, cities);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_city_aborts_fetch() {
        let provider = InMemoryProvider::new()
            .with_payload("MOSCOW", RawCityPayload::new(json!({})));

        let result = ConcurrentFetcher::default()
            .fetch_all(&provider, &["MOSCOW", "MOSCOK"])
            .await;

        assert!(matches!(result, Err(FetchError::UnknownCity(key)) if key == "MOSCOK"));
    }

    #[test]
    fn test_default_concurrency_is_bounded() {
        let n = default_fetch_concurrency();
        assert!((5..=MAX_DEFAULT_IN_FLIGHT).contains(&n));
    }
}
