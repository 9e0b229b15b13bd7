use crate::parsing::error::ParseError;
use crate::parsing::extractor::extract_hourly_records;
use crate::types::payload::RawCityPayload;
use crate::types::records::HourlyRecord;
use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

pub const DEFAULT_PARSE_WORKERS: usize = 4;
pub const DEFAULT_CHUNK_SIZE: usize = 1;

/// Runs the hourly extractor over many payloads on a dedicated, bounded thread pool.
///
/// The pool is private to each [`ParallelParser::parse`] call, so parsing never
/// competes with the async runtime's worker threads. Workers share no state:
/// each one receives a payload and returns an independent vector of records.
#[derive(Debug, Clone, Copy)]
pub struct ParallelParser {
    workers: usize,
    chunk_size: usize,
}

impl Default for ParallelParser {
    fn default() -> Self {
        Self::new(DEFAULT_PARSE_WORKERS, DEFAULT_CHUNK_SIZE)
    }
}

impl ParallelParser {
    /// `workers` is the pool size, `chunk_size` the minimum number of payloads a
    /// worker takes per split. Zero values fall back to one.
    pub fn new(workers: usize, chunk_size: usize) -> Self {
        Self {
            workers: workers.max(1),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Parses every payload and flattens the per-city results.
    ///
    /// Records keep their per-city order, and cities appear in input order. The
    /// first schema error aborts the whole parse; no partial result is returned.
    pub fn parse(&self, payloads: &[RawCityPayload]) -> Result<Vec<HourlyRecord>, ParseError> {
        debug!("Start calculation");
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("forecast-parser-{}", i))
            .build()?;

        let per_city = pool.install(|| {
            payloads
                .par_iter()
                .with_min_len(self.chunk_size)
                .map(extract_hourly_records)
                .collect::<Result<Vec<Vec<HourlyRecord>>, ParseError>>()
        })?;
        debug!("End calculation");

        Ok(per_city.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::extractor::tests::payload;
    use serde_json::json;

    #[test]
    fn test_parse_flattens_all_cities() -> Result<(), ParseError> {
        let payloads = vec![
            payload("Moscow", &[(9, 0, 10.0, "clear"), (10, 3600, 11.0, "rain")]),
            payload("Paris", &[(8, 0, 15.0, "clear"), (12, 0, 16.0, "cloudy")]),
            payload("Berlin", &[]),
        ];

        let records = ParallelParser::default().parse(&payloads)?;

        assert_eq!(records.len(), 3);
        let moscow: Vec<u32> = records
            .iter()
            .filter(|r| r.city == "Moscow")
            .map(|r| r.hour)
            .collect();
        assert_eq!(moscow, vec![9, 10]);
        assert!(records.iter().any(|r| r.city == "Paris" && r.hour == 12));
        Ok(())
    }

    #[test]
    fn test_single_bad_payload_aborts_parse() {
        let payloads = vec![
            payload("Moscow", &[(9, 0, 10.0, "clear")]),
            RawCityPayload::new(json!({"geo_object": {"province": {"name": "Rome"}}})),
        ];

        let result = ParallelParser::new(2, 1).parse(&payloads);
        assert!(matches!(result, Err(ParseError::Schema { city, .. }) if city == "Rome"));
    }

    #[test]
    fn test_zero_sizes_fall_back_to_one() -> Result<(), ParseError> {
        let parser = ParallelParser::new(0, 0);
        assert_eq!(parser.workers, 1);
        assert_eq!(parser.chunk_size, 1);
        assert!(parser.parse(&[])?.is_empty());
        Ok(())
    }
}
