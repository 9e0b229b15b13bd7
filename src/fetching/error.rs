use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unknown city key '{0}'")]
    UnknownCity(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response body from {url} is not valid JSON")]
    InvalidBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
