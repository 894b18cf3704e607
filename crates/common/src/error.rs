use thiserror::Error;

/// Failure fetching a price series from the upstream provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider rejected request: {0}")]
    Rejected(String),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("invalid symbol '{0}': expected six letters such as EURUSD")]
    InvalidSymbol(String),

    #[error("provider API key is not configured")]
    MissingApiKey,
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Http(_)
                | ProviderError::Timeout
                | ProviderError::RateLimited(_)
                | ProviderError::Malformed(_)
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

impl From<SeriesError> for ProviderError {
    fn from(e: SeriesError) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

/// A bar sequence that violates the `Series` invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} does not have a later timestamp than its predecessor")]
    NonIncreasingTimestamp { index: usize },

    #[error("bar {index} has invalid {field} price {value}")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Subscription store error: {0}")]
    Store(String),

    #[error("Signal delivery error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
