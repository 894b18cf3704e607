use async_trait::async_trait;

use crate::{Interval, ProviderError, Series};

/// Source of OHLC price history.
///
/// `AlphaVantageClient` implements this against the FX intraday endpoint and
/// `Retrying` wraps any provider with a bounded retry policy. The cycle driver
/// is the only caller; it never retries on its own.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Fetch the latest series for `symbol`, oldest bar first.
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<Series, ProviderError>;
}

#[async_trait]
impl<P: PriceSeriesProvider + ?Sized> PriceSeriesProvider for std::sync::Arc<P> {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<Series, ProviderError> {
        (**self).fetch(symbol, interval).await
    }
}
