use async_trait::async_trait;

use crate::{Alert, Result};

/// Delivery target for alerts produced by a strategy.
///
/// The cycle driver treats publishing as fire-and-forget: an error is logged
/// and never affects other sinks or other symbols.
#[async_trait]
pub trait SignalSink: Send + Sync {
    /// Short label used in logs, e.g. `telegram:12345`.
    fn describe(&self) -> String;

    async fn publish(&self, symbol: &str, alert: &Alert) -> Result<()>;
}
