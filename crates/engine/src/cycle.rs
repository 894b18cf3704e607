use std::sync::Arc;

use chrono::Utc;
use futures_util::{stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use common::{
    Alert, CycleSummary, Interval, PriceSeriesProvider, ProviderError, SignalSink,
};
use strategy::Strategy;

/// What happened to one symbol during a cycle.
#[derive(Debug)]
pub enum SymbolOutcome {
    Alerted(Alert),
    Quiet,
    Failed(ProviderError),
    /// Shutdown was requested before the symbol was reached.
    Cancelled,
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

/// Per-symbol outcomes of one cycle, in the order the symbols were given.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub symbols: Vec<SymbolReport>,
}

impl CycleReport {
    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.symbols
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.outcome)
    }

    pub fn alerts(&self) -> impl Iterator<Item = (&str, &Alert)> {
        self.symbols.iter().filter_map(|r| match &r.outcome {
            SymbolOutcome::Alerted(a) => Some((r.symbol.as_str(), a)),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProviderError)> {
        self.symbols.iter().filter_map(|r| match &r.outcome {
            SymbolOutcome::Failed(e) => Some((r.symbol.as_str(), e)),
            _ => None,
        })
    }

    pub fn was_cancelled(&self) -> bool {
        self.symbols
            .iter()
            .any(|r| matches!(r.outcome, SymbolOutcome::Cancelled))
    }

    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            finished_at: Utc::now(),
            symbols: self.symbols.len(),
            alerts: self.alerts().count(),
            failures: self.failures().map(|(s, _)| s.to_string()).collect(),
            cancelled: self.was_cancelled(),
        }
    }
}

/// Runs one evaluation pass over a list of symbols.
///
/// A failing symbol never stops the others, and a failing sink never stops
/// delivery to the remaining sinks.
pub struct CycleDriver {
    provider: Arc<dyn PriceSeriesProvider>,
    strategy: Arc<dyn Strategy>,
    concurrency: usize,
}

impl CycleDriver {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            provider,
            strategy,
            concurrency: 1,
        }
    }

    /// Number of symbols fetched at once. Values below 1 are treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn strategy(&self) -> &Arc<dyn Strategy> {
        &self.strategy
    }

    pub async fn run(
        &self,
        symbols: &[String],
        interval: Interval,
        sinks: &[Arc<dyn SignalSink>],
        shutdown: &watch::Receiver<bool>,
    ) -> CycleReport {
        info!(
            symbols = symbols.len(),
            sinks = sinks.len(),
            %interval,
            strategy = self.strategy.name(),
            "Evaluation cycle starting"
        );

        // Futures own their inputs; the shutdown flag is read lazily as each
        // symbol is pulled from the stream.
        let mut pending = stream::iter(symbols.iter().cloned().enumerate())
            .map(|(idx, symbol)| {
                let provider = Arc::clone(&self.provider);
                let strategy = Arc::clone(&self.strategy);
                let cancelled = *shutdown.borrow();
                async move {
                    let outcome = if cancelled {
                        SymbolOutcome::Cancelled
                    } else {
                        evaluate_symbol(provider.as_ref(), strategy.as_ref(), &symbol, interval)
                            .await
                    };
                    (idx, symbol, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut done = Vec::with_capacity(symbols.len());
        while let Some((idx, symbol, outcome)) = pending.next().await {
            if let SymbolOutcome::Alerted(alert) = &outcome {
                publish_all(sinks, &symbol, alert).await;
            }
            done.push((idx, SymbolReport { symbol, outcome }));
        }
        done.sort_by_key(|(idx, _)| *idx);

        let report = CycleReport {
            symbols: done.into_iter().map(|(_, r)| r).collect(),
        };
        let failed: Vec<&str> = report.failures().map(|(s, _)| s).collect();
        info!(
            alerts = report.alerts().count(),
            failures = ?failed,
            cancelled = report.was_cancelled(),
            "Evaluation cycle finished"
        );
        report
    }
}

async fn evaluate_symbol(
    provider: &dyn PriceSeriesProvider,
    strategy: &dyn Strategy,
    symbol: &str,
    interval: Interval,
) -> SymbolOutcome {
    let series = match provider.fetch(symbol, interval).await {
        Ok(series) => series,
        Err(e) => {
            warn!(symbol, error = %e, "Price fetch failed — skipping symbol");
            return SymbolOutcome::Failed(e);
        }
    };

    debug!(symbol, bars = series.len(), "Series received");
    if series.len() < strategy.min_history() {
        debug!(
            symbol,
            bars = series.len(),
            needed = strategy.min_history(),
            "Not enough history"
        );
        return SymbolOutcome::Quiet;
    }

    match strategy.evaluate(&series) {
        Some(alert) => {
            info!(symbol, direction = %alert.direction(), "Alert raised");
            SymbolOutcome::Alerted(alert)
        }
        None => SymbolOutcome::Quiet,
    }
}

async fn publish_all(sinks: &[Arc<dyn SignalSink>], symbol: &str, alert: &Alert) {
    for sink in sinks {
        if let Err(e) = sink.publish(symbol, alert).await {
            warn!(sink = %sink.describe(), symbol, error = %e, "Alert delivery failed");
        }
    }
}
