#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{
    Alert, Error, Interval, PriceBar, PriceSeriesProvider, ProviderError, Result, RsiWatch,
    Series, SignalSink,
};
use strategy::Strategy;

pub fn series(len: usize) -> Series {
    let bars = (0..len)
        .map(|i| {
            let c = 1.1 + i as f64 * 0.0001;
            PriceBar {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
                open: c,
                high: c + 0.0002,
                low: c - 0.0002,
                close: c,
            }
        })
        .collect();
    Series::new(bars).unwrap()
}

/// Serves canned series per symbol; unknown symbols time out.
#[derive(Default)]
pub struct FakeProvider {
    series: HashMap<String, usize>,
    failing: HashMap<String, fn() -> ProviderError>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_series(mut self, symbol: &str, len: usize) -> Self {
        self.series.insert(symbol.to_string(), len);
        self
    }

    pub fn failing(mut self, symbol: &str, err: fn() -> ProviderError) -> Self {
        self.failing.insert(symbol.to_string(), err);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSeriesProvider for FakeProvider {
    async fn fetch(&self, symbol: &str, _interval: Interval) -> Result<Series, ProviderError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if let Some(err) = self.failing.get(symbol) {
            return Err(err());
        }
        match self.series.get(symbol) {
            Some(&len) => Ok(series(len)),
            None => Err(ProviderError::Timeout),
        }
    }
}

/// Alerts on every series, reporting the last close as the RSI reading.
pub struct AlwaysAlert;

impl Strategy for AlwaysAlert {
    fn name(&self) -> &str {
        "always"
    }

    fn min_history(&self) -> usize {
        5
    }

    fn evaluate(&self, series: &Series) -> Option<Alert> {
        let close = series.last()?.close;
        Some(Alert::Watch(RsiWatch::Oversold { rsi: close }))
    }
}

/// Records everything it is asked to publish.
#[derive(Default)]
pub struct RecordingSink {
    pub received: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn symbols(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    fn describe(&self) -> String {
        "recording".into()
    }

    async fn publish(&self, symbol: &str, _alert: &Alert) -> Result<()> {
        self.received.lock().unwrap().push(symbol.to_string());
        Ok(())
    }
}

/// Always fails to deliver.
pub struct BrokenSink;

#[async_trait]
impl SignalSink for BrokenSink {
    fn describe(&self) -> String {
        "broken".into()
    }

    async fn publish(&self, _symbol: &str, _alert: &Alert) -> Result<()> {
        Err(Error::Sink("chat not found".into()))
    }
}
