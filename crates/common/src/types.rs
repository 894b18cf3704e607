use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One OHLC candle as returned by the price provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// An immutable, validated price series, oldest bar first.
///
/// Timestamps are strictly increasing and every price is finite and positive.
/// A fresh fetch always produces a new `Series`; nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    bars: Vec<PriceBar>,
}

impl Series {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            for (field, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SeriesError::InvalidPrice { index, field, value });
                }
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp { index });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Candle interval supported by the FX intraday endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1min")]
    OneMinute,
    #[default]
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "60min")]
    SixtyMinutes,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1min",
            Interval::FiveMinutes => "5min",
            Interval::FifteenMinutes => "15min",
            Interval::ThirtyMinutes => "30min",
            Interval::SixtyMinutes => "60min",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" => Ok(Interval::OneMinute),
            "5min" => Ok(Interval::FiveMinutes),
            "15min" => Ok(Interval::FifteenMinutes),
            "30min" => Ok(Interval::ThirtyMinutes),
            "60min" => Ok(Interval::SixtyMinutes),
            other => Err(format!("unsupported interval '{other}'")),
        }
    }
}

/// Direction of a suggested trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Unrounded indicator readings at the bar that triggered a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerReadings {
    pub close: f64,
    pub rsi: f64,
    pub macd_hist_prev: f64,
    pub macd_hist: f64,
    pub ema200: f64,
    pub atr: f64,
}

/// A trade signal with entry, stop and target levels.
///
/// Level and indicator fields are rounded for display (5 decimals for prices,
/// 2 for RSI and the ratio); `raw` keeps the exact readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// `None` when the stop sits exactly on the entry (zero ATR).
    pub risk_reward_ratio: Option<f64>,
    pub rsi: f64,
    pub macd_hist_prev: f64,
    pub macd_hist: f64,
    pub ema200: f64,
    pub atr: f64,
    pub raw: TriggerReadings,
}

/// Result of the RSI-only watch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RsiWatch {
    CrossUp { from: f64, to: f64 },
    CrossDown { from: f64, to: f64 },
    Oversold { rsi: f64 },
    Overbought { rsi: f64 },
}

impl RsiWatch {
    pub fn direction(&self) -> Direction {
        match self {
            RsiWatch::CrossUp { .. } | RsiWatch::Oversold { .. } => Direction::Buy,
            RsiWatch::CrossDown { .. } | RsiWatch::Overbought { .. } => Direction::Sell,
        }
    }
}

impl std::fmt::Display for RsiWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RsiWatch::CrossUp { from, to } => {
                write!(f, "RSI cross-up from {from:.1} to {to:.1} -> possible BUY")
            }
            RsiWatch::CrossDown { from, to } => {
                write!(f, "RSI cross-down from {from:.1} to {to:.1} -> possible SELL")
            }
            RsiWatch::Oversold { rsi } => write!(f, "RSI {rsi:.1} (oversold) -> watch for BUY"),
            RsiWatch::Overbought { rsi } => {
                write!(f, "RSI {rsi:.1} (overbought) -> watch for SELL")
            }
        }
    }
}

/// Anything a strategy hands to the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Alert {
    Trade(Signal),
    Watch(RsiWatch),
}

impl Alert {
    pub fn direction(&self) -> Direction {
        match self {
            Alert::Trade(signal) => signal.direction,
            Alert::Watch(watch) => watch.direction(),
        }
    }
}

/// Persisted subscriber and pair list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriptions {
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,
    #[serde(default)]
    pub interval: Interval,
    #[serde(default)]
    pub chats: Vec<i64>,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            interval: Interval::default(),
            chats: Vec::new(),
        }
    }
}

fn default_pairs() -> Vec<String> {
    ["EURUSD", "GBPUSD", "USDJPY"].map(String::from).to_vec()
}

/// Current state of the polling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Running => write!(f, "running"),
            EngineState::Paused => write!(f, "paused"),
        }
    }
}

/// Commands sent to the engine via the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    CheckNow,
    Pause,
    Resume,
}

/// Outcome counts of the most recent evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub finished_at: DateTime<Utc>,
    pub symbols: usize,
    pub alerts: usize,
    pub failures: Vec<String>,
    pub cancelled: bool,
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(minute: i64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc.timestamp_opt(minute * 60, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn series_accepts_ascending_bars() {
        let series = Series::new(vec![bar(0, 1.1), bar(1, 1.2), bar(2, 1.3)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.1, 1.2, 1.3]);
    }

    #[test]
    fn series_rejects_duplicate_timestamps() {
        let err = Series::new(vec![bar(0, 1.1), bar(0, 1.2)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonIncreasingTimestamp { index: 1 }));
    }

    #[test]
    fn series_rejects_non_positive_price() {
        let mut bad = bar(1, 1.2);
        bad.low = 0.0;
        let err = Series::new(vec![bar(0, 1.1), bad]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidPrice { index: 1, field: "low", .. }));
    }

    #[test]
    fn series_rejects_nan_price() {
        let err = Series::new(vec![bar(0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidPrice { index: 0, .. }));
    }

    #[test]
    fn interval_parses_and_prints() {
        assert_eq!("15MIN".parse::<Interval>().unwrap(), Interval::FifteenMinutes);
        assert_eq!(Interval::SixtyMinutes.to_string(), "60min");
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn subscriptions_fill_missing_fields_with_defaults() {
        let subs: Subscriptions = serde_json::from_str(r#"{"chats": [42]}"#).unwrap();
        assert_eq!(subs.pairs, vec!["EURUSD", "GBPUSD", "USDJPY"]);
        assert_eq!(subs.interval, Interval::FiveMinutes);
        assert_eq!(subs.chats, vec![42]);
    }

    #[test]
    fn rounding_uses_requested_places() {
        assert_eq!(round_to(1.234_567_8, 5), 1.23457);
        assert_eq!(round_to(33.333, 2), 33.33);
        assert_eq!(round_to(-0.000_004, 5), -0.0);
    }

    #[test]
    fn watch_direction_follows_kind() {
        assert_eq!(RsiWatch::Oversold { rsi: 20.0 }.direction(), Direction::Buy);
        assert_eq!(
            RsiWatch::CrossDown { from: 71.0, to: 69.0 }.direction(),
            Direction::Sell
        );
    }
}
