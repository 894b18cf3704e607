pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod wilder;

pub use atr::{atr, true_range};
pub use ema::ema;
pub use macd::{detect_cross, macd, Macd, MacdCross};
pub use rsi::rsi;
pub use wilder::wilder_smooth;

use common::Series;

use crate::config::ProParams;

/// Every indicator the pro strategy reads, aligned bar-for-bar with the series.
///
/// `None` marks a value still in warm-up or one that came out non-finite.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ema200: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn compute(series: &Series, params: &ProParams) -> Self {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let m = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);

        Self {
            ema200: finite(ema(&closes, params.ema_span).into_iter().map(Some)),
            rsi: finite(rsi(&closes, params.rsi_window).into_iter()),
            macd: finite(m.line.into_iter().map(Some)),
            macd_signal: finite(m.signal.into_iter().map(Some)),
            macd_hist: finite(m.histogram.into_iter().map(Some)),
            atr: finite(atr(&highs, &lows, &closes, params.atr_window).into_iter()),
        }
    }

    pub fn len(&self) -> usize {
        self.ema200.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema200.is_empty()
    }
}

fn finite(values: impl Iterator<Item = Option<f64>>) -> Vec<Option<f64>> {
    values.map(|v| v.filter(|x| x.is_finite())).collect()
}
