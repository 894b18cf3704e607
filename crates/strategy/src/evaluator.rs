use common::{round_to, Alert, Direction, Series, Signal, TriggerReadings};

use crate::config::ProParams;
use crate::indicators::{detect_cross, IndicatorSet, MacdCross};
use crate::Strategy;

const PRICE_PLACES: i32 = 5;
const RATIO_PLACES: i32 = 2;

/// Evaluate the EMA200 + RSI + MACD + ATR rule on the latest bar.
///
/// BUY when RSI is below `rsi_low`, the MACD histogram crosses above zero and
/// the close is above the EMA. SELL is the mirror image. Stop-loss sits
/// `atr_mult` ATRs from the entry and the target `rr_ratio` times that
/// distance on the other side.
///
/// Returns `None` for short series, for undefined readings on the last two
/// bars, and whenever the rule does not fire. Pure and deterministic.
pub fn evaluate(series: &Series, params: &ProParams) -> Option<Signal> {
    let n = series.len();
    if n < params.min_history || n < 2 {
        return None;
    }

    let set = IndicatorSet::compute(series, params);
    let last = n - 1;
    let prev = n - 2;

    let ema200 = set.ema200[last]?;
    let rsi = set.rsi[last]?;
    let hist = set.macd_hist[last]?;
    let atr = set.atr[last]?;
    let prev_hist = set.macd_hist[prev]?;

    let close = series.bars()[last].close;
    let cross = detect_cross(prev_hist, hist);

    let direction = if rsi < params.rsi_low && cross == MacdCross::Bullish && close > ema200 {
        Direction::Buy
    } else if rsi > params.rsi_high && cross == MacdCross::Bearish && close < ema200 {
        Direction::Sell
    } else {
        return None;
    };

    let levels = TradeLevels::new(direction, close, atr, params.atr_mult, params.rr_ratio);

    Some(Signal {
        direction,
        entry: round_to(levels.entry, PRICE_PLACES),
        stop_loss: round_to(levels.stop_loss, PRICE_PLACES),
        take_profit: round_to(levels.take_profit, PRICE_PLACES),
        risk_reward_ratio: levels.risk_reward_ratio.map(|r| round_to(r, RATIO_PLACES)),
        rsi: round_to(rsi, RATIO_PLACES),
        macd_hist_prev: round_to(prev_hist, PRICE_PLACES),
        macd_hist: round_to(hist, PRICE_PLACES),
        ema200: round_to(ema200, PRICE_PLACES),
        atr: round_to(atr, PRICE_PLACES),
        raw: TriggerReadings {
            close,
            rsi,
            macd_hist_prev: prev_hist,
            macd_hist: hist,
            ema200,
            atr,
        },
    })
}

/// Unrounded entry, stop and target for one trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: Option<f64>,
}

impl TradeLevels {
    pub fn new(direction: Direction, entry: f64, atr: f64, atr_mult: f64, rr_ratio: f64) -> Self {
        let (stop_loss, take_profit) = match direction {
            Direction::Buy => {
                let sl = entry - atr_mult * atr;
                (sl, entry + rr_ratio * (entry - sl))
            }
            Direction::Sell => {
                let sl = entry + atr_mult * atr;
                (sl, entry - rr_ratio * (sl - entry))
            }
        };

        let risk = entry - stop_loss;
        let risk_reward_ratio = if risk != 0.0 {
            Some(((take_profit - entry) / risk).abs())
        } else {
            None
        };

        Self {
            entry,
            stop_loss,
            take_profit,
            risk_reward_ratio,
        }
    }
}

/// EMA200 + RSI + MACD + ATR strategy with stop and target levels.
pub struct ProStrategy {
    name: String,
    params: ProParams,
}

impl ProStrategy {
    pub fn new(name: impl Into<String>, params: ProParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn params(&self) -> &ProParams {
        &self.params
    }
}

impl Strategy for ProStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_history(&self) -> usize {
        self.params.min_history.max(2)
    }

    fn evaluate(&self, series: &Series) -> Option<Alert> {
        evaluate(series, &self.params).map(Alert::Trade)
    }
}
