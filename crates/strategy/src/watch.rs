use common::{Alert, RsiWatch, Series};

use crate::config::RsiWatchParams;
use crate::indicators::rsi;
use crate::Strategy;

/// RSI-only watch rule on the last two bars.
///
/// Checked in order: cross back above `low`, cross back below `high`, still
/// below `low`, still above `high`. Needs `window + 2` bars and a defined RSI
/// on both bars.
pub fn evaluate_watch(series: &Series, params: &RsiWatchParams) -> Option<RsiWatch> {
    let closes = series.closes();
    if closes.len() < params.window + 2 {
        return None;
    }

    let values = rsi(&closes, params.window);
    let n = values.len();
    let prev = values[n - 2].filter(|v| v.is_finite())?;
    let last = values[n - 1].filter(|v| v.is_finite())?;

    if prev <= params.low && last > params.low {
        Some(RsiWatch::CrossUp { from: prev, to: last })
    } else if prev >= params.high && last < params.high {
        Some(RsiWatch::CrossDown { from: prev, to: last })
    } else if last < params.low {
        Some(RsiWatch::Oversold { rsi: last })
    } else if last > params.high {
        Some(RsiWatch::Overbought { rsi: last })
    } else {
        None
    }
}

/// Basic oversold/overbought watcher.
pub struct RsiWatchStrategy {
    name: String,
    params: RsiWatchParams,
}

impl RsiWatchStrategy {
    pub fn new(name: impl Into<String>, params: RsiWatchParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn params(&self) -> &RsiWatchParams {
        &self.params
    }
}

impl Strategy for RsiWatchStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_history(&self) -> usize {
        self.params.window + 2
    }

    fn evaluate(&self, series: &Series) -> Option<Alert> {
        evaluate_watch(series, &self.params).map(Alert::Watch)
    }
}
