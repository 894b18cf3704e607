use super::wilder::wilder_smooth;

/// True range per bar: max(high − low, |high − prev close|, |low − prev close|).
/// The first bar has no previous close and uses high − low.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    (0..n)
        .map(|i| {
            let range = high[i] - low[i];
            if i == 0 {
                return range;
            }
            let prev_close = close[i - 1];
            range
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs())
        })
        .collect()
}

/// ATR (Average True Range): Wilder-smoothed true range.
///
/// Defined once `window` true-range observations exist, i.e. from index
/// `window − 1` onward since the first bar already has a true range.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<Option<f64>> {
    let tr: Vec<Option<f64>> = true_range(high, low, close).into_iter().map(Some).collect();
    wilder_smooth(&tr, window)
}
