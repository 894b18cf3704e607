use super::wilder::wilder_smooth;

/// RSI (Relative Strength Index) per bar.
///
/// Gains and losses of each close-to-close change are Wilder-smoothed
/// (`α = 1 / window`, seeded with the first change). The first defined value is
/// at index `window`, once `window` changes have been observed; everything
/// before that is `None`.
///
/// An average loss of zero yields exactly 100.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if closes.is_empty() {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(None);
    losses.push(None);

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(Some(if change > 0.0 { change } else { 0.0 }));
        losses.push(Some(if change < 0.0 { -change } else { 0.0 }));
    }

    let avg_gain = wilder_smooth(&gains, window);
    let avg_loss = wilder_smooth(&losses, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| Some(rsi_from_averages(gain?, loss?)))
        .collect()
}

/// RSI from smoothed average gain and loss.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
