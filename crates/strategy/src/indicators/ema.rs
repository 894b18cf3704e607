/// Exponential Moving Average over a full column (recursive, unadjusted form).
///
/// `ema[0] = values[0]`, then `ema[i] = α·values[i] + (1 − α)·ema[i−1]` with
/// `α = 2 / (span + 1)`. Every output is defined; early values simply carry
/// less history. A span of 0 is treated as 1 (output equals input).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
