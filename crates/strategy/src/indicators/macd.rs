use super::ema::ema;

/// MACD (Moving Average Convergence/Divergence) columns, aligned with the input.
///
/// line = EMA(fast) − EMA(slow), signal = EMA(line, signal_span),
/// histogram = line − signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Direction of a histogram zero-cross between two consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdCross {
    Bullish, // histogram went from ≤ 0 to > 0
    Bearish, // histogram went from ≥ 0 to < 0
    Neutral, // no zero-cross on the latest bar
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| l - s)
        .collect();

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

/// Classify the histogram move from `prev` to `last`.
pub fn detect_cross(prev: f64, last: f64) -> MacdCross {
    if prev <= 0.0 && last > 0.0 {
        MacdCross::Bullish
    } else if prev >= 0.0 && last < 0.0 {
        MacdCross::Bearish
    } else {
        MacdCross::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_up(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 0.5).collect()
    }

    #[test]
    fn macd_columns_match_input_length() {
        let m = macd(&trending_up(40), 12, 26, 9);
        assert_eq!(m.line.len(), 40);
        assert_eq!(m.signal.len(), 40);
        assert_eq!(m.histogram.len(), 40);
    }

    #[test]
    fn macd_is_zero_on_constant_prices() {
        let m = macd(&[1.1; 50], 12, 26, 9);
        assert!(m.histogram.iter().all(|&h| h == 0.0));
        assert!(m.line.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn macd_line_positive_in_uptrend() {
        let m = macd(&trending_up(60), 12, 26, 9);
        assert!(m.line[1..].iter().all(|&l| l > 0.0));
    }

    #[test]
    fn macd_known_values() {
        // fast span 1 (identity), slow span 3 (α = 0.5), signal span 1 (identity)
        let m = macd(&[1.0, 2.0, 3.0], 1, 3, 1);
        assert_eq!(m.line, vec![0.0, 0.5, 0.75]);
        assert_eq!(m.signal, m.line);
        assert_eq!(m.histogram, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn cross_detection() {
        assert_eq!(detect_cross(-0.1, 0.2), MacdCross::Bullish);
        assert_eq!(detect_cross(0.0, 0.2), MacdCross::Bullish);
        assert_eq!(detect_cross(0.3, -0.2), MacdCross::Bearish);
        assert_eq!(detect_cross(0.0, -0.2), MacdCross::Bearish);
        assert_eq!(detect_cross(0.0, 0.0), MacdCross::Neutral);
        assert_eq!(detect_cross(0.1, 0.2), MacdCross::Neutral);
        assert_eq!(detect_cross(-0.1, -0.2), MacdCross::Neutral);
    }

    #[test]
    fn cross_detection_is_symmetric() {
        for (prev, last) in [(-0.5, 0.25), (0.0, 1.0), (2.0, 3.0), (0.0, 0.0)] {
            let up = detect_cross(prev, last);
            let down = detect_cross(-prev, -last);
            let mirrored = match up {
                MacdCross::Bullish => MacdCross::Bearish,
                MacdCross::Bearish => MacdCross::Bullish,
                MacdCross::Neutral => MacdCross::Neutral,
            };
            assert_eq!(down, mirrored);
        }
    }
}
