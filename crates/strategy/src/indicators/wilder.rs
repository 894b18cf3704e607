/// Wilder smoothing: exponential smoothing with `α = 1 / window`.
///
/// Recursive and unadjusted, seeded with the first observed value. Output stays
/// undefined until `window` observations have been seen. Undefined inputs are
/// skipped: they do not count as observations and leave the running value
/// untouched. A window of 0 yields an all-undefined column.
pub fn wilder_smooth(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let alpha = 1.0 / window as f64;
    let mut state: Option<f64> = None;
    let mut observed = 0usize;

    values
        .iter()
        .map(|value| {
            if let Some(x) = *value {
                state = Some(match state {
                    None => x,
                    Some(s) => alpha * x + (1.0 - alpha) * s,
                });
                observed += 1;
            }
            if observed >= window {
                state
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_counts_observations() {
        let out = wilder_smooth(&[Some(1.0), Some(1.0), Some(1.0)], 3);
        assert_eq!(out, vec![None, None, Some(1.0)]);
    }

    #[test]
    fn leading_gaps_do_not_count() {
        let out = wilder_smooth(&[None, Some(2.0), Some(4.0)], 2);
        // seeded with 2.0, then 0.5·4 + 0.5·2
        assert_eq!(out, vec![None, None, Some(3.0)]);
    }

    #[test]
    fn zero_window_is_undefined() {
        assert_eq!(wilder_smooth(&[Some(1.0), Some(2.0)], 0), vec![None, None]);
    }
}
