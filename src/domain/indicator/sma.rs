//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) values are None.

/// Trailing simple moving average over `closes`.
///
/// Each window's mean is summed from that window's own values, so two windows
/// holding the same closes always produce the same average.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let warmup = period - 1;
    (0..closes.len())
        .map(|i| {
            if i < warmup {
                None
            } else {
                let window = &closes[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup() {
        let sma = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(sma.len(), 5);
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        assert!(sma[2].is_some());
        assert!(sma[4].is_some());
    }

    #[test]
    fn sma_known_values() {
        let sma = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!((sma[2].unwrap() - 20.0).abs() < 1e-12);
        assert!((sma[3].unwrap() - 30.0).abs() < 1e-12);
        assert!((sma[4].unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_one_is_identity() {
        let closes = [1.5, 2.5, 3.5];
        let sma = calculate_sma(&closes, 1);
        assert_eq!(sma, vec![Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn sma_period_longer_than_input() {
        let sma = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn sma_zero_period_is_undefined() {
        let sma = calculate_sma(&[1.0, 2.0], 0);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn sma_empty_input() {
        assert!(calculate_sma(&[], 3).is_empty());
    }

    #[test]
    fn sma_constant_series_is_exact() {
        let closes = [100.0; 10];
        for value in calculate_sma(&closes, 4).into_iter().flatten() {
            assert_eq!(value, 100.0);
        }
    }
}
