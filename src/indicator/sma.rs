/// Mean of the trailing `period` values, or `None` when fewer are available.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    let window = trailing(values, period)?;
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Population standard deviation of the trailing `period` values.
pub fn population_std_dev(values: &[f64], period: usize) -> Option<f64> {
    let window = trailing(values, period)?;
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|v| {
            let d = *v - mean;
            d * d
        })
        .sum::<f64>()
        / period as f64;
    Some(variance.sqrt())
}

fn trailing(values: &[f64], period: usize) -> Option<&[f64]> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(&values[values.len() - period..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_only_trailing_window() {
        let v = sma(&[100.0, 1.0, 2.0, 3.0], 3).unwrap();
        assert!((v - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_requires_full_window() {
        assert_eq!(sma(&[1.0, 2.0], 3), None);
        assert_eq!(sma(&[1.0, 2.0], 0), None);
        assert_eq!(sma(&[], 1), None);
    }

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        let sd = population_std_dev(&[5.0; 10], 10).unwrap();
        assert!(sd.abs() < f64::EPSILON);
    }

    #[test]
    fn std_dev_is_population_not_sample() {
        // Population variance of [2, 4, 4, 4, 5, 5, 7, 9] is 4.
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn no_drift_against_naive_mean() {
        let values: Vec<f64> = (0..500u64).map(|i| (i as f64) * 0.1 + 0.01).collect();
        for end in 10..values.len() {
            let prefix = &values[..end];
            let naive = prefix[end - 10..].iter().sum::<f64>() / 10.0;
            let got = sma(prefix, 10).unwrap();
            assert!(
                (got - naive).abs() < 1e-9,
                "Drift at end={}: got={} naive={}",
                end,
                got,
                naive
            );
        }
    }
}
