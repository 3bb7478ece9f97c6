//! Small descriptive-statistics helpers used across the backtest.

pub const TRADING_DAYS: f64 = 252.0;

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

fn sum_sq_dev(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum()
}

/// Standard deviation with `ddof = 1`.
pub fn sample_std(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    (sum_sq_dev(data) / (data.len() - 1) as f64).sqrt()
}

/// Standard deviation with `ddof = 0`.
pub fn population_std(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    (sum_sq_dev(data) / data.len() as f64).sqrt()
}

/// Least-squares line `y = slope * x + intercept`.
///
/// Returns `None` when the inputs differ in length, hold fewer than two points,
/// or `x` is constant.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        sxy += (xi - mx) * (yi - my);
        sxx += (xi - mx).powi(2);
    }
    if sxx <= f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

/// Rolling z-score over a trailing window.
///
/// The first `window` entries are 0. Windows with zero deviation also give 0.
pub fn rolling_zscore(series: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![0.0; series.len()];
    if window < 2 {
        return out;
    }
    for i in window..series.len() {
        let w = &series[i + 1 - window..=i];
        let sd = sample_std(w);
        if sd > f64::EPSILON {
            out[i] = (series[i] - mean(w)) / sd;
        }
    }
    out
}

/// Annualized Sharpe ratio of daily returns.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let sd = population_std(&excess);
    if sd <= f64::EPSILON {
        return 0.0;
    }
    mean(&excess) / sd * TRADING_DAYS.sqrt()
}

/// Largest peak-to-trough decline of an equity curve, as a positive fraction.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in equity {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}

/// `cumprod(1 + r) - 1`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    let mut wealth = 1.0;
    returns
        .iter()
        .map(|r| {
            wealth *= 1.0 + r;
            wealth - 1.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let d = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&d) - 5.0).abs() < 1e-12);
        assert!((population_std(&d) - 2.0).abs() < 1e-12);
        assert!((sample_std(&d) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), 0.0);
    }

    #[test]
    fn test_linear_fit() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        let (slope, intercept) = linear_fit(&x, &y).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn test_rolling_zscore_warmup_and_flat() {
        let s: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64).collect();
        let z = rolling_zscore(&s, 20);
        assert_eq!(z.len(), s.len());
        assert!(z[..20].iter().all(|v| *v == 0.0));
        assert!(z.iter().all(|v| v.is_finite()));

        let flat = rolling_zscore(&[3.0; 30], 10);
        assert!(flat.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_rolling_zscore_value() {
        let s = [1.0, 2.0, 3.0, 10.0];
        let z = rolling_zscore(&s, 3);
        // window [2, 3, 10]: mean 5, sample std sqrt(19)
        assert!((z[3] - 5.0 / 19.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_ratio() {
        let r = [0.01, -0.005, 0.02, 0.015, -0.01];
        assert!(sharpe_ratio(&r, 0.0) > 0.0);
        assert_eq!(sharpe_ratio(&[0.0; 10], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let equity = [1.0, 1.1, 1.05, 1.15, 1.1, 1.0, 1.05];
        let dd = max_drawdown(&equity);
        assert!((dd - 0.15 / 1.15).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&dd));
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_cumulative_returns() {
        let c = cumulative_returns(&[0.0, 0.1, -0.5]);
        assert!((c[1] - 0.1).abs() < 1e-12);
        assert!((c[2] - (1.1 * 0.5 - 1.0)).abs() < 1e-12);
    }
}
