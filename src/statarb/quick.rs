//! Two-stock z-score script: one spread, full-sample z-score, band signals.

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::info;

use super::stats::{cumulative_returns, mean, sample_std, TRADING_DAYS};
use super::strategy::band_signals;
use crate::error::{Result, StatArbError};

#[derive(Debug, Clone)]
pub struct QuickConfig {
    pub num_days: usize,
    pub mean_return: f64,
    pub volatility: f64,
    pub entry: f64,
    pub exit: f64,
    pub seed: Option<u64>,
}

impl Default for QuickConfig {
    fn default() -> Self {
        Self {
            num_days: 252,
            mean_return: 0.0001,
            volatility: 0.02,
            entry: 1.5,
            exit: 0.5,
            seed: Some(42),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuickMetrics {
    pub sharpe_ratio: f64,
    pub cumulative_return: f64,
    pub max_drawdown: f64,
}

impl QuickMetrics {
    pub fn from_returns(returns: &[f64]) -> Self {
        let sd = sample_std(returns);
        let sharpe_ratio = if sd > f64::EPSILON {
            TRADING_DAYS.sqrt() * mean(returns) / sd
        } else {
            0.0
        };
        let cumulative = cumulative_returns(returns);
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0_f64;
        for &c in &cumulative {
            peak = peak.max(c);
            max_drawdown = max_drawdown.max(peak - c);
        }
        Self {
            sharpe_ratio,
            cumulative_return: cumulative.last().copied().unwrap_or(0.0),
            max_drawdown,
        }
    }
}

impl fmt::Display for QuickMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy Performance:")?;
        writeln!(f, "Sharpe Ratio: {:.4}", self.sharpe_ratio)?;
        writeln!(f, "Cumulative Return: {:.4}", self.cumulative_return)?;
        write!(f, "Max Drawdown: {:.4}", self.max_drawdown)
    }
}

#[derive(Debug, Clone)]
pub struct QuickRun {
    pub prices1: Vec<f64>,
    pub prices2: Vec<f64>,
    pub spread: Vec<f64>,
    pub zscore: Vec<f64>,
    pub signals: Vec<i8>,
    pub returns: Vec<f64>,
    pub metrics: QuickMetrics,
}

/// Two independent paths `100 * exp(cumsum(N(mean, vol)))`.
pub fn generate_mock_prices(cfg: &QuickConfig) -> Result<(Vec<f64>, Vec<f64>)> {
    let dist = Normal::new(cfg.mean_return, cfg.volatility)
        .map_err(|e| StatArbError::invalid("volatility", e.to_string()))?;
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (mut log1, mut log2) = (0.0, 0.0);
    let mut p1 = Vec::with_capacity(cfg.num_days);
    let mut p2 = Vec::with_capacity(cfg.num_days);
    for _ in 0..cfg.num_days {
        log1 += dist.sample(&mut rng);
        log2 += dist.sample(&mut rng);
        p1.push(100.0 * f64::exp(log1));
        p2.push(100.0 * f64::exp(log2));
    }
    Ok((p1, p2))
}

/// `(s - mean(s)) / sample_std(s)`; all zeros for a flat series.
pub fn full_sample_zscore(series: &[f64]) -> Vec<f64> {
    let m = mean(series);
    let sd = sample_std(series);
    if sd <= f64::EPSILON {
        return vec![0.0; series.len()];
    }
    series.iter().map(|s| (s - m) / sd).collect()
}

/// Long stock 1 / short stock 2 on `+1`, using the previous day's signal.
pub fn strategy_returns(p1: &[f64], p2: &[f64], signals: &[i8]) -> Vec<f64> {
    let n = p1.len().min(p2.len()).min(signals.len());
    let mut out = vec![0.0; n];
    for t in 1..n {
        let sig = f64::from(signals[t - 1]);
        let r1 = p1[t] / p1[t - 1] - 1.0;
        let r2 = p2[t] / p2[t - 1] - 1.0;
        out[t] = sig * r1 - sig * r2;
    }
    out
}

pub fn run_quick(cfg: &QuickConfig) -> Result<QuickRun> {
    if cfg.num_days < 2 {
        return Err(StatArbError::invalid("num_days", "need at least 2 days"));
    }
    if !(cfg.exit >= 0.0 && cfg.exit < cfg.entry) {
        return Err(StatArbError::invalid("exit", "must be in [0, entry)"));
    }
    let (prices1, prices2) = generate_mock_prices(cfg)?;
    let spread: Vec<f64> = prices1.iter().zip(&prices2).map(|(a, b)| a - b).collect();
    let zscore = full_sample_zscore(&spread);
    let signals = band_signals(&zscore, cfg.entry, cfg.exit);
    let returns = strategy_returns(&prices1, &prices2, &signals);
    let metrics = QuickMetrics::from_returns(&returns);

    info!(
        "⚡ Quick run | days={} in_market={} sharpe={:.4}",
        cfg.num_days,
        signals.iter().filter(|s| **s != 0).count(),
        metrics.sharpe_ratio,
    );
    Ok(QuickRun {
        prices1,
        prices2,
        spread,
        zscore,
        signals,
        returns,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred_days() -> QuickRun {
        run_quick(&QuickConfig {
            num_days: 100,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_shapes() {
        let run = hundred_days();
        assert_eq!(run.prices1.len(), 100);
        assert_eq!(run.prices2.len(), 100);
        assert_eq!(run.spread.len(), 100);
        assert_eq!(run.signals.len(), 100);
        assert_eq!(run.returns.len(), 100);
        assert!(run.prices1.iter().chain(&run.prices2).all(|p| *p > 0.0));
    }

    #[test]
    fn test_zscore_is_standardized() {
        let run = hundred_days();
        assert!(mean(&run.zscore).abs() < 1e-9);
        assert!((sample_std(&run.zscore) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_signals_and_metrics_bounds() {
        let run = hundred_days();
        assert!(run.signals.iter().all(|s| (-1..=1).contains(s)));
        let m = run.metrics;
        assert!(m.sharpe_ratio > -10.0 && m.sharpe_ratio < 10.0);
        assert!(m.cumulative_return > -1.0);
        assert!(m.max_drawdown >= 0.0 && m.max_drawdown < 1.0);
    }

    #[test]
    fn test_returns_use_previous_signal() {
        let p1 = [100.0, 110.0, 99.0];
        let p2 = [50.0, 55.0, 55.0];
        let r = strategy_returns(&p1, &p2, &[1, -1, 0]);
        assert_eq!(r[0], 0.0);
        // day 1 held +1: 0.10 - 0.10
        assert!(r[1].abs() < 1e-12);
        // day 2 held -1: -(-0.10) + 0
        assert!((r[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_run_reproducible() {
        let a = hundred_days();
        let b = hundred_days();
        assert_eq!(a.prices1, b.prices1);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_flat_series_zscore() {
        assert_eq!(full_sample_zscore(&[2.0; 5]), vec![0.0; 5]);
    }
}
