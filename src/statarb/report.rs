use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use super::stats::{cumulative_returns, max_drawdown, sharpe_ratio, TRADING_DAYS};
use super::strategy::Trade;
use super::types::PairKey;

/// Everything one pair produced over the test window.
#[derive(Debug, Clone, Serialize)]
pub struct PairResult {
    pub key: PairKey,
    pub hedge_ratio: f64,
    pub spread: Vec<f64>,
    pub zscore: Vec<f64>,
    pub position1: Vec<f64>,
    pub position2: Vec<f64>,
    pub daily_returns: Vec<f64>,
    pub cumulative_returns: Vec<f64>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub num_trades: usize,
}

impl PerformanceMetrics {
    /// Summary statistics of a daily return stream.
    ///
    /// A trade is a maximal run of nonzero returns; it wins when the run
    /// compounds to a positive return.
    pub fn from_returns(returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self::default();
        }
        let cumulative = cumulative_returns(returns);
        let total_return = cumulative.last().copied().unwrap_or(0.0);
        let annualized_return =
            (1.0 + total_return).powf(TRADING_DAYS / returns.len() as f64) - 1.0;
        let equity: Vec<f64> = cumulative.iter().map(|c| 1.0 + c).collect();

        let mut trades: Vec<f64> = Vec::new();
        let mut run: Option<f64> = None;
        for &r in returns {
            if r != 0.0 {
                let w = run.unwrap_or(1.0);
                run = Some(w * (1.0 + r));
            } else if let Some(w) = run.take() {
                trades.push(w - 1.0);
            }
        }
        if let Some(w) = run {
            trades.push(w - 1.0);
        }
        let wins = trades.iter().filter(|r| **r > 0.0).count();
        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64
        };

        Self {
            total_return,
            annualized_return,
            sharpe_ratio: sharpe_ratio(returns, 0.0),
            max_drawdown: max_drawdown(&equity),
            win_rate,
            num_trades: trades.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub dates: Vec<NaiveDate>,
    pub portfolio_return: Vec<f64>,
    pub portfolio_cumulative_return: Vec<f64>,
    pub pairs: Vec<PairResult>,
    pub metrics: PerformanceMetrics,
}

/// Console table of the headline metrics.
pub fn render_metrics(m: &PerformanceMetrics) -> String {
    let rows = [
        ("Total Return", format!("{:.2}%", m.total_return * 100.0)),
        ("Annualized Return", format!("{:.2}%", m.annualized_return * 100.0)),
        ("Sharpe Ratio", format!("{:.2}", m.sharpe_ratio)),
        ("Max Drawdown", format!("{:.2}%", m.max_drawdown * 100.0)),
        ("Win Rate", format!("{:.2}%", m.win_rate * 100.0)),
        ("Number of Trades", m.num_trades.to_string()),
    ];
    let mut out = String::from("Backtest Results:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (label, value) in rows {
        let _ = writeln!(out, "{:<22}{:>18}", format!("{label}:"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_trades_and_win_rate() {
        // three runs: +2%, (-1%, -1%), +0.5%
        let r = [0.0, 0.02, 0.0, -0.01, -0.01, 0.0, 0.0, 0.005];
        let m = PerformanceMetrics::from_returns(&r);
        assert_eq!(m.num_trades, 3);
        assert!((m.win_rate - 2.0 / 3.0).abs() < 1e-12);

        let expected_total = 1.02 * 0.99 * 0.99 * 1.005 - 1.0;
        assert!((m.total_return - expected_total).abs() < 1e-12);
        let expected_ann = (1.0 + expected_total).powf(252.0 / 8.0) - 1.0;
        assert!((m.annualized_return - expected_ann).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_drawdown_uses_equity_curve() {
        let r = [0.1, -0.5, 0.0];
        let m = PerformanceMetrics::from_returns(&r);
        // equity 1.1 → 0.55
        assert!((m.max_drawdown - 0.5).abs() < 1e-12);
        assert!(m.max_drawdown <= 1.0);
    }

    #[test]
    fn test_metrics_flat_and_empty() {
        let flat = PerformanceMetrics::from_returns(&[0.0; 30]);
        assert_eq!(flat.num_trades, 0);
        assert_eq!(flat.win_rate, 0.0);
        assert_eq!(flat.sharpe_ratio, 0.0);
        assert_eq!(flat.total_return, 0.0);

        assert_eq!(PerformanceMetrics::from_returns(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn test_render_metrics() {
        let m = PerformanceMetrics {
            total_return: 0.1234,
            annualized_return: 0.05,
            sharpe_ratio: 1.5,
            max_drawdown: 0.02,
            win_rate: 0.6,
            num_trades: 7,
        };
        let table = render_metrics(&m);
        assert!(table.starts_with("Backtest Results:\n"));
        assert!(table.contains("12.34%"));
        assert!(table.contains("1.50"));
        assert!(table.lines().any(|l| l.starts_with("Number of Trades:") && l.ends_with('7')));
    }
}
