//! Z-score pairs strategy and the equal-allocation portfolio built on it.
//!
//! Each pair runs a small position state machine over its rolling spread
//! z-score: FLAT → LONG/SHORT spread on an entry crossing, back to FLAT on
//! reversion, stop loss, or maximum holding time.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::report::{BacktestReport, PairResult, PerformanceMetrics};
use super::stats::{cumulative_returns, rolling_zscore};
use super::types::{PairKey, PriceFrame};
use crate::error::{Result, StatArbError};

// ─────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PairStrategyConfig {
    /// |z| beyond which a position is opened.
    pub entry_threshold: f64,
    /// |z| inside which an open position is closed.
    pub exit_threshold: f64,
    /// |z| beyond which an open position is cut.
    pub stop_loss_threshold: f64,
    /// Rolling window for the z-score; no trading before it fills.
    pub lookback_period: usize,
    /// Days after which any open position is closed.
    pub max_position_days: usize,
}

impl Default for PairStrategyConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 2.0,
            exit_threshold: 0.5,
            stop_loss_threshold: 4.0,
            lookback_period: 20,
            max_position_days: 20,
        }
    }
}

impl PairStrategyConfig {
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Ok(v) = std::env::var("ARB_ENTRY_Z")       { if let Ok(f) = v.parse() { c.entry_threshold = f; } }
        if let Ok(v) = std::env::var("ARB_EXIT_Z")        { if let Ok(f) = v.parse() { c.exit_threshold = f; } }
        if let Ok(v) = std::env::var("ARB_STOP_Z")        { if let Ok(f) = v.parse() { c.stop_loss_threshold = f; } }
        if let Ok(v) = std::env::var("ARB_LOOKBACK")      { if let Ok(f) = v.parse() { c.lookback_period = f; } }
        if let Ok(v) = std::env::var("ARB_MAX_HOLD_DAYS") { if let Ok(f) = v.parse() { c.max_position_days = f; } }
        c
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.entry_threshold > 0.0) {
            return Err(StatArbError::invalid("entry_threshold", "must be positive"));
        }
        if !(self.exit_threshold >= 0.0 && self.exit_threshold < self.entry_threshold) {
            return Err(StatArbError::invalid(
                "exit_threshold",
                format!(
                    "must be in [0, entry_threshold={}), got {}",
                    self.entry_threshold, self.exit_threshold
                ),
            ));
        }
        if self.stop_loss_threshold <= self.entry_threshold {
            return Err(StatArbError::invalid(
                "stop_loss_threshold",
                "must exceed entry_threshold",
            ));
        }
        if self.lookback_period < 2 {
            return Err(StatArbError::invalid("lookback_period", "must be at least 2"));
        }
        if self.max_position_days == 0 {
            return Err(StatArbError::invalid("max_position_days", "must be at least 1"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────
// Signal types
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpreadSide {
    /// Spread is cheap: long the second leg, short the first.
    Long,
    /// Spread is rich: short the second leg, long the first.
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    Reverted,
    StopLoss,
    MaxHolding,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub side: SpreadSide,
    pub entry_index: usize,
    pub exit_index: Option<usize>,
    pub exit_reason: Option<ExitReason>,
}

#[derive(Debug, Clone)]
pub struct PairSignals {
    pub spread: Vec<f64>,
    pub zscore: Vec<f64>,
    /// Capital weight held in the first leg at the close of each day.
    pub position1: Vec<f64>,
    /// Capital weight held in the second leg at the close of each day.
    pub position2: Vec<f64>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    side: SpreadSide,
    days: usize,
    w1: f64,
    w2: f64,
}

#[derive(Debug, Default)]
struct SignalStats {
    long_entries: usize,
    short_entries: usize,
    reverted: usize,
    stopped: usize,
    timed_out: usize,
}

/// Plain hysteresis band: +1 long spread, -1 short spread, 0 flat.
///
/// Opens beyond `±entry`, closes once the z-score is back past `∓exit`.
pub fn band_signals(zscore: &[f64], entry: f64, exit: f64) -> Vec<i8> {
    let mut state = 0_i8;
    zscore
        .iter()
        .map(|&z| {
            state = match state {
                0 if z < -entry => 1,
                0 if z > entry => -1,
                1 if z > -exit => 0,
                -1 if z < exit => 0,
                s => s,
            };
            state
        })
        .collect()
}

// ─────────────────────────────────────────────────────────
// Pair strategy
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PairTradingStrategy {
    cfg: PairStrategyConfig,
}

impl PairTradingStrategy {
    pub fn new(cfg: PairStrategyConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PairStrategyConfig {
        &self.cfg
    }

    fn exit_reason(&self, pos: &OpenPosition, z: f64) -> Option<ExitReason> {
        let c = &self.cfg;
        let signal_exit = match pos.side {
            SpreadSide::Long if z < -c.stop_loss_threshold => Some(ExitReason::StopLoss),
            SpreadSide::Long if z > -c.exit_threshold => Some(ExitReason::Reverted),
            SpreadSide::Short if z > c.stop_loss_threshold => Some(ExitReason::StopLoss),
            SpreadSide::Short if z < c.exit_threshold => Some(ExitReason::Reverted),
            _ => None,
        };
        signal_exit.or_else(|| (pos.days >= c.max_position_days).then_some(ExitReason::MaxHolding))
    }

    /// Spread, rolling z-score and leg weights for `p2 - hedge_ratio * p1`.
    ///
    /// Leg weights are fixed at entry so the pair is share-hedged:
    /// `|w1| = hedge_ratio * p1 / p2` against `|w2| = 1`.
    pub fn generate_signals(&self, price1: &[f64], price2: &[f64], hedge_ratio: f64) -> Result<PairSignals> {
        if price1.len() != price2.len() {
            return Err(StatArbError::invalid(
                "prices",
                format!("length mismatch: {} vs {}", price1.len(), price2.len()),
            ));
        }
        let n = price1.len();
        let spread: Vec<f64> = price2
            .iter()
            .zip(price1)
            .map(|(b, a)| b - hedge_ratio * a)
            .collect();
        let zscore = rolling_zscore(&spread, self.cfg.lookback_period);

        let mut position1 = vec![0.0; n];
        let mut position2 = vec![0.0; n];
        let mut trades: Vec<Trade> = Vec::new();
        let mut stats = SignalStats::default();
        let mut open: Option<OpenPosition> = None;

        for t in self.cfg.lookback_period..n {
            let z = zscore[t];
            match open.as_mut() {
                None => {
                    let side = if z < -self.cfg.entry_threshold {
                        SpreadSide::Long
                    } else if z > self.cfg.entry_threshold {
                        SpreadSide::Short
                    } else {
                        continue;
                    };
                    if price2[t] <= 0.0 {
                        continue;
                    }
                    let w = hedge_ratio * price1[t] / price2[t];
                    let (w1, w2) = match side {
                        SpreadSide::Long => {
                            stats.long_entries += 1;
                            (-w, 1.0)
                        }
                        SpreadSide::Short => {
                            stats.short_entries += 1;
                            (w, -1.0)
                        }
                    };
                    position1[t] = w1;
                    position2[t] = w2;
                    trades.push(Trade {
                        side,
                        entry_index: t,
                        exit_index: None,
                        exit_reason: None,
                    });
                    open = Some(OpenPosition { side, days: 1, w1, w2 });
                }
                Some(pos) => {
                    pos.days += 1;
                    if let Some(reason) = self.exit_reason(pos, z) {
                        match reason {
                            ExitReason::Reverted => stats.reverted += 1,
                            ExitReason::StopLoss => stats.stopped += 1,
                            ExitReason::MaxHolding => stats.timed_out += 1,
                        }
                        if let Some(trade) = trades.last_mut() {
                            trade.exit_index = Some(t);
                            trade.exit_reason = Some(reason);
                        }
                        open = None;
                    } else {
                        position1[t] = pos.w1;
                        position2[t] = pos.w2;
                    }
                }
            }
        }

        debug!(
            "signals | long={} short={} reverted={} stopped={} timed_out={} open_at_end={}",
            stats.long_entries,
            stats.short_entries,
            stats.reverted,
            stats.stopped,
            stats.timed_out,
            open.is_some(),
        );

        Ok(PairSignals {
            spread,
            zscore,
            position1,
            position2,
            trades,
        })
    }

    /// Daily and cumulative returns of yesterday's weights applied to today's moves.
    pub fn calculate_returns(
        &self,
        price1: &[f64],
        price2: &[f64],
        position1: &[f64],
        position2: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        let n = price1
            .len()
            .min(price2.len())
            .min(position1.len())
            .min(position2.len());
        let pct = |p: &[f64], t: usize| {
            if p[t - 1] != 0.0 {
                (p[t] - p[t - 1]) / p[t - 1]
            } else {
                0.0
            }
        };

        let mut daily = vec![0.0; n];
        for t in 1..n {
            daily[t] = position1[t - 1] * pct(price1, t) + position2[t - 1] * pct(price2, t);
        }
        let cumulative = cumulative_returns(&daily);
        (daily, cumulative)
    }
}

// ─────────────────────────────────────────────────────────
// Portfolio
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Pairs traded at once; extra candidates are dropped in order.
    pub max_pairs: usize,
    /// Fraction of capital behind each pair's return stream.
    pub capital_per_pair: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_pairs: 5,
            capital_per_pair: 0.2,
        }
    }
}

impl PortfolioConfig {
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Ok(v) = std::env::var("ARB_MAX_PAIRS")        { if let Ok(f) = v.parse() { c.max_pairs = f; } }
        if let Ok(v) = std::env::var("ARB_CAPITAL_PER_PAIR") { if let Ok(f) = v.parse() { c.capital_per_pair = f; } }
        c
    }
}

pub struct PortfolioStrategy {
    pair_strategy: PairTradingStrategy,
    cfg: PortfolioConfig,
}

impl PortfolioStrategy {
    pub fn new(pair_strategy: PairTradingStrategy, cfg: PortfolioConfig) -> Result<Self> {
        if cfg.max_pairs == 0 {
            return Err(StatArbError::invalid("max_pairs", "must be at least 1"));
        }
        if !(cfg.capital_per_pair > 0.0) {
            return Err(StatArbError::invalid("capital_per_pair", "must be positive"));
        }
        Ok(Self { pair_strategy, cfg })
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.cfg
    }

    /// Trade up to `max_pairs` pairs over `prices`. Pairs without a hedge ratio use 1.0.
    pub fn backtest(
        &self,
        prices: &PriceFrame,
        pairs: &[PairKey],
        hedge_ratios: &HashMap<PairKey, f64>,
    ) -> Result<BacktestReport> {
        let n = prices.len();
        let mut portfolio_return = vec![0.0; n];
        let mut pair_results = Vec::new();

        for key in pairs.iter().take(self.cfg.max_pairs) {
            let p1 = prices.column(&key.first).ok_or_else(|| {
                StatArbError::invalid("pairs", format!("unknown symbol {}", key.first))
            })?;
            let p2 = prices.column(&key.second).ok_or_else(|| {
                StatArbError::invalid("pairs", format!("unknown symbol {}", key.second))
            })?;
            let hedge_ratio = hedge_ratios.get(key).copied().unwrap_or(1.0);

            let signals = self.pair_strategy.generate_signals(p1, p2, hedge_ratio)?;
            let (daily, cumulative) = self.pair_strategy.calculate_returns(
                p1,
                p2,
                &signals.position1,
                &signals.position2,
            );
            for (acc, r) in portfolio_return.iter_mut().zip(&daily) {
                *acc += r * self.cfg.capital_per_pair;
            }

            info!(
                "📈 {} | hedge={:.4} trades={} cum_return={:+.4}",
                key,
                hedge_ratio,
                signals.trades.len(),
                cumulative.last().copied().unwrap_or(0.0),
            );

            pair_results.push(PairResult {
                key: key.clone(),
                hedge_ratio,
                spread: signals.spread,
                zscore: signals.zscore,
                position1: signals.position1,
                position2: signals.position2,
                daily_returns: daily,
                cumulative_returns: cumulative,
                trades: signals.trades,
            });
        }

        let portfolio_cumulative_return = cumulative_returns(&portfolio_return);
        let metrics = PerformanceMetrics::from_returns(&portfolio_return);

        Ok(BacktestReport {
            dates: prices.dates.clone(),
            portfolio_return,
            portfolio_cumulative_return,
            pairs: pair_results,
            metrics,
        })
    }
}
