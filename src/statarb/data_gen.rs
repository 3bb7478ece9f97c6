//! Synthetic market data with planted cointegrated pairs.

use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::types::{PairKey, PriceFrame};
use crate::error::{Result, StatArbError};

// ─────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub n_stocks: usize,
    pub n_days: usize,
    /// Clamped to `n_stocks / 2`.
    pub n_cointegrated_pairs: usize,
    /// `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
    /// Range of the per-pair OU reversion speed `k`.
    pub mean_reversion: (f64, f64),
    /// Std-dev of the daily spread shock.
    pub spread_noise: f64,
    /// Last date of the generated index. Defaults to today.
    pub end_date: Option<NaiveDate>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_stocks: 20,
            n_days: 1000,
            n_cointegrated_pairs: 5,
            seed: Some(42),
            mean_reversion: (0.02, 0.05),
            spread_noise: 0.1,
            end_date: None,
        }
    }
}

impl GeneratorConfig {
    /// Load overrides from environment variables (if set).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("ARB_N_STOCKS") {
            if let Ok(n) = v.parse() {
                cfg.n_stocks = n;
            }
        }
        if let Ok(v) = std::env::var("ARB_N_DAYS") {
            if let Ok(n) = v.parse() {
                cfg.n_days = n;
            }
        }
        if let Ok(v) = std::env::var("ARB_N_COINT_PAIRS") {
            if let Ok(n) = v.parse() {
                cfg.n_cointegrated_pairs = n;
            }
        }
        if let Ok(v) = std::env::var("ARB_SEED") {
            if let Ok(s) = v.parse() {
                cfg.seed = Some(s);
            }
        }
        cfg
    }
}

// ─────────────────────────────────────────────────────────
// Generator
// ─────────────────────────────────────────────────────────

pub struct MarketDataGenerator {
    cfg: GeneratorConfig,
    rng: StdRng,
    symbols: Vec<String>,
    planted: Vec<(usize, usize)>,
}

impl MarketDataGenerator {
    pub fn new(mut cfg: GeneratorConfig) -> Result<Self> {
        if cfg.n_stocks < 2 {
            return Err(StatArbError::invalid("n_stocks", "need at least 2 stocks"));
        }
        if cfg.n_days < 2 {
            return Err(StatArbError::invalid("n_days", "need at least 2 days"));
        }
        let (lo, hi) = cfg.mean_reversion;
        if !(0.0 < lo && lo <= hi && hi < 1.0) {
            return Err(StatArbError::invalid(
                "mean_reversion",
                format!("expected 0 < lo <= hi < 1, got ({lo}, {hi})"),
            ));
        }
        if !(cfg.spread_noise > 0.0) {
            return Err(StatArbError::invalid("spread_noise", "must be positive"));
        }
        cfg.n_cointegrated_pairs = cfg.n_cointegrated_pairs.min(cfg.n_stocks / 2);

        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let symbols = (1..=cfg.n_stocks).map(|i| format!("STOCK_{i}")).collect();
        Ok(Self {
            cfg,
            rng,
            symbols,
            planted: Vec::new(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.cfg
    }

    /// Generate a fresh price frame. Successive calls continue the RNG stream.
    pub fn generate(&mut self) -> Result<PriceFrame> {
        let n_days = self.cfg.n_days;
        let mut columns = vec![vec![0.0_f64; n_days]; self.cfg.n_stocks];

        let daily = Normal::new(0.0001, 0.01).map_err(|e| StatArbError::invalid("returns", e.to_string()))?;
        for col in columns.iter_mut() {
            col[0] = self.rng.gen_range(10.0..100.0);
            for t in 1..n_days {
                col[t] = col[t - 1] * (1.0 + daily.sample(&mut self.rng));
            }
        }

        let shock = Normal::new(0.0, self.cfg.spread_noise)
            .map_err(|e| StatArbError::invalid("spread_noise", e.to_string()))?;
        let start = Normal::new(0.0, 1.0).map_err(|e| StatArbError::invalid("spread", e.to_string()))?;
        let (k_lo, k_hi) = self.cfg.mean_reversion;

        self.planted.clear();
        for i in 0..self.cfg.n_cointegrated_pairs {
            let (a, b) = (2 * i, 2 * i + 1);
            let factor = self.rng.gen_range(0.5..1.5);
            let k = if k_hi > k_lo {
                self.rng.gen_range(k_lo..k_hi)
            } else {
                k_lo
            };

            let mut spread = start.sample(&mut self.rng);
            columns[b][0] = factor * columns[a][0] + spread;
            for t in 1..n_days {
                spread = spread * (1.0 - k) + shock.sample(&mut self.rng);
                columns[b][t] = factor * columns[a][t] + spread;
            }
            debug!(
                "planted {} ~ {:.3} x {} (k={:.3})",
                self.symbols[b], factor, self.symbols[a], k
            );
            self.planted.push((a, b));
        }

        let end = self.cfg.end_date.unwrap_or_else(|| Local::now().date_naive());
        let first = end - Duration::days(n_days as i64 - 1);
        let dates = (0..n_days).map(|d| first + Duration::days(d as i64)).collect();

        PriceFrame::new(dates, self.symbols.clone(), columns)
    }

    /// Pairs planted by the last `generate` call, by symbol.
    pub fn cointegrated_pairs(&self) -> Vec<PairKey> {
        self.planted
            .iter()
            .map(|&(a, b)| PairKey::new(self.symbols[a].clone(), self.symbols[b].clone()))
            .collect()
    }
}
