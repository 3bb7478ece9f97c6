use std::collections::HashMap;

use tracing::{debug, info};

use super::coint::test_cointegration;
use super::stats::linear_fit;
use super::types::{PairKey, PairStats, PriceFrame};
use crate::error::{Result, StatArbError};

// ─────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Maximum Engle–Granger p-value accepted.
    pub significance_level: f64,
    /// Half-life bounds in days; spreads outside revert too fast or too slowly to trade.
    pub min_half_life: f64,
    pub max_half_life: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_half_life: 5.0,
            max_half_life: 100.0,
        }
    }
}

impl SelectorConfig {
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Ok(v) = std::env::var("ARB_SIGNIFICANCE")  { if let Ok(f) = v.parse() { c.significance_level = f; } }
        if let Ok(v) = std::env::var("ARB_MIN_HALF_LIFE") { if let Ok(f) = v.parse() { c.min_half_life = f; } }
        if let Ok(v) = std::env::var("ARB_MAX_HALF_LIFE") { if let Ok(f) = v.parse() { c.max_half_life = f; } }
        c
    }
}

/// Half-life of mean reversion from `Δs_t = γ·s_{t-1} + c`.
///
/// Non-reverting spreads (`γ >= 0`) and degenerate fits give +∞.
pub fn half_life(spread: &[f64]) -> f64 {
    if spread.len() < 3 {
        return f64::INFINITY;
    }
    let lagged = &spread[..spread.len() - 1];
    let delta: Vec<f64> = spread.windows(2).map(|w| w[1] - w[0]).collect();
    match linear_fit(lagged, &delta) {
        Some((gamma, _)) if gamma < 0.0 && gamma > -1.0 => -(2.0_f64.ln()) / (1.0 + gamma).ln(),
        _ => f64::INFINITY,
    }
}

// ─────────────────────────────────────────────────────────
// Selector
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ScanStats {
    tested: usize,
    skipped: usize,
    cointegrated: usize,
    rejected_half_life: usize,
}

pub struct PairSelector {
    cfg: SelectorConfig,
    pairs: Vec<PairKey>,
    pair_stats: HashMap<PairKey, PairStats>,
}

impl PairSelector {
    pub fn new(cfg: SelectorConfig) -> Self {
        Self {
            cfg,
            pairs: Vec::new(),
            pair_stats: HashMap::new(),
        }
    }

    /// Test every column pair `(i < j)` and keep the tradable ones, best p-value first.
    pub fn find_cointegrated_pairs(&mut self, prices: &PriceFrame) -> Vec<PairKey> {
        self.pairs.clear();
        self.pair_stats.clear();
        let mut scan = ScanStats::default();

        for i in 0..prices.n_symbols() {
            for j in (i + 1)..prices.n_symbols() {
                let (p1, p2) = (&prices.columns[i], &prices.columns[j]);
                scan.tested += 1;

                let (is_coint, p_value) =
                    match test_cointegration(p1, p2, self.cfg.significance_level) {
                        Ok(res) => res,
                        Err(e) => {
                            debug!("skip {}/{}: {}", prices.symbols[i], prices.symbols[j], e);
                            scan.skipped += 1;
                            continue;
                        }
                    };
                if !is_coint {
                    continue;
                }
                scan.cointegrated += 1;

                let Some((hedge_ratio, _)) = linear_fit(p1, p2) else {
                    scan.skipped += 1;
                    continue;
                };
                let spread: Vec<f64> = p2.iter().zip(p1).map(|(b, a)| b - hedge_ratio * a).collect();
                let hl = half_life(&spread);
                let key = PairKey::new(prices.symbols[i].clone(), prices.symbols[j].clone());

                if hl < self.cfg.min_half_life || hl > self.cfg.max_half_life {
                    debug!("reject {}: half-life {:.1}d out of range", key, hl);
                    scan.rejected_half_life += 1;
                    continue;
                }

                debug!("accept {}: p={:.4} hedge={:.4} hl={:.1}d", key, p_value, hedge_ratio, hl);
                self.pair_stats.insert(
                    key.clone(),
                    PairStats {
                        p_value,
                        hedge_ratio,
                        half_life: hl,
                    },
                );
                self.pairs.push(key);
            }
        }

        let stats = &self.pair_stats;
        self.pairs.sort_by(|a, b| stats[a].p_value.total_cmp(&stats[b].p_value));

        info!(
            "🔎 Pair scan | tested={} cointegrated={} half_life_rejects={} skipped={} → selected={}",
            scan.tested, scan.cointegrated, scan.rejected_half_life, scan.skipped, self.pairs.len(),
        );
        self.pairs.clone()
    }

    pub fn pairs(&self) -> &[PairKey] {
        &self.pairs
    }

    pub fn pair_stats(&self) -> &HashMap<PairKey, PairStats> {
        &self.pair_stats
    }

    pub fn stats_for(&self, key: &PairKey) -> Option<&PairStats> {
        self.pair_stats.get(key)
    }

    /// Hedge ratio of `second` on `first`; a reversed lookup returns the reciprocal.
    pub fn hedge_ratio(&self, first: &str, second: &str) -> Result<f64> {
        let key = PairKey::new(first, second);
        if let Some(stats) = self.pair_stats.get(&key) {
            return Ok(stats.hedge_ratio);
        }
        if let Some(stats) = self.pair_stats.get(&key.reversed()) {
            return Ok(1.0 / stats.hedge_ratio);
        }
        Err(StatArbError::PairNotFound(key.to_string()))
    }

    /// Hedge ratios of every selected pair.
    pub fn hedge_ratios(&self) -> HashMap<PairKey, f64> {
        self.pair_stats
            .iter()
            .map(|(k, s)| (k.clone(), s.hedge_ratio))
            .collect()
    }
}

impl Default for PairSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statarb::data_gen::{GeneratorConfig, MarketDataGenerator};
    use chrono::NaiveDate;

    fn strong_universe() -> (PriceFrame, Vec<PairKey>) {
        let mut gen = MarketDataGenerator::new(GeneratorConfig {
            n_stocks: 10,
            n_days: 1000,
            n_cointegrated_pairs: 3,
            seed: Some(42),
            mean_reversion: (0.06, 0.09),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        })
        .unwrap();
        let frame = gen.generate().unwrap();
        (frame, gen.cointegrated_pairs())
    }

    #[test]
    fn test_half_life_of_ar1() {
        // s_t = 0.9 s_{t-1} exactly → γ = -0.1
        let mut s = vec![100.0];
        for _ in 0..200 {
            let last = *s.last().unwrap();
            s.push(0.9 * last);
        }
        let hl = half_life(&s);
        let expected = -(2.0_f64.ln()) / 0.9_f64.ln();
        assert!((hl - expected).abs() < 1e-6, "hl={hl}");
        assert!(hl > 0.0);
    }

    #[test]
    fn test_half_life_non_reverting() {
        let trend: Vec<f64> = (0..100).map(|i| (i as f64).powi(2)).collect();
        assert!(half_life(&trend).is_infinite());
        assert!(half_life(&[1.0]).is_infinite());
    }

    #[test]
    fn test_find_cointegrated_pairs() {
        let (frame, known) = strong_universe();
        let mut selector = PairSelector::default();
        let found = selector.find_cointegrated_pairs(&frame);

        assert!(!found.is_empty());
        for key in &found {
            assert!(frame.column(&key.first).is_some());
            assert!(frame.column(&key.second).is_some());
            assert_ne!(key.first, key.second);

            let stats = selector.stats_for(key).unwrap();
            assert!(stats.p_value < 0.05);
            assert!(stats.half_life >= 5.0 && stats.half_life <= 100.0);
        }
        assert!(
            found.iter().any(|k| known.contains(k)),
            "none of the planted pairs were found: {found:?}"
        );
        assert!(found
            .windows(2)
            .all(|w| selector.stats_for(&w[0]).unwrap().p_value <= selector.stats_for(&w[1]).unwrap().p_value));
    }

    #[test]
    fn test_hedge_ratio_lookup() {
        let (frame, _) = strong_universe();
        let mut selector = PairSelector::default();
        let found = selector.find_cointegrated_pairs(&frame);
        let key = found.first().expect("at least one pair");

        let h = selector.hedge_ratio(&key.first, &key.second).unwrap();
        assert!(h > 0.0);
        let inv = selector.hedge_ratio(&key.second, &key.first).unwrap();
        assert!((inv - 1.0 / h).abs() < 1e-12);

        let err = selector.hedge_ratio("NON_EXISTENT_1", "NON_EXISTENT_2").unwrap_err();
        assert!(matches!(err, StatArbError::PairNotFound(_)));
    }

    #[test]
    fn test_rescan_resets_state() {
        let (frame, _) = strong_universe();
        let mut selector = PairSelector::default();
        selector.find_cointegrated_pairs(&frame);

        let (short, _) = frame.split(0.01).unwrap();
        let found = selector.find_cointegrated_pairs(&short);
        assert!(found.is_empty());
        assert!(selector.pair_stats().is_empty());
    }
}
