//! Train/test pipeline: select pairs in-sample, trade them out-of-sample.

use tracing::info;

use super::data_gen::{GeneratorConfig, MarketDataGenerator};
use super::report::BacktestReport;
use super::selection::{PairSelector, SelectorConfig};
use super::strategy::{PairStrategyConfig, PairTradingStrategy, PortfolioConfig, PortfolioStrategy};
use super::types::PriceFrame;
use crate::error::{Result, StatArbError};

#[derive(Debug, Clone)]
pub struct BacktestParams {
    pub generator: GeneratorConfig,
    /// Share of rows used for pair selection.
    pub train_ratio: f64,
    pub selector: SelectorConfig,
    pub strategy: PairStrategyConfig,
    pub portfolio: PortfolioConfig,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            train_ratio: 0.7,
            selector: SelectorConfig::default(),
            strategy: PairStrategyConfig::default(),
            portfolio: PortfolioConfig::default(),
        }
    }
}

impl BacktestParams {
    pub fn from_env() -> Self {
        let mut p = Self {
            generator: GeneratorConfig::from_env(),
            selector: SelectorConfig::from_env(),
            strategy: PairStrategyConfig::from_env(),
            portfolio: PortfolioConfig::from_env(),
            ..Default::default()
        };
        if let Ok(v) = std::env::var("ARB_TRAIN_RATIO") { if let Ok(f) = v.parse() { p.train_ratio = f; } }
        p
    }
}

pub struct StatArbBacktester {
    selector: PairSelector,
    portfolio: PortfolioStrategy,
}

impl StatArbBacktester {
    pub fn new(selector: PairSelector, portfolio: PortfolioStrategy) -> Self {
        Self { selector, portfolio }
    }

    pub fn selector(&self) -> &PairSelector {
        &self.selector
    }

    pub fn run_backtest(&mut self, train: &PriceFrame, test: &PriceFrame) -> Result<BacktestReport> {
        info!("🔬 Selecting pairs on {} training days", train.len());
        let pairs = self.selector.find_cointegrated_pairs(train);
        if pairs.is_empty() {
            return Err(StatArbError::NoCointegratedPairs);
        }
        for key in pairs.iter().take(self.portfolio.config().max_pairs) {
            if let Some(s) = self.selector.stats_for(key) {
                info!(
                    "   {} | p={:.4} hedge={:.4} half_life={:.1}d",
                    key, s.p_value, s.hedge_ratio, s.half_life
                );
            }
        }

        info!("🚀 Trading {} pair(s) over {} test days", pairs.len().min(self.portfolio.config().max_pairs), test.len());
        let hedge_ratios = self.selector.hedge_ratios();
        self.portfolio.backtest(test, &pairs, &hedge_ratios)
    }
}

/// Generate a synthetic universe, split it chronologically and backtest.
pub fn run_full_backtest(params: BacktestParams) -> Result<BacktestReport> {
    info!(
        "📊 Generating {} stocks x {} days ({} planted pairs, seed={:?})",
        params.generator.n_stocks,
        params.generator.n_days,
        params.generator.n_cointegrated_pairs,
        params.generator.seed,
    );
    let mut gen = MarketDataGenerator::new(params.generator)?;
    let prices = gen.generate()?;
    let planted: Vec<String> = gen.cointegrated_pairs().iter().map(|k| k.to_string()).collect();
    info!("   planted: {}", planted.join(", "));

    let (train, test) = prices.split(params.train_ratio)?;
    let strategy = PairTradingStrategy::new(params.strategy)?;
    let portfolio = PortfolioStrategy::new(strategy, params.portfolio)?;
    let mut backtester = StatArbBacktester::new(PairSelector::new(params.selector), portfolio);

    let report = backtester.run_backtest(&train, &test)?;
    info!(
        "✅ Backtest done | total_return={:+.4} sharpe={:.2} trades={}",
        report.metrics.total_return, report.metrics.sharpe_ratio, report.metrics.num_trades,
    );
    Ok(report)
}
