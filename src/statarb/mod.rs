//! Statistical-arbitrage research stack.
//!
//! `data_gen` → `selection` (via `coint`) → `strategy` → `report`, wired
//! together by `backtest`. `quick` is the standalone two-stock variant.

pub mod backtest;
pub mod coint;
pub mod data_gen;
pub mod quick;
pub mod report;
pub mod selection;
pub mod stats;
pub mod strategy;
pub mod types;

pub use backtest::{run_full_backtest, BacktestParams, StatArbBacktester};
pub use report::{render_metrics, BacktestReport, PerformanceMetrics};
pub use types::{PairKey, PairStats, PriceFrame};
