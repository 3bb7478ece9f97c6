use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatArbError};

/// Daily close prices, one column per symbol.
#[derive(Debug, Clone, Serialize)]
pub struct PriceFrame {
    pub dates: Vec<NaiveDate>,
    pub symbols: Vec<String>,
    /// Column-major: `columns[k][t]` is the close of `symbols[k]` on `dates[t]`.
    pub columns: Vec<Vec<f64>>,
}

impl PriceFrame {
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if symbols.len() != columns.len() {
            return Err(StatArbError::invalid(
                "columns",
                format!("{} symbols but {} columns", symbols.len(), columns.len()),
            ));
        }
        if let Some(bad) = columns.iter().position(|c| c.len() != dates.len()) {
            return Err(StatArbError::invalid(
                "columns",
                format!(
                    "column {} has {} rows, expected {}",
                    symbols[bad],
                    columns[bad].len(),
                    dates.len()
                ),
            ));
        }
        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    /// Number of rows (days).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|k| self.columns[k].as_slice())
    }

    fn slice_rows(&self, start: usize, end: usize) -> PriceFrame {
        PriceFrame {
            dates: self.dates[start..end].to_vec(),
            symbols: self.symbols.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
        }
    }

    /// Chronological train/test split; the first `floor(len * train_ratio)` rows train.
    pub fn split(&self, train_ratio: f64) -> Result<(PriceFrame, PriceFrame)> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(StatArbError::invalid(
                "train_ratio",
                format!("must be in (0, 1), got {train_ratio}"),
            ));
        }
        let train_size = (self.len() as f64 * train_ratio) as usize;
        Ok((
            self.slice_rows(0, train_size),
            self.slice_rows(train_size, self.len()),
        ))
    }
}

/// Ordered pair of symbols; `second` is regressed on `first` for the hedge ratio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Selection statistics for an accepted pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairStats {
    pub p_value: f64,
    pub hedge_ratio: f64,
    pub half_life: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> PriceFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let a: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
        let b: Vec<f64> = (0..n).map(|i| 20.0 + i as f64).collect();
        PriceFrame::new(dates, vec!["A".into(), "B".into()], vec![a, b]).unwrap()
    }

    #[test]
    fn test_split_sizes() {
        let f = frame(10);
        let (train, test) = f.split(0.7).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert_eq!(test.column("A").unwrap()[0], 17.0);
        assert_eq!(test.dates[0], f.dates[7]);
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        let f = frame(10);
        assert!(f.split(0.0).is_err());
        assert!(f.split(1.0).is_err());
        assert!(f.split(f64::NAN).is_err());
    }

    #[test]
    fn test_column_lookup() {
        let f = frame(3);
        assert_eq!(f.column("B").unwrap(), &[20.0, 21.0, 22.0]);
        assert!(f.column("C").is_none());
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let res = PriceFrame::new(vec![start], vec!["A".into()], vec![vec![1.0, 2.0]]);
        assert!(res.is_err());
    }

    #[test]
    fn test_pair_key_display() {
        let key = PairKey::new("STOCK_1", "STOCK_2");
        assert_eq!(key.to_string(), "STOCK_1/STOCK_2");
        assert_eq!(key.reversed(), PairKey::new("STOCK_2", "STOCK_1"));
    }
}
