//! Engle–Granger cointegration test.
//!
//! Step 1 regresses one series on the other (with a constant). Step 2 runs an
//! Augmented Dickey–Fuller regression on the residuals and maps the t-statistic
//! to a p-value with MacKinnon's response-surface approximation.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};

use super::stats::linear_fit;
use crate::error::{Result, StatArbError};

pub const MIN_OBSERVATIONS: usize = 20;

// MacKinnon (2010) surface for a 2-variable cointegration test with constant.
const TAU_MAX: f64 = 0.92;
const TAU_MIN: f64 = -18.86;
const TAU_STAR: f64 = -2.62;
const TAU_SMALL_P: [f64; 3] = [2.92, 1.5012, 0.039796];
const TAU_LARGE_P: [f64; 4] = [2.1945, 0.64695, -0.29198, -0.042377];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

#[derive(Debug, Clone)]
pub struct CointegrationResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Slope of `x` regressed on `y`.
    pub hedge_ratio: f64,
    pub residuals: Vec<f64>,
}

// ─────────────────────────────────────────────────────────
// OLS
// ─────────────────────────────────────────────────────────

struct OlsFit {
    beta: DVector<f64>,
    xtx_inv: DMatrix<f64>,
    ssr: f64,
    nobs: usize,
}

impl OlsFit {
    fn k(&self) -> usize {
        self.beta.len()
    }

    fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.k() as f64
    }

    fn t_stat(&self, idx: usize) -> Option<f64> {
        let dof = self.nobs.checked_sub(self.k()).filter(|d| *d > 0)?;
        let sigma2 = self.ssr / dof as f64;
        let se = (sigma2 * self.xtx_inv[(idx, idx)]).sqrt();
        if se.is_finite() && se > 0.0 {
            Some(self.beta[idx] / se)
        } else {
            None
        }
    }
}

fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let xtx = x.transpose() * x;
    let xtx_inv = xtx.try_inverse()?;
    let beta = &xtx_inv * (x.transpose() * y);
    let resid = y - x * &beta;
    Some(OlsFit {
        beta,
        xtx_inv,
        ssr: resid.norm_squared(),
        nobs: y.len(),
    })
}

// ─────────────────────────────────────────────────────────
// ADF
// ─────────────────────────────────────────────────────────

/// Rows `t in start..diffs.len()`: `Δx_t ~ x_t + Δx_{t-1} + … + Δx_{t-lag}`.
fn adf_design(series: &[f64], diffs: &[f64], lag: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diffs.len() - start;
    let x = DMatrix::from_fn(rows, 1 + lag, |r, c| {
        let t = start + r;
        if c == 0 {
            series[t]
        } else {
            diffs[t - c]
        }
    });
    let y = DVector::from_fn(rows, |r, _| diffs[start + r]);
    (x, y)
}

pub fn default_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Augmented Dickey–Fuller test without deterministic terms, lag picked by AIC.
pub fn adf_test(series: &[f64], max_lag: Option<usize>) -> Result<AdfResult> {
    let n = series.len();
    if n < 10 {
        return Err(StatArbError::InsufficientData(format!(
            "ADF needs at least 10 observations, got {n}"
        )));
    }
    let max_lag = max_lag.unwrap_or_else(|| default_max_lag(n)).min(n / 2 - 1);
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Compare lags on the common sample so AIC values are comparable.
    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lag {
        let (x, y) = adf_design(series, &diffs, lag, max_lag);
        if let Some(fit) = ols(&x, &y) {
            // exactly identified fits have no residual variance left to score
            if fit.nobs <= fit.k() + 1 {
                continue;
            }
            let aic = fit.aic();
            if !aic.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, b)| aic < b) {
                best = Some((lag, aic));
            }
        }
    }
    let (used_lag, _) = best.ok_or_else(|| {
        StatArbError::InsufficientData("ADF regression is singular for every lag".into())
    })?;

    let (x, y) = adf_design(series, &diffs, used_lag, used_lag);
    let fit = ols(&x, &y)
        .ok_or_else(|| StatArbError::InsufficientData("ADF regression is singular".into()))?;
    let statistic = fit
        .t_stat(0)
        .ok_or_else(|| StatArbError::InsufficientData("ADF statistic is undefined".into()))?;

    Ok(AdfResult {
        statistic,
        used_lag,
        nobs: fit.nobs,
    })
}

/// Approximate p-value of an Engle–Granger statistic (two series, constant).
pub fn mackinnon_p_value(stat: f64) -> f64 {
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if stat <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefs.iter().rev().fold(0.0, |acc, c| acc * stat + c);
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(z),
        Err(_) => 1.0,
    }
}

// ─────────────────────────────────────────────────────────
// Engle–Granger
// ─────────────────────────────────────────────────────────

pub fn engle_granger(x: &[f64], y: &[f64]) -> Result<CointegrationResult> {
    if x.len() != y.len() {
        return Err(StatArbError::invalid(
            "series",
            format!("length mismatch: {} vs {}", x.len(), y.len()),
        ));
    }
    if x.len() < MIN_OBSERVATIONS {
        return Err(StatArbError::InsufficientData(format!(
            "cointegration needs at least {MIN_OBSERVATIONS} observations, got {}",
            x.len()
        )));
    }
    let (slope, intercept) = linear_fit(y, x).ok_or_else(|| {
        StatArbError::InsufficientData("regressor series is constant".into())
    })?;
    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| xi - intercept - slope * yi)
        .collect();

    let adf = adf_test(&residuals, None)?;
    Ok(CointegrationResult {
        statistic: adf.statistic,
        p_value: mackinnon_p_value(adf.statistic),
        hedge_ratio: slope,
        residuals,
    })
}

/// `(is_cointegrated, p_value)` at the given significance level.
pub fn test_cointegration(x: &[f64], y: &[f64], significance_level: f64) -> Result<(bool, f64)> {
    let res = engle_granger(x, y)?;
    Ok((res.p_value < significance_level, res.p_value))
}
