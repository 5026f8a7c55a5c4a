//! Numeric helpers shared by the estimator, forecaster and liquidation model.
//!
//! Everything here is a pure function over `f64` slices. Degenerate inputs
//! (empty slices, single observations, non-positive prices) produce zeros
//! rather than `NaN`.

/// Days used to annualize daily statistics. Crypto markets trade every day.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Abramowitz and Stegun formula 7.1.26 coefficients for `erf`.
///
/// Maximum absolute error of the approximation is 1.5e-7.
const ERF_A1: f64 = 0.254_829_592;
const ERF_A2: f64 = -0.284_496_736;
const ERF_A3: f64 = 1.421_413_741;
const ERF_A4: f64 = -1.453_152_027;
const ERF_A5: f64 = 1.061_405_429;
const ERF_P: f64 = 0.327_591_1;

/// Approximation of the error function (Abramowitz and Stegun 7.1.26).
///
/// # Formula
/// ```text
/// t      = 1 / (1 + p·x)
/// erf(x) = 1 − (a1·t + a2·t² + a3·t³ + a4·t⁴ + a5·t⁵) · e^(−x²)      (x ≥ 0)
/// erf(−x) = −erf(x)
/// ```
#[must_use]
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ((((ERF_A5 * t + ERF_A4) * t + ERF_A3) * t + ERF_A2) * t + ERF_A1) * t;
    let y = 1.0 - poly * (-x * x).exp();

    sign * y
}

/// Standard normal cumulative distribution function.
///
/// Computed as `½(1 + erf(x/√2))` using the rational approximation in
/// [`erf`], so results are reproducible to the stated coefficients rather
/// than to a platform math library.
///
/// # Examples
/// ```
/// use yield_risk_core::stats::normal_cdf;
///
/// assert!((normal_cdf(0.0) - 0.5).abs() < 1.5e-7);
/// assert!(normal_cdf(1.96) > 0.97 && normal_cdf(1.96) < 0.98);
/// assert!(normal_cdf(-1.96) > 0.02 && normal_cdf(-1.96) < 0.03);
/// ```
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    let value = 0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2));
    value.clamp(0.0, 1.0)
}

/// Arithmetic mean, or 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by `n − 1`).
///
/// Returns 0.0 when fewer than two observations are available.
///
/// # Examples
/// ```
/// use yield_risk_core::stats::sample_std_dev;
///
/// let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
/// assert!((sd - 2.138_089_935).abs() < 1e-6);
/// ```
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mu = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Log returns `ln(p_i / p_{i-1})` of consecutive prices.
///
/// Pairs containing a non-positive or non-finite price are skipped.
#[must_use]
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0 && w[0].is_finite() && w[1].is_finite())
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// Scales a daily statistic to an annual one (`× √365`).
#[must_use]
pub fn annualize(daily_volatility: f64) -> f64 {
    daily_volatility * DAYS_PER_YEAR.sqrt()
}

/// Fraction of a year covered by `days`.
#[must_use]
pub fn year_fraction(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}
