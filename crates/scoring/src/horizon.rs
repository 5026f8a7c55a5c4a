//! Scaling of annual figures onto the analysis horizon.

use yield_risk_core::stats::year_fraction;
use yield_risk_core::LiquidationBasis;

/// Compounds an annual rate (decimal) down to `days`.
///
/// `APR_Δ = (1 + μ)^(Δ/365) − 1`. A rate at or below −100% returns −1.0.
///
/// # Examples
///
/// ```
/// use yield_risk_scoring::horizon_return;
///
/// assert!((horizon_return(0.10, 365.0) - 0.10).abs() < 1e-12);
/// assert!(horizon_return(0.10, 7.0) < 0.10 * 7.0 / 365.0);
/// ```
#[must_use]
pub fn horizon_return(annual_rate: f64, days: f64) -> f64 {
    let growth = 1.0 + annual_rate;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(year_fraction(days)) - 1.0
}

/// Scales an annual volatility in percentage points to a decimal horizon volatility.
///
/// `σ_Δ = (volatility / 100) × √(Δ/365)`.
#[must_use]
pub fn horizon_volatility(volatility_pct: f64, days: f64) -> f64 {
    (volatility_pct / 100.0) * year_fraction(days.max(0.0)).sqrt()
}

/// Converts a flat liquidation probability onto the horizon.
///
/// Under [`LiquidationBasis::Annual`] the probability is compounded down,
/// `1 − (1 − p)^(Δ/365)`. Under [`LiquidationBasis::Horizon`] it is already
/// a horizon probability and is returned unchanged.
#[must_use]
pub fn horizon_liquidation_probability(
    probability: f64,
    basis: LiquidationBasis,
    days: f64,
) -> f64 {
    let probability = probability.clamp(0.0, 1.0);
    match basis {
        LiquidationBasis::Horizon => probability,
        LiquidationBasis::Annual => 1.0 - (1.0 - probability).powf(year_fraction(days.max(0.0))),
    }
}
