//! Raw pool record normalization.
//!
//! Upstream yield feeds disagree on field names, units and types. This module
//! maps any JSON object onto a canonical [`PoolRecord`], resolving volatility
//! through one ordered table of methods. Records with no derivable volatility
//! are dropped rather than defaulted, so every scored pool carries a real
//! risk figure.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use yield_risk_core::pool::{clamp_volatility, PoolRecord, VolatilitySource};

/// Weeks per year, used to annualize a 7-day price change.
const WEEKS_PER_YEAR: f64 = 52.0;
/// Daily volume/TVL ratio that must be exceeded before turnover is trusted.
const MIN_DAILY_TURNOVER: f64 = 0.01;
const TURNOVER_MULTIPLIER: f64 = 200.0;
const TURNOVER_CAP: f64 = 150.0;
/// Volatility assigned to single-sided stablecoin pools.
const STABILITY_POOL_VOLATILITY: f64 = 0.5;

const CURRENT_PRICE_FIELDS: &[&str] = &["price", "priceUsd", "currentPrice"];
const PAST_PRICE_FIELDS: &[&str] = &["price7dAgo", "pricePast", "price7d"];
const TVL_FIELDS: &[&str] = &["tvlUsd", "tvl"];
const VOLUME_7D_FIELDS: &[&str] = &["volumeUsd7d", "volume7d"];
const SYMBOL_FIELDS: &[&str] = &["symbol", "name"];
const POOL_ID_FIELDS: &[&str] = &["pool", "poolId", "pool_id"];

/// One way of deriving a volatility from a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityMethod {
    /// A volatility-like field, numeric or categorical.
    Field(&'static str),
    /// Annualized 7-day price change.
    PriceChange,
    /// Volume/TVL turnover proxy.
    Turnover,
    /// Single-sided stablecoin pools.
    StabilityPool,
}

/// Resolution order. The first method yielding a value wins.
pub const RESOLUTION_ORDER: &[VolatilityMethod] = &[
    VolatilityMethod::Field("il7d"),
    VolatilityMethod::Field("sigma"),
    VolatilityMethod::Field("volatility"),
    VolatilityMethod::Field("apyVolatility"),
    VolatilityMethod::Field("stdDev"),
    VolatilityMethod::Field("priceVolatility"),
    VolatilityMethod::PriceChange,
    VolatilityMethod::Turnover,
    VolatilityMethod::StabilityPool,
];

impl VolatilityMethod {
    /// Attempts this method against a record. Returns percentage points, unclamped.
    #[must_use]
    pub fn resolve(self, record: &Map<String, Value>) -> Option<(f64, VolatilitySource)> {
        match self {
            Self::Field(name) => {
                let value = record.get(name)?;
                let volatility = match as_number(value) {
                    Some(v) => round_dp(v.abs(), 2),
                    None => categorical_volatility(value.as_str()?)?,
                };
                Some((volatility, VolatilitySource::Field(name.to_string())))
            }
            Self::PriceChange => {
                let current = first_positive(record, CURRENT_PRICE_FIELDS)?;
                let past = first_positive(record, PAST_PRICE_FIELDS)?;
                let weekly_change = ((current - past) / past).abs();
                Some((
                    weekly_change * 100.0 * WEEKS_PER_YEAR.sqrt(),
                    VolatilitySource::CalculatedFromPrice,
                ))
            }
            Self::Turnover => {
                let volume_7d = first_positive(record, VOLUME_7D_FIELDS)?;
                let tvl = first_positive(record, TVL_FIELDS)?;
                let daily_turnover = (volume_7d / 7.0) / tvl;
                if daily_turnover <= MIN_DAILY_TURNOVER {
                    return None;
                }
                Some((
                    (TURNOVER_MULTIPLIER * daily_turnover).min(TURNOVER_CAP),
                    VolatilitySource::VolumeTvlEstimation,
                ))
            }
            Self::StabilityPool => {
                let stable = record.get("stablecoin").and_then(Value::as_bool)?;
                let single = record
                    .get("exposure")
                    .and_then(Value::as_str)
                    .is_some_and(|e| e.eq_ignore_ascii_case("single"));
                (stable && single)
                    .then_some((STABILITY_POOL_VOLATILITY, VolatilitySource::StabilityPoolDefault))
            }
        }
    }
}

/// Why a raw record produced no pool.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("no volatility could be derived")]
    NoDerivableVolatility,
}

/// A raw record that was excluded from scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRecord {
    /// Position in the input batch.
    pub index: usize,
    pub symbol: Option<String>,
    pub reason: DropReason,
}

/// Output of [`normalize_all`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Normalized pools, in input order.
    pub records: Vec<PoolRecord>,
    pub dropped: Vec<DroppedRecord>,
}

/// Normalizes one raw record.
///
/// # Errors
///
/// Returns a [`DropReason`] when the record is not an object or no
/// volatility can be derived from it.
pub fn normalize(raw: &Value) -> Result<PoolRecord, DropReason> {
    let record = raw.as_object().ok_or(DropReason::NotAnObject)?;

    let (volatility, source) =
        resolve_volatility(record).ok_or(DropReason::NoDerivableVolatility)?;

    Ok(PoolRecord {
        symbol: symbol_of(record).unwrap_or_else(|| "UNKNOWN".to_string()),
        apy: record
            .get("apy")
            .and_then(as_number)
            .map(|apy| round_dp(apy / 100.0, 3)),
        volatility: Some(volatility),
        volatility_source: Some(source),
        tvl: first_number(record, TVL_FIELDS),
        volume_usd_7d: first_number(record, VOLUME_7D_FIELDS),
        pool_id: first_string(record, POOL_ID_FIELDS),
    })
}

/// Normalizes a batch, keeping input order and collecting drops.
#[must_use]
pub fn normalize_all(raws: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                let symbol = raw.as_object().and_then(symbol_of);
                debug!(index, symbol = ?symbol, %reason, "Dropping pool record");
                batch.dropped.push(DroppedRecord {
                    index,
                    symbol,
                    reason,
                });
            }
        }
    }

    info!(
        kept = batch.records.len(),
        dropped = batch.dropped.len(),
        "Normalized pool records"
    );
    batch
}

/// Runs [`RESOLUTION_ORDER`] and clamps the winner into the plausible band.
#[must_use]
pub fn resolve_volatility(record: &Map<String, Value>) -> Option<(f64, VolatilitySource)> {
    RESOLUTION_ORDER.iter().find_map(|method| {
        let (raw, source) = method.resolve(record)?;
        if !raw.is_finite() {
            return None;
        }
        let clamped = clamp_volatility(raw);
        if (clamped - raw).abs() > f64::EPSILON {
            debug!(raw, clamped, %source, "Clamped volatility");
        }
        Some((clamped, source))
    })
}

/// Maps a categorical volatility label onto percentage points.
fn categorical_volatility(label: &str) -> Option<f64> {
    match label.trim().to_ascii_lowercase().as_str() {
        "low" => Some(10.0),
        "medium" => Some(25.0),
        "high" => Some(50.0),
        "very high" => Some(80.0),
        "extreme" => Some(120.0),
        _ => None,
    }
}

/// Reads a finite number from a JSON number or numeric string.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn first_number(record: &Map<String, Value>, fields: &[&str]) -> Option<f64> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(as_number))
}

fn first_positive(record: &Map<String, Value>, fields: &[&str]) -> Option<f64> {
    first_number(record, fields).filter(|v| *v > 0.0)
}

fn first_string(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        record
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}

fn symbol_of(record: &Map<String, Value>) -> Option<String> {
    first_string(record, SYMBOL_FIELDS)
}

/// Rounds half away from zero at `dp` decimal places.
///
/// Goes through `Decimal` so that e.g. 0.1235 rounds to 0.124 rather than
/// to whatever its binary representation happens to favour.
fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
