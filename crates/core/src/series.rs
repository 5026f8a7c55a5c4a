//! Validated price history.

use crate::error::SeriesError;
use crate::stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation of a price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Prices ordered strictly by time. Lives only for one analysis run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting unordered timestamps and non-positive prices.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError`] naming the first offending index.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    index,
                    price: point.price,
                });
            }
            if index > 0 && point.timestamp <= points[index - 1].timestamp {
                return Err(SeriesError::NotIncreasing { index });
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from `(timestamp, price)` pairs.
    ///
    /// # Errors
    ///
    /// See [`PriceSeries::new`].
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Result<Self, SeriesError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, price)| PricePoint { timestamp, price })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Log returns between consecutive observations.
    #[must_use]
    pub fn log_returns(&self) -> Vec<f64> {
        stats::log_returns(&self.prices())
    }

    /// Timestamp of the most recent observation.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn accepts_ordered_positive_prices() {
        let series = PriceSeries::from_pairs([(day(0), 1.0), (day(1), 1.1), (day(2), 1.05)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.log_returns().len(), 2);
        assert_eq!(series.last_timestamp(), Some(day(2)));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = PriceSeries::from_pairs([(day(0), 1.0), (day(0), 1.1)]).unwrap_err();
        assert_eq!(err, SeriesError::NotIncreasing { index: 1 });
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = PriceSeries::from_pairs([(day(0), 1.0), (day(1), 0.0)]).unwrap_err();
        assert_eq!(err, SeriesError::InvalidPrice { index: 1, price: 0.0 });
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.log_returns().is_empty());
    }
}
