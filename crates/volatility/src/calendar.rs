use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Calendar effects on expected volatility.
///
/// Weekends trade thinner (dampened), month ends carry rebalancing and
/// expiry flows (amplified). Both effects compose multiplicatively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroCalendar {
    pub weekend_multiplier: f64,
    pub month_end_multiplier: f64,
    /// First day of month counted as month end.
    pub month_end_day: u32,
}

impl Default for MacroCalendar {
    fn default() -> Self {
        Self {
            weekend_multiplier: 0.9,
            month_end_multiplier: 1.1,
            month_end_day: 28,
        }
    }
}

impl MacroCalendar {
    #[must_use]
    pub fn is_weekend(date: DateTime<Utc>) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    #[must_use]
    pub fn is_month_end(&self, date: DateTime<Utc>) -> bool {
        date.day() >= self.month_end_day
    }

    /// Combined multiplier for an as-of date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use yield_risk_volatility::MacroCalendar;
    ///
    /// // Wednesday 2025-01-15
    /// let date = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
    /// assert_eq!(MacroCalendar::default().multiplier(date), 1.0);
    /// ```
    #[must_use]
    pub fn multiplier(&self, date: DateTime<Utc>) -> f64 {
        let mut multiplier = 1.0;
        if Self::is_weekend(date) {
            multiplier *= self.weekend_multiplier;
        }
        if self.is_month_end(date) {
            multiplier *= self.month_end_multiplier;
        }
        multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn weekday_mid_month_is_neutral() {
        // Tuesday
        let m = MacroCalendar::default().multiplier(date(2025, 3, 11));
        assert!((m - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekend_dampens() {
        // Saturday and Sunday
        let calendar = MacroCalendar::default();
        assert!((calendar.multiplier(date(2025, 3, 15)) - 0.9).abs() < 1e-12);
        assert!((calendar.multiplier(date(2025, 3, 16)) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn month_end_amplifies() {
        // Friday 2025-02-28
        let m = MacroCalendar::default().multiplier(date(2025, 2, 28));
        assert!((m - 1.1).abs() < 1e-12);
    }

    #[test]
    fn weekend_month_end_composes() {
        // Saturday 2025-03-29
        let m = MacroCalendar::default().multiplier(date(2025, 3, 29));
        assert!((m - 0.99).abs() < 1e-12, "multiplier was {m}");
    }

    #[test]
    fn day_27_is_not_month_end() {
        // Thursday 2025-03-27
        assert!(!MacroCalendar::default().is_month_end(date(2025, 3, 27)));
    }
}
