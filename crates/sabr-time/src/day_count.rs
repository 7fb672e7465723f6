//! Day-count conventions.
//!
//! A day counter computes the fraction of a year between two dates, used
//! when discounting caplet payoffs or locating a caplet expiry in time.

use crate::date::Date;
use sabr_core::{Real, Time};

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64;

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;
}

/// Actual/365 (Fixed) day counter.
///
/// `year_fraction = actual_days / 365`
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2.serial() - d1.serial()) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act365_quarter() {
        let d1 = Date::from_ymd(2008, 5, 8).unwrap();
        let d2 = Date::from_ymd(2008, 8, 8).unwrap();
        let dc = Actual365Fixed;
        assert_eq!(dc.day_count(d1, d2), 92);
        assert!((dc.year_fraction(d1, d2) - 92.0 / 365.0).abs() < 1e-15);
    }
}
