//! Serial-number calendar date.
//!
//! Dates are stored as a count of days since an epoch: serial 1 is
//! January 1, 1900.  The valid range is 1900-01-01 to 2199-12-31, which
//! comfortably covers every cap/floor maturity the bootstrappers see.

use sabr_core::errors::{Error, Result};

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// Return `true` for Saturday and Sunday.
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

/// A calendar date represented as a serial number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(i32);

impl Date {
    /// Maximum valid date: December 31, 2199.
    pub const MAX: Date = Date(109_573);

    // ── Constructors ─────────────────────────────────────────────────────────

    /// Create a date from a serial number (1 = 1900-01-01).
    pub fn from_serial(serial: i32) -> Result<Self> {
        if serial <= 0 {
            return Err(Error::Date("serial number must be positive".into()));
        }
        let d = Date(serial);
        if d > Self::MAX {
            return Err(Error::Date(format!("serial {serial} exceeds maximum date")));
        }
        Ok(d)
    }

    /// Create a date from year, month (1–12), and day-of-month (1–31).
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        if !(1900..=2199).contains(&year) {
            return Err(Error::Date(format!("year {year} out of range [1900, 2199]")));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::Date(format!("month {month} out of range [1, 12]")));
        }
        let days_in = days_in_month(year, month);
        if day == 0 || day > days_in {
            return Err(Error::Date(format!(
                "day {day} out of range [1, {days_in}] for {year}-{month:02}"
            )));
        }
        Ok(Date(serial_from_ymd(year, month, day)))
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Return the serial number.
    pub fn serial(&self) -> i32 {
        self.0
    }

    /// Return the year (1900–2199).
    pub fn year(&self) -> u16 {
        ymd_from_serial(self.0).0
    }

    /// Return the month (1–12).
    pub fn month(&self) -> u8 {
        ymd_from_serial(self.0).1
    }

    /// Return the day of the month (1–31).
    pub fn day_of_month(&self) -> u8 {
        ymd_from_serial(self.0).2
    }

    /// Return the weekday.
    pub fn weekday(&self) -> Weekday {
        // Serial 1 (Jan 1, 1900) is a Monday.
        match (self.0 - 1).rem_euclid(7) {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// Advance by `n` calendar days.
    pub fn add_days(self, n: i32) -> Result<Self> {
        let serial = self.0 + n;
        if serial <= 0 || Date(serial) > Self::MAX {
            return Err(Error::Date(format!(
                "date arithmetic: result {serial} out of range"
            )));
        }
        Ok(Date(serial))
    }

    /// Advance by `n` calendar months, clamping the day to the end of the
    /// target month (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(self, n: i32) -> Result<Self> {
        let (y, m, d) = ymd_from_serial(self.0);
        let total_months = m as i32 + n;
        let full_years = total_months.div_euclid(12);
        let rem_months = total_months.rem_euclid(12);
        let (new_m, extra_y) = if rem_months == 0 {
            (12u8, full_years - 1)
        } else {
            (rem_months as u8, full_years)
        };
        let new_y = y as i32 + extra_y;
        if !(1900..=2199).contains(&new_y) {
            return Err(Error::Date(format!("year {new_y} out of range")));
        }
        let new_y = new_y as u16;
        let new_d = d.min(days_in_month(new_y, new_m));
        Ok(Date(serial_from_ymd(new_y, new_m, new_d)))
    }

    /// Number of calendar days from `self` to `other` (positive if
    /// `other > self`).
    pub fn days_until(self, other: Date) -> i32 {
        other.0 - self.0
    }
}

// ── Arithmetic operators ──────────────────────────────────────────────────────

impl std::ops::Sub<Date> for Date {
    type Output = i32;
    fn sub(self, rhs: Date) -> i32 {
        self.0 - rhs.0
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "Date({y:04}-{m:02}-{d:02})")
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Whether a given year is a leap year.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a given month/year.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    debug_assert!((1..=12).contains(&month));
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!(),
    }
}

/// Cumulative day-of-year offset at the start of each month (non-leap).
const MONTH_OFFSET: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Convert (year, month, day) to a serial number (1 = 1900-01-01).
fn serial_from_ymd(year: u16, month: u8, day: u8) -> i32 {
    let y = year as i32;
    let m = month as i32;
    let d = day as i32;

    let mut serial = (y - 1900) * 365;
    // Leap days in [1900, year)
    serial += (y - 1901) / 4 - (y - 1901) / 100 + (y - 1601) / 400;
    serial += MONTH_OFFSET[m as usize - 1] as i32;
    if m > 2 && is_leap_year(year) {
        serial += 1;
    }
    serial += d;
    serial
}

/// Decompose a serial number into (year, month, day).
fn ymd_from_serial(serial: i32) -> (u16, u8, u8) {
    let mut y = (serial / 365 + 1900) as u16;
    loop {
        let start_of_year = serial_from_ymd(y, 1, 1);
        if serial < start_of_year {
            y -= 1;
        } else if serial >= serial_from_ymd(y + 1, 1, 1) {
            y += 1;
        } else {
            break;
        }
    }
    let start_of_year = serial_from_ymd(y, 1, 1);
    let doy = serial - start_of_year + 1;
    let mut m = 1u8;
    let mut remaining = doy;
    loop {
        let days = days_in_month(y, m) as i32;
        if remaining <= days {
            break;
        }
        remaining -= days;
        m += 1;
    }
    (y, m, remaining as u8)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch() {
        let d = Date::from_ymd(1900, 1, 1).unwrap();
        assert_eq!(d.serial(), 1);
    }

    #[test]
    fn ymd_roundtrip() {
        let dates = [
            (1900, 1, 1),
            (1900, 12, 31),
            (2000, 2, 29), // leap
            (2100, 2, 28), // non-leap century
            (2007, 11, 29),
            (2011, 8, 9),
            (2199, 12, 31),
        ];
        for (y, m, d) in dates {
            let date = Date::from_ymd(y, m, d).unwrap();
            assert_eq!(date.year(), y, "year mismatch for {y}-{m:02}-{d:02}");
            assert_eq!(date.month(), m, "month mismatch for {y}-{m:02}-{d:02}");
            assert_eq!(date.day_of_month(), d, "day mismatch for {y}-{m:02}-{d:02}");
        }
    }

    #[test]
    fn weekday() {
        // 2007-11-29 is a Thursday
        let d = Date::from_ymd(2007, 11, 29).unwrap();
        assert_eq!(d.weekday(), Weekday::Thursday);
        // 2008-05-10 is a Saturday
        let d2 = Date::from_ymd(2008, 5, 10).unwrap();
        assert_eq!(d2.weekday(), Weekday::Saturday);
        assert!(d2.weekday().is_weekend());
    }

    #[test]
    fn add_months_clamps() {
        let d = Date::from_ymd(2023, 1, 31).unwrap();
        let next = d.add_months(1).unwrap();
        assert_eq!(next.month(), 2);
        assert_eq!(next.day_of_month(), 28);
    }

    #[test]
    fn quarterly_roll_dates() {
        let d = Date::from_ymd(2008, 5, 8).unwrap();
        let q1 = d.add_months(3).unwrap();
        assert_eq!((q1.year(), q1.month(), q1.day_of_month()), (2008, 8, 8));
        let q4 = d.add_months(12).unwrap();
        assert_eq!((q4.year(), q4.month(), q4.day_of_month()), (2009, 5, 8));
    }

    #[test]
    fn day_differences() {
        let d1 = Date::from_ymd(2008, 5, 8).unwrap();
        let d2 = Date::from_ymd(2008, 8, 8).unwrap();
        assert_eq!(d2 - d1, 92);
        assert_eq!(d1.days_until(d2), 92);
    }

    #[test]
    fn invalid_dates_rejected() {
        assert!(Date::from_ymd(1899, 12, 31).is_err());
        assert!(Date::from_ymd(2023, 2, 29).is_err());
        assert!(Date::from_ymd(2023, 13, 1).is_err());
        assert!(Date::from_serial(0).is_err());
    }
}
