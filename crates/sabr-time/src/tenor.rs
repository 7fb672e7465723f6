//! Market tenor strings.
//!
//! Option expiries and swap tenors are quoted as strings like `"3y"`,
//! `"18m"`, or `"90D"`.  `Tenor` parses them and orders them by their
//! approximate length in days, so grids keyed by tenor iterate in maturity
//! order.

use sabr_core::errors::{Error, Result};
use sabr_core::Real;

/// The unit of a tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenorUnit {
    /// Calendar days.
    Days,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

/// A market tenor: an amount and a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tenor {
    /// Number of units.
    pub amount: u32,
    /// The unit.
    pub unit: TenorUnit,
}

impl Tenor {
    /// A tenor of `n` days.
    pub fn days(n: u32) -> Self {
        Tenor {
            amount: n,
            unit: TenorUnit::Days,
        }
    }

    /// A tenor of `n` months.
    pub fn months(n: u32) -> Self {
        Tenor {
            amount: n,
            unit: TenorUnit::Months,
        }
    }

    /// A tenor of `n` years.
    pub fn years(n: u32) -> Self {
        Tenor {
            amount: n,
            unit: TenorUnit::Years,
        }
    }

    /// Parse a tenor string such as `"3y"`, `"18M"`, or `"90D"`
    /// (case-insensitive).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() < 2 {
            return Err(Error::Validation(format!("cannot parse tenor \"{s}\"")));
        }
        let (num, unit) = s.split_at(s.len() - 1);
        let amount: u32 = num
            .parse()
            .map_err(|_| Error::Validation(format!("cannot parse tenor \"{s}\"")))?;
        let unit = match unit.to_uppercase().as_str() {
            "D" => TenorUnit::Days,
            "M" => TenorUnit::Months,
            "Y" => TenorUnit::Years,
            _ => return Err(Error::Validation(format!("cannot parse tenor \"{s}\""))),
        };
        Ok(Tenor { amount, unit })
    }

    /// Approximate length in days, used for ordering and time axes.
    pub fn approx_days(&self) -> u32 {
        match self.unit {
            TenorUnit::Days => self.amount,
            TenorUnit::Months => self.amount * 30,
            TenorUnit::Years => self.amount * 365,
        }
    }

    /// Length in years (days / 365, months / 12, years as-is).
    pub fn in_years(&self) -> Real {
        match self.unit {
            TenorUnit::Days => self.amount as Real / 365.0,
            TenorUnit::Months => self.amount as Real / 12.0,
            TenorUnit::Years => self.amount as Real,
        }
    }
}

impl Default for Tenor {
    /// The zero tenor, used as the sentinel key for ATM-only calibrations
    /// quoted without an asset tenor.
    fn default() -> Self {
        Tenor::years(0)
    }
}

impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tenor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.approx_days()
            .cmp(&other.approx_days())
            .then_with(|| (self.unit as u8).cmp(&(other.unit as u8)))
    }
}

impl std::str::FromStr for Tenor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tenor::parse(s)
    }
}

impl std::fmt::Display for Tenor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match self.unit {
            TenorUnit::Days => "D",
            TenorUnit::Months => "M",
            TenorUnit::Years => "y",
        };
        write!(f, "{}{unit}", self.amount)
    }
}
