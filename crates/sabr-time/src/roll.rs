//! Business-day roll conventions.
//!
//! The bootstrappers generate quarterly roll schedules whose dates must fall
//! on a good business day.  Only a weekend calendar is applied here; the
//! quoted market data already embeds any holiday adjustment.

use crate::date::Date;
use sabr_core::errors::{Error, Result};

/// How a schedule date falling on a non-business day is adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollConvention {
    /// No adjustment.
    None,
    /// Move forward to the next business day.
    Following,
    /// Move forward unless that crosses a month end, in which case move back.
    #[default]
    ModifiedFollowing,
    /// Move back to the previous business day.
    Preceding,
    /// Move back unless that crosses a month start, in which case move forward.
    ModifiedPreceding,
}

impl RollConvention {
    /// Parse a roll-convention token as quoted in market data.
    ///
    /// Accepted tokens (case-insensitive): `NONE`, `FOLLOWING`,
    /// `MODFOLLOWING`, `PRECEDING`, `MODPRECEDING`.
    ///
    /// # Errors
    /// Any other token yields a validation error whose message names it.
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_uppercase().as_str() {
            "NONE" => Ok(RollConvention::None),
            "FOLLOWING" => Ok(RollConvention::Following),
            "MODFOLLOWING" => Ok(RollConvention::ModifiedFollowing),
            "PRECEDING" => Ok(RollConvention::Preceding),
            "MODPRECEDING" => Ok(RollConvention::ModifiedPreceding),
            _ => Err(Error::Validation(format!(
                "Unknown roll convention {token} specified."
            ))),
        }
    }

    /// Adjust `date` to a business day according to this convention.
    pub fn adjust(&self, date: Date) -> Result<Date> {
        match self {
            RollConvention::None => Ok(date),
            RollConvention::Following => next_business_day(date),
            RollConvention::Preceding => previous_business_day(date),
            RollConvention::ModifiedFollowing => {
                let adjusted = next_business_day(date)?;
                if adjusted.month() != date.month() {
                    previous_business_day(date)
                } else {
                    Ok(adjusted)
                }
            }
            RollConvention::ModifiedPreceding => {
                let adjusted = previous_business_day(date)?;
                if adjusted.month() != date.month() {
                    next_business_day(date)
                } else {
                    Ok(adjusted)
                }
            }
        }
    }
}

fn next_business_day(mut date: Date) -> Result<Date> {
    while date.weekday().is_weekend() {
        date = date.add_days(1)?;
    }
    Ok(date)
}

fn previous_business_day(mut date: Date) -> Result<Date> {
    while date.weekday().is_weekend() {
        date = date.add_days(-1)?;
    }
    Ok(date)
}
