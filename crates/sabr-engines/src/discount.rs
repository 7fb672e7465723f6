//! Discount curves over day offsets.
//!
//! The bootstrappers receive discount factors on quoted dates and need
//! factors and forwards at arbitrary schedule dates.  Interpolation is
//! log-linear in the day offset from the valuation date, with the factor
//! pinned to 1 at offset zero.

use sabr_core::errors::Result;
use sabr_core::{DiscountFactor, Rate, Real};
use sabr_math::interpolation::{Interpolation1D, LogLinearInterpolation};
use sabr_time::{Actual365Fixed, Date, DayCounter};

/// A discount curve anchored at a valuation date.
#[derive(Debug, Clone)]
pub struct DiscountCurve {
    valuation_date: Date,
    interp: LogLinearInterpolation,
    max_offset: Real,
}

impl DiscountCurve {
    /// Build the curve from quoted `(date, factor)` pairs.
    ///
    /// Dates on or before the valuation date are dropped; a synthetic node
    /// with factor 1 at offset zero anchors the short end.
    ///
    /// # Errors
    /// Fails when no quoted date lies after the valuation date or a factor
    /// is not in `(0, 1]`.
    pub fn new(valuation_date: Date, dates: &[Date], factors: &[DiscountFactor]) -> Result<Self> {
        sabr_core::ensure!(
            dates.len() == factors.len(),
            "dates and discount factors must have equal length ({} vs {})",
            dates.len(),
            factors.len()
        );
        sabr_core::ensure!(
            factors.iter().all(|&df| df > 0.0 && df <= 1.0),
            "discount factors must lie in (0, 1]"
        );

        let mut nodes: Vec<(Real, Real)> = vec![(0.0, 1.0)];
        for (&d, &df) in dates.iter().zip(factors.iter()) {
            let offset = valuation_date.days_until(d);
            if offset > 0 {
                nodes.push((offset as Real, df));
            }
        }
        sabr_core::ensure!(
            nodes.len() >= 2,
            "no discount factor quoted after the valuation date {valuation_date}"
        );
        nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
        nodes.dedup_by(|a, b| a.0 == b.0);

        let xs: Vec<Real> = nodes.iter().map(|n| n.0).collect();
        let ys: Vec<Real> = nodes.iter().map(|n| n.1).collect();
        let max_offset = xs[xs.len() - 1];
        Ok(Self {
            valuation_date,
            interp: LogLinearInterpolation::new(&xs, &ys)?,
            max_offset,
        })
    }

    /// The curve's valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Discount factor at `date`.
    ///
    /// # Errors
    /// Fails for dates before the valuation date.
    pub fn discount_factor(&self, date: Date) -> Result<DiscountFactor> {
        let offset = self.valuation_date.days_until(date);
        sabr_core::ensure!(
            offset >= 0,
            "discount factor requested at {date}, before the valuation date {}",
            self.valuation_date
        );
        Ok(self.interp.value_at(offset as Real))
    }

    /// Day offset of the last quoted node.
    pub fn max_offset_days(&self) -> Real {
        self.max_offset
    }

    /// Simple forward rate over `[start, end]` with an ACT/365 accrual.
    ///
    /// `forward = (df(start) - df(end)) / (τ · df(end))`; a zero-length
    /// period yields 0.
    ///
    /// # Errors
    /// Fails when the implied forward is negative, which signals an
    /// inconsistent discount grid.
    pub fn forward_rate(&self, start: Date, end: Date) -> Result<Rate> {
        if start == end {
            return Ok(0.0);
        }
        sabr_core::ensure!(start < end, "forward period {start} to {end} is inverted");
        let tau = Actual365Fixed.year_fraction(start, end);
        let df_start = self.discount_factor(start)?;
        let df_end = self.discount_factor(end)?;
        let forward = (df_start - df_end) / (tau * df_end);
        if forward < 0.0 {
            sabr_core::fail!(
                "negative forward rate {forward} over {start} to {end}"
            );
        }
        Ok(forward)
    }
}
