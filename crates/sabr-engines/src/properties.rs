//! Typed bootstrap configuration.
//!
//! The bootstrappers are driven by a property set quoted alongside the
//! market data.  The fields the engines act on are typed and validated at
//! construction; anything else callers want to carry (quote units, market
//! names, diagnostics) goes into an opaque string map that the engines
//! never interpret.

use std::collections::HashMap;

use sabr_core::errors::Result;
use sabr_core::Real;
use sabr_time::{Date, RollConvention, Tenor};

/// Configuration for one caplet bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapProperties {
    /// Index instrument the quotes reference (e.g. "AUD-Xibor-3M").
    pub instrument: String,
    /// Quote currency.
    pub currency: String,
    /// Anchor date of the quoted curve.
    pub base_date: Date,
    /// Valuation date; defaults to the base date.
    pub valuation_date: Date,
    /// Tenor of the underlying index (default 3M, the cap roll frequency).
    pub index_tenor: Tenor,
    /// Business-day adjustment for generated roll dates.
    pub roll_convention: RollConvention,
    /// Handle the bootstrapped curve is stored under.
    pub engine_handle: String,
    /// Optional handle of an associated settings object.
    pub settings_handle: Option<String>,
    /// Optional strike an ATM curve's volatility query answers for in
    /// addition to zero.
    pub strike: Option<Real>,
    /// Opaque pass-through values the engines never interpret.
    pub extras: HashMap<String, String>,
}

impl BootstrapProperties {
    /// Create properties for `instrument` in `currency` anchored at
    /// `base_date`, with defaults for everything else.
    pub fn new(
        instrument: impl Into<String>,
        currency: impl Into<String>,
        base_date: Date,
        engine_handle: impl Into<String>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            currency: currency.into(),
            base_date,
            valuation_date: base_date,
            index_tenor: Tenor::months(3),
            roll_convention: RollConvention::ModifiedFollowing,
            engine_handle: engine_handle.into(),
            settings_handle: None,
            strike: None,
            extras: HashMap::new(),
        }
    }

    /// Override the engine handle.
    pub fn set_engine_handle(&mut self, handle: impl Into<String>) {
        self.engine_handle = handle.into();
    }

    /// Override the valuation date.
    pub fn set_valuation_date(&mut self, date: Date) {
        self.valuation_date = date;
    }

    /// Set the strike override.
    pub fn set_strike(&mut self, strike: Real) {
        self.strike = Some(strike);
    }

    /// Set the roll convention from its quoted token.
    ///
    /// # Errors
    /// Unknown tokens fail with the token named in the message.
    pub fn set_roll_convention(&mut self, token: &str) -> Result<()> {
        self.roll_convention = RollConvention::parse(token)?;
        Ok(())
    }

    /// Caplet rolls per year implied by the index tenor (4 for a 3M index).
    pub fn rolls_per_year(&self) -> u32 {
        (1.0 / self.index_tenor.in_years()).round().max(1.0) as u32
    }

    /// Months between consecutive rolls.
    pub fn months_per_roll(&self) -> u32 {
        (12 / self.rolls_per_year()).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> BootstrapProperties {
        BootstrapProperties::new(
            "AUD-Xibor-3M",
            "AUD",
            Date::from_ymd(2008, 5, 8).unwrap(),
            "ATM CapFloor Engine",
        )
    }

    #[test]
    fn defaults() {
        let p = props();
        assert_eq!(p.valuation_date, p.base_date);
        assert_eq!(p.index_tenor, Tenor::months(3));
        assert_eq!(p.roll_convention, RollConvention::ModifiedFollowing);
        assert!(p.strike.is_none());
    }

    #[test]
    fn quarterly_frequency() {
        let p = props();
        assert_eq!(p.rolls_per_year(), 4);
        assert_eq!(p.months_per_roll(), 3);
    }

    #[test]
    fn semiannual_frequency() {
        let mut p = props();
        p.index_tenor = Tenor::months(6);
        assert_eq!(p.rolls_per_year(), 2);
        assert_eq!(p.months_per_roll(), 6);
    }

    #[test]
    fn roll_convention_validation() {
        let mut p = props();
        assert!(p.set_roll_convention("FOLLOWING").is_ok());
        let err = p.set_roll_convention("MODBANANAS").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown roll convention MODBANANAS specified."
        );
    }

    #[test]
    fn mutators() {
        let mut p = props();
        p.set_engine_handle("Other");
        p.set_strike(0.05);
        let v = Date::from_ymd(2007, 11, 29).unwrap();
        p.set_valuation_date(v);
        assert_eq!(p.engine_handle, "Other");
        assert_eq!(p.strike, Some(0.05));
        assert_eq!(p.valuation_date, v);
    }
}
