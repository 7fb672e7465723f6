//! Handle-keyed engine registries.
//!
//! Callers drive the library through string handles: calibrations are
//! stored under the handle they were created with and every query names
//! the handle it wants.  `Engines` groups one registry per engine kind and
//! exposes the string-facing operations; the typed engines themselves live
//! in the sibling modules.

use std::sync::Arc;

use sabr_core::errors::Result;
use sabr_core::{Rate, Real, Registry, Time, Volatility};
use sabr_time::{Date, Tenor};

use crate::caplet::CapletCurve;
use crate::properties::BootstrapProperties;
use crate::settings::{CalibrationSettings, SmileSettings};
use crate::smile::CapletSmileSurface;
use crate::swaption::{CalibrationParameter, ForwardGrid, SwaptionCalibration};

/// The sentinel returned by [`Engines::list_caplet_engines`] when nothing
/// has been bootstrapped yet.
pub const NO_SURFACES: &str = "No SABR Volatility Surfaces located.";

/// All engine registries, grouped for injection into calling code.
#[derive(Debug, Default)]
pub struct Engines {
    calibration_settings: Registry<CalibrationSettings>,
    swaptions: Registry<SwaptionCalibration>,
    atm_curves: Registry<CapletCurve>,
    fixed_curves: Registry<CapletCurve>,
    smile_settings: Registry<SmileSettings>,
    smiles: Registry<CapletSmileSurface>,
}

impl Engines {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every stored engine and settings object.
    pub fn reset(&self) {
        self.calibration_settings.reset();
        self.swaptions.reset();
        self.atm_curves.reset();
        self.fixed_curves.reset();
        self.smile_settings.reset();
        self.smiles.reset();
    }

    // ── Swaption calibration ─────────────────────────────────────────────

    /// Store calibration settings under `handle`.
    pub fn add_calibration_settings(
        &self,
        handle: &str,
        instrument: &str,
        currency: &str,
        beta: Real,
    ) -> Result<()> {
        let settings = CalibrationSettings::new(instrument, currency, beta)?;
        self.calibration_settings.add(handle, settings);
        Ok(())
    }

    fn settings(&self, handle: &str) -> Result<Arc<CalibrationSettings>> {
        match self.calibration_settings.get(handle) {
            Some(s) => Ok(s),
            None => sabr_core::not_found!("Calibration Settings {handle} not found."),
        }
    }

    /// Calibrate a full swaption smile engine and store it under
    /// `engine_handle`, which is returned on success.
    ///
    /// `vols[i][j]` quotes `expiries[i]` at `strike_offsets[j]`;
    /// `forwards[i][j]` quotes `asset_expiries[i]` against
    /// `asset_tenors[j]`.  All tenor axes are quoted strings like `"3y"`.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate_sabr_model(
        &self,
        engine_handle: &str,
        settings_handle: &str,
        expiries: &[&str],
        strike_offsets: &[Real],
        vols: &[Vec<Volatility>],
        asset_expiries: &[&str],
        asset_tenors: &[&str],
        forwards: &[Vec<Rate>],
    ) -> Result<String> {
        let settings = self.settings(settings_handle)?;
        let expiries = parse_tenors(expiries)?;
        let grid = ForwardGrid::new(
            &parse_tenors(asset_expiries)?,
            &parse_tenors(asset_tenors)?,
            forwards,
        )?;
        let engine =
            SwaptionCalibration::calibrate_smile(&settings, &expiries, strike_offsets, vols, &grid)?;
        self.swaptions.add(engine_handle, engine);
        Ok(engine_handle.to_string())
    }

    /// Calibrate an ATM swaption engine from a single quote and store it
    /// under `engine_handle`, which is returned on success.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate_sabr_atm_model(
        &self,
        engine_handle: &str,
        settings_handle: &str,
        nu: Real,
        rho: Real,
        atm_volatility: Volatility,
        asset_price: Rate,
        expiry: &str,
        tenor: Option<&str>,
    ) -> Result<String> {
        let settings = self.settings(settings_handle)?;
        let tenor = tenor.map(Tenor::parse).transpose()?;
        let engine = SwaptionCalibration::calibrate_atm(
            &settings,
            nu,
            rho,
            atm_volatility,
            asset_price,
            Tenor::parse(expiry)?,
            tenor,
        )?;
        self.swaptions.add(engine_handle, engine);
        Ok(engine_handle.to_string())
    }

    fn swaption(&self, handle: &str) -> Result<Arc<SwaptionCalibration>> {
        match self.swaptions.get(handle) {
            Some(e) => Ok(e),
            None => sabr_core::not_found!("Calibration Engine {handle} not found."),
        }
    }

    /// Whether a query at (expiry, tenor) resolves to a node of `handle`
    /// (an ATM engine matches on the expiry alone).  Missing engines and
    /// unparsable tenors answer `false`, never an error.
    pub fn is_model_calibrated(&self, handle: &str, expiry: &str, tenor: &str) -> bool {
        let (Ok(e), Ok(t)) = (Tenor::parse(expiry), Tenor::parse(tenor)) else {
            return false;
        };
        self.swaptions
            .get(handle)
            .map(|engine| engine.is_calibrated(e, t))
            .unwrap_or(false)
    }

    /// A calibrated SABR parameter from engine `handle`.  `parameter`
    /// names it as quoted: `"Alpha"`, `"Beta"`, `"Nu"`, or `"Rho"`.
    pub fn sabr_parameter(
        &self,
        parameter: &str,
        handle: &str,
        expiry: &str,
        tenor: &str,
    ) -> Result<Real> {
        let which = CalibrationParameter::parse(parameter)?;
        self.swaption(handle)?
            .parameter(which, Tenor::parse(expiry)?, Tenor::parse(tenor)?)
    }

    /// The calibration error reported by engine `handle` at (expiry, tenor).
    pub fn sabr_calibration_error(&self, handle: &str, expiry: &str, tenor: &str) -> Result<Real> {
        self.swaption(handle)?
            .calibration_error(Tenor::parse(expiry)?, Tenor::parse(tenor)?)
    }

    /// An interpolated swaption volatility from engine `handle`.
    pub fn sabr_interpolate_volatility(
        &self,
        handle: &str,
        expiry: &str,
        tenor: &str,
        strike: Real,
    ) -> Result<Volatility> {
        self.swaption(handle)?
            .interpolate_volatility(Tenor::parse(expiry)?, Tenor::parse(tenor)?, strike)
    }

    // ── Caplet bootstrapping ─────────────────────────────────────────────

    /// Bootstrap a fixed-strike caplet curve and store it under the handle
    /// carried by `properties`, which is returned on success.
    pub fn create_cap_floor_curve(
        &self,
        properties: BootstrapProperties,
        instruments: &[&str],
        strikes: &[Real],
        vols: &[Vec<Volatility>],
        discount_dates: &[Date],
        discount_factors: &[Real],
    ) -> Result<String> {
        let handle = properties.engine_handle.clone();
        let curve = CapletCurve::bootstrap_fixed(
            properties,
            instruments,
            strikes,
            vols,
            discount_dates,
            discount_factors,
        )?;
        self.fixed_curves.add(&handle, curve);
        Ok(handle)
    }

    /// Bootstrap an ATM caplet curve and store it under the handle carried
    /// by `properties`, which is returned on success.
    pub fn create_atm_cap_floor_curve(
        &self,
        properties: BootstrapProperties,
        instruments: &[&str],
        vols: &[Volatility],
        discount_dates: &[Date],
        discount_factors: &[Real],
    ) -> Result<String> {
        let handle = properties.engine_handle.clone();
        let curve = CapletCurve::bootstrap_atm(
            properties,
            instruments,
            vols,
            discount_dates,
            discount_factors,
        )?;
        self.atm_curves.add(&handle, curve);
        Ok(handle)
    }

    fn caplet_curve(&self, handle: &str) -> Result<Arc<CapletCurve>> {
        match self.atm_curves.get(handle).or_else(|| self.fixed_curves.get(handle)) {
            Some(c) => Ok(c),
            None => sabr_core::not_found!(
                "The engine: {handle} is not present. The volatility cannot be computed."
            ),
        }
    }

    /// A bootstrapped caplet volatility from curve `handle`.
    pub fn caplet_volatility(
        &self,
        handle: &str,
        strike: Real,
        base_date: Date,
        target: Date,
    ) -> Result<Volatility> {
        self.caplet_curve(handle)?
            .compute_caplet_volatility(strike, base_date, target)
    }

    /// Handles of every bootstrapped caplet curve, ATM and fixed-strike
    /// alike, or the [`NO_SURFACES`] sentinel when there are none.
    pub fn list_caplet_engines(&self) -> Vec<String> {
        let mut handles = self.atm_curves.handles();
        handles.extend(self.fixed_curves.handles());
        handles.sort();
        handles.dedup();
        if handles.is_empty() {
            vec![NO_SURFACES.to_string()]
        } else {
            handles
        }
    }

    // ── Smile surfaces ───────────────────────────────────────────────────

    /// Store smile settings under `handle`.
    pub fn add_smile_settings(&self, handle: &str, beta: Real, interpolation: &str) -> Result<()> {
        let settings = SmileSettings::new(beta, interpolation)?;
        self.smile_settings.add(handle, settings);
        Ok(())
    }

    /// Calibrate a caplet smile surface from previously bootstrapped
    /// curves and store it under `engine_handle`, which is returned on
    /// success.
    ///
    /// The dependencies are checked in a fixed order: the ATM curve, then
    /// the fixed-strike curve, then the smile settings.
    pub fn calibrate_smile_surface(
        &self,
        engine_handle: &str,
        settings_handle: &str,
        atm_handle: &str,
        fixed_handle: &str,
    ) -> Result<String> {
        let Some(atm) = self.atm_curves.get(atm_handle) else {
            sabr_core::not_found!("ATM CapFloor Bootstrap engine not found.");
        };
        let Some(fixed) = self.fixed_curves.get(fixed_handle) else {
            sabr_core::not_found!("Fixed Strike Bootstrap engines not found.");
        };
        let Some(settings) = self.smile_settings.get(settings_handle) else {
            sabr_core::not_found!("Caplet Smile Settings not found.");
        };
        let surface = CapletSmileSurface::calibrate(&settings, &fixed, &atm)?;
        self.smiles.add(engine_handle, surface);
        Ok(engine_handle.to_string())
    }

    /// Smile volatilities at `strikes` for a caplet expiring `expiry_time`
    /// years out, from surface `handle`.
    pub fn smile_volatility(
        &self,
        handle: &str,
        expiry_time: Time,
        strikes: &[Real],
    ) -> Result<Vec<Volatility>> {
        match self.smiles.get(handle) {
            Some(s) => s.compute_volatility(expiry_time, strikes),
            None => sabr_core::not_found!("SABR Caplet Smile Calibration engine not found."),
        }
    }

    /// Smile volatilities at `strikes` for a caplet expiring on `target`,
    /// measured ACT/365 from the surface's valuation date.
    pub fn smile_volatility_at(
        &self,
        handle: &str,
        target: Date,
        strikes: &[Real],
    ) -> Result<Vec<Volatility>> {
        match self.smiles.get(handle) {
            Some(s) => s.compute_volatility_at(target, strikes),
            None => sabr_core::not_found!("SABR Caplet Smile Calibration engine not found."),
        }
    }
}

fn parse_tenors(tokens: &[&str]) -> Result<Vec<Tenor>> {
    tokens.iter().map(|t| Tenor::parse(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_returns_sentinel() {
        let engines = Engines::new();
        assert_eq!(engines.list_caplet_engines(), vec![NO_SURFACES.to_string()]);
    }

    #[test]
    fn missing_caplet_engine_message() {
        let engines = Engines::new();
        let base = Date::from_ymd(2007, 11, 29).unwrap();
        let err = engines
            .caplet_volatility("Not an Engine", 0.0, base, base.add_days(365).unwrap())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The engine: Not an Engine is not present. The volatility cannot be computed."
        );
    }

    #[test]
    fn missing_swaption_engine_message() {
        let engines = Engines::new();
        let err = engines
            .sabr_parameter("Alpha", "NoSuch", "3y", "2y")
            .unwrap_err();
        assert_eq!(err.to_string(), "Calibration Engine NoSuch not found.");
    }

    #[test]
    fn unknown_parameter_name_message() {
        let engines = Engines::new();
        let err = engines
            .sabr_parameter("Gamma", "NoSuch", "3y", "2y")
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown SABR parameter Gamma specified.");
    }

    #[test]
    fn missing_smile_dependencies_in_order() {
        let engines = Engines::new();
        let err = engines
            .calibrate_smile_surface("Smile", "Settings", "ATM", "Fixed")
            .unwrap_err();
        assert_eq!(err.to_string(), "ATM CapFloor Bootstrap engine not found.");
    }

    #[test]
    fn missing_smile_engine_message() {
        let engines = Engines::new();
        let err = engines.smile_volatility("NoSuch", 1.0, &[0.05]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SABR Caplet Smile Calibration engine not found."
        );
    }

    #[test]
    fn engine_kinds_are_independent_namespaces() {
        let engines = Engines::new();
        engines
            .add_calibration_settings("Shared Handle", "Swaption", "AUD", 0.95)
            .unwrap();
        engines.add_smile_settings("Shared Handle", 0.5, "Linear").unwrap();
        // Neither settings kind shows up in the caplet curve listing
        assert_eq!(engines.list_caplet_engines(), vec![NO_SURFACES.to_string()]);
        assert!(engines.settings("Shared Handle").is_ok());
    }

    #[test]
    fn is_calibrated_never_errors() {
        let engines = Engines::new();
        assert!(!engines.is_model_calibrated("NoSuch", "3y", "2y"));
        assert!(!engines.is_model_calibrated("NoSuch", "not a tenor", "2y"));
    }
}
