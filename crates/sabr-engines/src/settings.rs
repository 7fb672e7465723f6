//! Calibration and smile settings.

use sabr_core::errors::{Error, Result};
use sabr_core::Real;

/// Settings shared by every engine calibrated under one handle: the quoted
/// instrument, its currency, and the fixed CEV exponent beta.
#[derive(Debug, Clone)]
pub struct CalibrationSettings {
    /// Instrument family the quotes belong to (e.g. "Swaption").
    pub instrument: String,
    /// Quote currency (e.g. "AUD").
    pub currency: String,
    /// The CEV exponent held fixed during calibration.
    pub beta: Real,
}

impl CalibrationSettings {
    /// Create settings with `beta` validated into `[0, 1]`.
    pub fn new(instrument: impl Into<String>, currency: impl Into<String>, beta: Real) -> Result<Self> {
        sabr_core::ensure!(
            (0.0..=1.0).contains(&beta),
            "beta must lie in [0, 1], got {beta}"
        );
        Ok(Self {
            instrument: instrument.into(),
            currency: currency.into(),
            beta,
        })
    }
}

/// Interpolation applied across strikes when pre-smoothing a caplet smile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmileInterpolation {
    /// Piecewise linear.
    Linear,
    /// Monotone cubic Hermite spline.
    CubicHermiteSpline,
}

impl SmileInterpolation {
    /// Parse an interpolation method name as quoted in configuration.
    ///
    /// # Errors
    /// Unknown names yield a validation error naming the method.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "Linear" => Ok(SmileInterpolation::Linear),
            "CubicHermiteSpline" => Ok(SmileInterpolation::CubicHermiteSpline),
            _ => Err(Error::Validation(format!(
                "Unknown interpolation method {name} specified."
            ))),
        }
    }
}

/// Settings for calibrating a caplet smile surface.
#[derive(Debug, Clone)]
pub struct SmileSettings {
    /// The CEV exponent for the per-expiry smile fits.
    pub beta: Real,
    /// Interpolation across strikes used to pre-smooth quoted vols.
    pub interpolation: SmileInterpolation,
}

impl SmileSettings {
    /// Create smile settings; `interpolation_name` is validated eagerly.
    pub fn new(beta: Real, interpolation_name: &str) -> Result<Self> {
        sabr_core::ensure!(
            (0.0..=1.0).contains(&beta),
            "beta must lie in [0, 1], got {beta}"
        );
        Ok(Self {
            beta,
            interpolation: SmileInterpolation::parse(interpolation_name)?,
        })
    }
}
