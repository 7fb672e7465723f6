//! # sabr-engines
//!
//! The domain layer of sabrvol: swaption SABR calibration, caplet volatility
//! bootstrapping from cap/floor quotes, and the cap/floor smile surface.
//! Calibrated engines live in handle-keyed registries grouped by the
//! [`Engines`] collection, which callers construct and inject explicitly.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Caplet bootstrapping from ETO and cap/floor quotes.
pub mod caplet;

/// Discount curves over day offsets.
pub mod discount;

/// Typed bootstrap configuration.
pub mod properties;

/// The per-kind engine registries.
pub mod registry;

/// Calibration and smile settings.
pub mod settings;

/// Cap/floor smile surface calibration.
pub mod smile;

/// Swaption SABR calibration.
pub mod swaption;

pub use caplet::CapletCurve;
pub use discount::DiscountCurve;
pub use properties::BootstrapProperties;
pub use registry::Engines;
pub use settings::{CalibrationSettings, SmileInterpolation, SmileSettings};
pub use smile::CapletSmileSurface;
pub use swaption::{CalibrationParameter, ForwardGrid, SwaptionCalibration};
