//! # sabrvol
//!
//! SABR volatility calibration and caplet bootstrapping engines.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `sabr-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! sabrvol = "0.1"
//! ```
//!
//! ```rust
//! use sabrvol::engines::Engines;
//!
//! let engines = Engines::new();
//! engines
//!     .add_calibration_settings("SABR Settings 1", "Swaption", "AUD", 0.95)
//!     .unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use sabr_core as core;

/// Date, tenor, day counter, and roll convention types.
pub use sabr_time as time;

/// Mathematical utilities: SABR, interpolation, optimisation, solvers.
pub use sabr_math as math;

/// Calibration engines, bootstrappers, and their registries.
pub use sabr_engines as engines;
