//! # sabr-math
//!
//! Numerical machinery for the calibration engines: 1D/2D interpolation,
//! root finding, Nelder-Mead minimization, a Halton sequence for multi-start
//! seeding, the Black (1976) formula, and the SABR model itself.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Black (1976) option pricing.
pub mod black;

/// 1D and 2D interpolation.
pub mod interpolation;

/// Nelder-Mead simplex minimization.
pub mod optimize;

/// The SABR model: Hagan formula, ATM alpha solve, smile fitting.
pub mod sabr;

/// Low-discrepancy sequences.
pub mod sequences;

/// 1D root-finding solvers.
pub mod solvers;

pub use black::black_price;
pub use interpolation::{
    BilinearInterpolation, CubicHermiteInterpolation, Interpolation1D, Interpolation2D,
    LinearInterpolation, LogLinearInterpolation,
};
pub use sabr::{fit_atm_alpha, fit_smile, hagan_volatility, SabrFit, SabrParameters};
