//! Error types for sabrvol.
//!
//! A single `thiserror`-derived enum covers the whole workspace.  Several of
//! the `NotFound` and `Validation` messages are part of the caller-facing
//! contract and are asserted verbatim by the engine tests, so the `Display`
//! form of those variants is the bare message with no prefix.

use thiserror::Error;

/// The top-level error type used throughout sabrvol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A settings object, engine, or grid key is not registered.
    #[error("{0}")]
    NotFound(String),

    /// An input failed validation before any state was touched.
    #[error("{0}")]
    Validation(String),

    /// A numerical procedure failed (solver, optimizer, degenerate input).
    #[error("{0}")]
    Computation(String),

    /// Date-related error.
    #[error("date error: {0}")]
    Date(String),
}

/// Shorthand `Result` type used throughout sabrvol.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate an input, returning `Err(Error::Validation(...))` if `$cond` is
/// false.
///
/// # Example
/// ```
/// use sabr_core::{ensure, errors::Error};
/// fn positive(x: f64) -> sabr_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Validation(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Computation(...))` immediately.
///
/// # Example
/// ```
/// use sabr_core::{fail, errors::Error};
/// fn always_err() -> sabr_core::errors::Result<()> {
///     fail!("solver did not converge");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Computation(format!($($msg)*)))
    };
}

/// Return `Err(Error::NotFound(...))` immediately.
///
/// # Example
/// ```
/// use sabr_core::{not_found, errors::Error};
/// fn lookup(handle: &str) -> sabr_core::errors::Result<()> {
///     not_found!("Calibration Engine {handle} not found.");
/// }
/// assert_eq!(
///     lookup("X").unwrap_err().to_string(),
///     "Calibration Engine X not found."
/// );
/// ```
#[macro_export]
macro_rules! not_found {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::NotFound(format!($($msg)*)))
    };
}
