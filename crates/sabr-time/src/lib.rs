//! # sabr-time
//!
//! Calendar dates, day-count conventions, tenor parsing, and business-day
//! roll conventions used by the bootstrapping engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Serial-number calendar date.
pub mod date;

/// Day-count conventions.
pub mod day_count;

/// Business-day roll conventions.
pub mod roll;

/// Market tenor strings ("3y", "90D", "3M").
pub mod tenor;

pub use date::{Date, Weekday};
pub use day_count::{Actual365Fixed, DayCounter};
pub use roll::RollConvention;
pub use tenor::{Tenor, TenorUnit};
