//! 1D interpolation trait and implementations.
//!
//! All interpolations extrapolate flat: queries outside the node range are
//! clamped to the nearest boundary segment.  That matches how the engines
//! query volatility term structures beyond their last quoted node.

use sabr_core::{errors::Result, Real};

mod bilinear;
mod cubic;

pub use bilinear::{BilinearInterpolation, Interpolation2D};
pub use cubic::CubicHermiteInterpolation;

/// A 1D interpolation function defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn value_at(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to the
/// boundary segments.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    sabr_core::ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    sabr_core::ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    sabr_core::ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "xs must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation with flat extrapolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from strictly increasing `xs` and
    /// corresponding `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value_at(&self, x: Real) -> Real {
        if x <= self.x_min() {
            return self.ys[0];
        }
        if x >= self.x_max() {
            return self.ys[self.ys.len() - 1];
        }
        let i = locate(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

// ── Log-linear ────────────────────────────────────────────────────────────────

/// Log-linear interpolation: interpolates `log(y)` linearly and
/// exponentiates.  All `ys` must be strictly positive.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolation {
    inner: LinearInterpolation,
}

impl LogLinearInterpolation {
    /// Construct a log-linear interpolation.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        sabr_core::ensure!(
            ys.iter().all(|&y| y > 0.0),
            "all y values must be positive for log-linear interpolation"
        );
        let log_ys: Vec<Real> = ys.iter().map(|&y| y.ln()).collect();
        Ok(Self {
            inner: LinearInterpolation::new(xs, &log_ys)?,
        })
    }
}

impl Interpolation1D for LogLinearInterpolation {
    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }

    fn value_at(&self, x: Real) -> Real {
        self.inner.value_at(x).exp()
    }
}
