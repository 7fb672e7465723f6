//! Cubic Hermite interpolation across strikes.
//!
//! The smile calibrator pre-smooths quoted volatilities across strikes with
//! a C¹ cubic Hermite spline.  Node slopes use the Fritsch-Butland weighted
//! harmonic mean, which preserves monotone segments of the smile and cannot
//! introduce spurious extrema between quotes.

use sabr_core::{errors::Result, Real};

use super::{check_nodes, locate, Interpolation1D};

/// Monotone-preserving cubic Hermite interpolation with flat extrapolation.
#[derive(Debug, Clone)]
pub struct CubicHermiteInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    // Polynomial coefficients per interval: f(x) = y_i + dx*(a + dx*(b + dx*c))
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl CubicHermiteInterpolation {
    /// Build the spline.  Requires at least 3 strictly increasing nodes.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 3)?;
        let n = xs.len();
        let xs = xs.to_vec();
        let ys = ys.to_vec();

        // Secant slopes and interval widths
        let mut s = Vec::with_capacity(n - 1);
        let mut dx = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            dx.push(xs[i + 1] - xs[i]);
            s.push((ys[i + 1] - ys[i]) / dx[i]);
        }

        // Interior slopes: Fritsch-Butland weighted harmonic mean
        let mut ts = vec![0.0; n];
        for i in 1..n - 1 {
            let s_min = s[i - 1].min(s[i]);
            let s_max = s[i - 1].max(s[i]);
            let denom = s_max + 2.0 * s_min;
            if denom.abs() < 1e-30 || s[i - 1] * s[i] <= 0.0 {
                ts[i] = 0.0;
            } else {
                ts[i] = 3.0 * s_min * s_max / denom;
            }
        }

        // Boundary slopes: one-sided parabolic end formulas, clipped to keep
        // the boundary segment monotone.
        ts[0] = ((2.0 * dx[0] + dx[1]) * s[0] - dx[0] * s[1]) / (dx[0] + dx[1]);
        ts[n - 1] = ((2.0 * dx[n - 2] + dx[n - 3]) * s[n - 2] - dx[n - 2] * s[n - 3])
            / (dx[n - 2] + dx[n - 3]);
        clip_boundary_slope(&mut ts[0], s[0]);
        let last_s = s[n - 2];
        clip_boundary_slope(&mut ts[n - 1], last_s);

        // Convert slopes to per-interval polynomial coefficients
        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            a.push(ts[i]);
            b.push((3.0 * s[i] - ts[i + 1] - 2.0 * ts[i]) / dx[i]);
            c.push((ts[i + 1] + ts[i] - 2.0 * s[i]) / (dx[i] * dx[i]));
        }

        Ok(Self { xs, ys, a, b, c })
    }
}

fn clip_boundary_slope(t: &mut Real, secant: Real) {
    if *t * secant <= 0.0 {
        *t = 0.0;
    } else if t.abs() > 3.0 * secant.abs() {
        *t = t.signum() * 3.0 * secant.abs();
    }
}

impl Interpolation1D for CubicHermiteInterpolation {
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
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }
}
