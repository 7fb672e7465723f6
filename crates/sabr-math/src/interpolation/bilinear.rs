//! Bilinear interpolation on a rectangular grid.
//!
//! The swaption calibrator interpolates SABR parameters and forwards over an
//! (expiry years × tenor years) grid.  Queries outside the grid clamp to the
//! boundary cells, giving flat extrapolation along each axis.

use sabr_core::{errors::Result, Real};

use super::locate;

/// 2D interpolation trait.
pub trait Interpolation2D: std::fmt::Debug + Send + Sync {
    /// Evaluate the surface at `(x, y)`.
    fn value_at(&self, x: Real, y: Real) -> Real;
    /// Lower bound of the x domain.
    fn x_min(&self) -> Real;
    /// Upper bound of the x domain.
    fn x_max(&self) -> Real;
    /// Lower bound of the y domain.
    fn y_min(&self) -> Real;
    /// Upper bound of the y domain.
    fn y_max(&self) -> Real;
}

/// Bilinear interpolation on a rectangular grid.
///
/// `z` is stored row-major: `z[j * nx + i]` = f(xs\[i\], ys\[j\]).
#[derive(Debug, Clone)]
pub struct BilinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    z: Vec<Real>,
    nx: usize,
}

impl BilinearInterpolation {
    /// Build a bilinear interpolation on the grid `(xs × ys → z)`.
    ///
    /// Both axes must be strictly increasing and `z.len()` must equal
    /// `xs.len() * ys.len()`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        sabr_core::ensure!(nx >= 2, "need at least 2 x points");
        sabr_core::ensure!(ny >= 2, "need at least 2 y points");
        sabr_core::ensure!(
            xs.windows(2).all(|w| w[0] < w[1]),
            "x axis must be strictly increasing"
        );
        sabr_core::ensure!(
            ys.windows(2).all(|w| w[0] < w[1]),
            "y axis must be strictly increasing"
        );
        sabr_core::ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({}*{}={})",
            z.len(),
            nx,
            ny,
            nx * ny
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            z: z.to_vec(),
            nx,
        })
    }

    fn z_at(&self, i: usize, j: usize) -> Real {
        self.z[j * self.nx + i]
    }
}

impl Interpolation2D for BilinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }

    fn value_at(&self, x: Real, y: Real) -> Real {
        let x = x.clamp(self.x_min(), self.x_max());
        let y = y.clamp(self.y_min(), self.y_max());
        let i = locate(&self.xs, x);
        let j = locate(&self.ys, y);

        let z1 = self.z_at(i, j);
        let z2 = self.z_at(i + 1, j);
        let z3 = self.z_at(i, j + 1);
        let z4 = self.z_at(i + 1, j + 1);

        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let u = (y - self.ys[j]) / (self.ys[j + 1] - self.ys[j]);

        (1.0 - t) * (1.0 - u) * z1 + t * (1.0 - u) * z2 + (1.0 - t) * u * z3 + t * u * z4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_on_grid() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0];
        let z = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let interp = BilinearInterpolation::new(&xs, &ys, &z).unwrap();
        assert!((interp.value_at(0.0, 0.0) - 1.0).abs() < 1e-12);
        assert!((interp.value_at(2.0, 0.0) - 3.0).abs() < 1e-12);
        assert!((interp.value_at(1.0, 1.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn reproduces_plane() {
        // z = x + 2y is reproduced exactly by bilinear blending
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];
        let mut z = Vec::new();
        for &y in &ys {
            for &x in &xs {
                z.push(x + 2.0 * y);
            }
        }
        let interp = BilinearInterpolation::new(&xs, &ys, &z).unwrap();
        let v = interp.value_at(0.5, 1.5);
        assert!((v - 3.5).abs() < 1e-12, "expected 3.5, got {v}");
    }

    #[test]
    fn clamps_outside_grid() {
        let xs = vec![1.0, 2.0];
        let ys = vec![1.0, 2.0];
        let z = vec![1.0, 2.0, 3.0, 4.0];
        let interp = BilinearInterpolation::new(&xs, &ys, &z).unwrap();
        assert!((interp.value_at(0.0, 0.0) - 1.0).abs() < 1e-12);
        assert!((interp.value_at(9.0, 9.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(BilinearInterpolation::new(&[0.0], &[0.0, 1.0], &[1.0, 2.0]).is_err());
        assert!(BilinearInterpolation::new(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 2.0]).is_err());
    }
}
