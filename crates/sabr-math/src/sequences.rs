//! Low-discrepancy sequences.
//!
//! The smile fitter reseeds its simplex from a Halton sequence when the
//! first local minimization is not good enough.  A deterministic sequence
//! keeps calibration results reproducible run to run.

use sabr_core::Real;

const PRIMES: [usize; 8] = [2, 3, 5, 7, 11, 13, 17, 19];

/// Radical-inverse of `index` in the given base, the core of the Halton
/// sequence.  Returns a value in `[0, 1)`.
pub fn radical_inverse(mut index: usize, base: usize) -> Real {
    let inv_base = 1.0 / base as Real;
    let mut inv = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as Real * inv;
        index /= base;
        inv *= inv_base;
    }
    result
}

/// A Halton sequence over the unit hypercube `[0, 1)^dim`.
#[derive(Debug, Clone)]
pub struct HaltonSequence {
    dim: usize,
    index: usize,
}

impl HaltonSequence {
    /// Create a sequence of the given dimension (at most 8).
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 1 && dim <= PRIMES.len(), "unsupported dimension {dim}");
        // Start at 1: index 0 is the origin in every base.
        Self { dim, index: 1 }
    }

    /// Return the next point of the sequence.
    pub fn next_point(&mut self) -> Vec<Real> {
        let point = (0..self.dim)
            .map(|d| radical_inverse(self.index, PRIMES[d]))
            .collect();
        self.index += 1;
        point
    }
}
