//! Nelder-Mead simplex minimization.
//!
//! The SABR smile fitter minimizes a sum of squared volatility errors over a
//! low-dimensional transformed parameter space, which is exactly the regime
//! where a derivative-free simplex works well.

use sabr_core::{
    errors::{Error, Result},
    Real,
};

/// Result of a simplex minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Location of the best point found.
    pub x: Vec<Real>,
    /// Objective value at `x`.
    pub value: Real,
    /// Number of iterations consumed.
    pub iterations: usize,
}

/// Minimize `f` starting from `x0` using the Nelder-Mead simplex.
///
/// The initial simplex is `x0` plus one vertex per dimension displaced by the
/// matching entry of `scale`.  Iteration stops when the spread of objective
/// values across the simplex drops below `tol` or `max_iter` is reached.
///
/// # Errors
/// Fails if the objective never produces a finite value.
pub fn nelder_mead<F>(
    f: F,
    x0: &[Real],
    scale: &[Real],
    max_iter: usize,
    tol: Real,
) -> Result<Minimum>
where
    F: Fn(&[Real]) -> Real,
{
    let n = x0.len();
    if n == 0 || scale.len() != n {
        return Err(Error::Computation(
            "NelderMead: dimension mismatch between x0 and scale".into(),
        ));
    }

    let eval = |x: &[Real]| -> Real {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            Real::MAX
        }
    };

    // Initial simplex: x0 plus one displaced vertex per dimension
    let mut simplex: Vec<(Vec<Real>, Real)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), eval(x0)));
    for k in 0..n {
        let mut xk = x0.to_vec();
        xk[k] += if scale[k] != 0.0 { scale[k] } else { 0.1 };
        let fk = eval(&xk);
        simplex.push((xk, fk));
    }

    let mut iterations = 0;
    for iter in 0..max_iter {
        iterations = iter;
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        if simplex[n].1 - simplex[0].1 < tol {
            break;
        }

        // Centroid of all vertices but the worst
        let mut centroid = vec![0.0; n];
        for vertex in simplex.iter().take(n) {
            for k in 0..n {
                centroid[k] += vertex.0[k];
            }
        }
        for ck in centroid.iter_mut() {
            *ck /= n as Real;
        }

        let worst = simplex[n].0.clone();

        // Reflection
        let reflected: Vec<Real> = (0..n).map(|k| 2.0 * centroid[k] - worst[k]).collect();
        let f_reflected = eval(&reflected);

        if f_reflected < simplex[0].1 {
            // Expansion
            let expanded: Vec<Real> = (0..n).map(|k| 3.0 * centroid[k] - 2.0 * worst[k]).collect();
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[n] = (expanded, f_expanded);
            } else {
                simplex[n] = (reflected, f_reflected);
            }
        } else if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
        } else {
            // Contraction, outside or inside of the worst vertex
            let toward = if f_reflected < simplex[n].1 {
                &reflected
            } else {
                &worst
            };
            let contracted: Vec<Real> = (0..n).map(|k| 0.5 * (centroid[k] + toward[k])).collect();
            let f_contracted = eval(&contracted);
            if f_contracted < simplex[n].1 {
                simplex[n] = (contracted, f_contracted);
            } else {
                // Shrink toward the best vertex
                let best = simplex[0].0.clone();
                for vertex in simplex.iter_mut().skip(1) {
                    for k in 0..n {
                        vertex.0[k] = 0.5 * (best[k] + vertex.0[k]);
                    }
                    vertex.1 = eval(&vertex.0);
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, value) = simplex.swap_remove(0);
    if !value.is_finite() || value == Real::MAX {
        return Err(Error::Computation(
            "NelderMead: objective has no finite value".into(),
        ));
    }
    Ok(Minimum {
        x,
        value,
        iterations,
    })
}
