//! Swaption SABR calibration.
//!
//! A calibration engine holds one SABR parameter set per (option expiry,
//! swap tenor) pair.  Full smile calibration fits every pair reachable from
//! the quoted volatility rows and the forward-rate grid; ATM calibration
//! pins a single pair from one quoted point.  Queries at uncalibrated pairs
//! interpolate the parameters bilinearly over the calibrated grid.

use std::collections::BTreeMap;

use sabr_core::errors::Result;
use sabr_core::{Rate, Real, Volatility};
use sabr_math::interpolation::{BilinearInterpolation, Interpolation2D};
use sabr_math::sabr::{
    fit_atm_alpha, fit_smile, hagan_volatility, SabrParameters, CALIBRATION_ACCURACY,
};
use sabr_time::Tenor;

use crate::settings::CalibrationSettings;

/// Which SABR parameter a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationParameter {
    /// The vol backbone level.
    Alpha,
    /// The CEV exponent.
    Beta,
    /// The vol-of-vol.
    Nu,
    /// The asset/vol correlation.
    Rho,
}

impl CalibrationParameter {
    /// Parse a parameter name (case-insensitive).
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_uppercase().as_str() {
            "ALPHA" => Ok(CalibrationParameter::Alpha),
            "BETA" => Ok(CalibrationParameter::Beta),
            "NU" => Ok(CalibrationParameter::Nu),
            "RHO" => Ok(CalibrationParameter::Rho),
            _ => Err(sabr_core::Error::Validation(format!(
                "Unknown SABR parameter {name} specified."
            ))),
        }
    }
}

/// Forward swap rates on an (expiry × tenor) grid, interpolated bilinearly
/// in year fractions.
#[derive(Debug, Clone)]
pub struct ForwardGrid {
    tenors: Vec<Tenor>,
    interp: BilinearInterpolation,
}

impl ForwardGrid {
    /// Build the grid.  `rates[i][j]` is the forward for `expiries[i]` and
    /// `tenors[j]`; both axes must be in increasing tenor order.
    pub fn new(expiries: &[Tenor], tenors: &[Tenor], rates: &[Vec<Rate>]) -> Result<Self> {
        sabr_core::ensure!(
            rates.len() == expiries.len(),
            "forward grid has {} rows for {} expiries",
            rates.len(),
            expiries.len()
        );
        for (i, row) in rates.iter().enumerate() {
            sabr_core::ensure!(
                row.len() == tenors.len(),
                "forward grid row {i} has {} entries for {} tenors",
                row.len(),
                tenors.len()
            );
        }
        let xs: Vec<Real> = tenors.iter().map(Tenor::in_years).collect();
        let ys: Vec<Real> = expiries.iter().map(Tenor::in_years).collect();
        let z: Vec<Real> = rates.iter().flatten().copied().collect();
        Ok(Self {
            tenors: tenors.to_vec(),
            interp: BilinearInterpolation::new(&xs, &ys, &z)?,
        })
    }

    /// The tenor axis of the grid.
    pub fn tenors(&self) -> &[Tenor] {
        &self.tenors
    }

    /// Forward rate at (expiry, tenor), interpolated in years.
    pub fn forward(&self, expiry: Tenor, tenor: Tenor) -> Rate {
        self.interp.value_at(tenor.in_years(), expiry.in_years())
    }
}

#[derive(Debug, Clone, Copy)]
struct SabrNode {
    params: SabrParameters,
    forward: Rate,
    error: Real,
}

/// A calibrated swaption engine: SABR nodes keyed by (expiry, tenor).
///
/// An ATM engine is quoted without an asset tenor, so its lookups match on
/// the expiry alone and ignore the tenor a query carries.
#[derive(Debug, Clone)]
pub struct SwaptionCalibration {
    beta: Real,
    nodes: BTreeMap<(Tenor, Tenor), SabrNode>,
    is_atm: bool,
}

impl SwaptionCalibration {
    /// Calibrate a full smile engine.
    ///
    /// Each quoted expiry row is fitted against every tenor on the forward
    /// grid, shifting the forward by the quoted strike offsets.  Rows whose
    /// volatilities are all zero carry no information and are skipped
    /// without error.
    pub fn calibrate_smile(
        settings: &CalibrationSettings,
        expiries: &[Tenor],
        strike_offsets: &[Real],
        vols: &[Vec<Volatility>],
        forwards: &ForwardGrid,
    ) -> Result<Self> {
        sabr_core::ensure!(
            vols.len() == expiries.len(),
            "volatility grid has {} rows for {} expiries",
            vols.len(),
            expiries.len()
        );

        let mut nodes = BTreeMap::new();
        for (expiry, row) in expiries.iter().zip(vols.iter()) {
            sabr_core::ensure!(
                row.len() == strike_offsets.len(),
                "volatility row for {expiry} has {} entries for {} strike offsets",
                row.len(),
                strike_offsets.len()
            );
            if row.iter().all(|&v| v.abs() < 1e-12) {
                continue;
            }
            let expiry_time = expiry.in_years();
            for &tenor in forwards.tenors() {
                let forward = forwards.forward(*expiry, tenor);
                let strikes: Vec<Real> = strike_offsets.iter().map(|o| forward + o).collect();
                sabr_core::ensure!(
                    strikes.iter().all(|&k| k > 0.0),
                    "strike offsets drive the strike non-positive at ({expiry},{tenor})"
                );
                let fit = fit_smile(forward, expiry_time, settings.beta, &strikes, row)?;
                nodes.insert(
                    (*expiry, tenor),
                    SabrNode {
                        params: fit.params,
                        forward,
                        error: fit.error,
                    },
                );
            }
        }
        Ok(Self {
            beta: settings.beta,
            nodes,
            is_atm: false,
        })
    }

    /// Calibrate an ATM engine from a single quoted point.
    ///
    /// Alpha is recovered from the ATM cubic; `tenor` falls back to the
    /// zero-tenor sentinel when the quote carries no asset tenor.
    pub fn calibrate_atm(
        settings: &CalibrationSettings,
        nu: Real,
        rho: Real,
        atm_vol: Volatility,
        forward: Rate,
        expiry: Tenor,
        tenor: Option<Tenor>,
    ) -> Result<Self> {
        sabr_core::ensure!((-1.0..=1.0).contains(&rho), "rho must lie in [-1, 1], got {rho}");
        sabr_core::ensure!(nu >= 0.0, "nu must be non-negative, got {nu}");
        let alpha = fit_atm_alpha(nu, rho, atm_vol, forward, expiry.in_years(), settings.beta)?;
        let mut nodes = BTreeMap::new();
        nodes.insert(
            (expiry, tenor.unwrap_or_default()),
            SabrNode {
                params: SabrParameters {
                    alpha,
                    beta: settings.beta,
                    nu,
                    rho,
                },
                forward,
                error: CALIBRATION_ACCURACY,
            },
        );
        Ok(Self {
            beta: settings.beta,
            nodes,
            is_atm: true,
        })
    }

    /// The node a query resolves to.  An ATM engine matches on the expiry
    /// alone, since its quote carried no asset tenor.
    fn lookup(&self, expiry: Tenor, tenor: Tenor) -> Option<&SabrNode> {
        if let Some(node) = self.nodes.get(&(expiry, tenor)) {
            return Some(node);
        }
        if self.is_atm {
            return self
                .nodes
                .range((expiry, Tenor::days(0))..=(expiry, Tenor::years(u32::MAX / 365)))
                .map(|(_, node)| node)
                .next();
        }
        None
    }

    /// Whether a query at (expiry, tenor) resolves to a node.  Pure
    /// lookup; absence is `false`, never an error.
    pub fn is_calibrated(&self, expiry: Tenor, tenor: Tenor) -> bool {
        self.lookup(expiry, tenor).is_some()
    }

    fn node(&self, expiry: Tenor, tenor: Tenor) -> Result<&SabrNode> {
        match self.lookup(expiry, tenor) {
            Some(node) => Ok(node),
            None => sabr_core::not_found!(
                "The Calibration Engine with Key({expiry},{tenor}) not found."
            ),
        }
    }

    /// A calibrated SABR parameter at (expiry, tenor).
    pub fn parameter(
        &self,
        which: CalibrationParameter,
        expiry: Tenor,
        tenor: Tenor,
    ) -> Result<Real> {
        let node = self.node(expiry, tenor)?;
        Ok(match which {
            CalibrationParameter::Alpha => node.params.alpha,
            CalibrationParameter::Beta => node.params.beta,
            CalibrationParameter::Nu => node.params.nu,
            CalibrationParameter::Rho => node.params.rho,
        })
    }

    /// The reported calibration error at (expiry, tenor).
    pub fn calibration_error(&self, expiry: Tenor, tenor: Tenor) -> Result<Real> {
        Ok(self.node(expiry, tenor)?.error)
    }

    /// Implied volatility at (expiry, tenor, strike).
    ///
    /// Exact nodes evaluate the Hagan formula directly; anything else
    /// interpolates alpha, nu, rho, and the forward bilinearly over the
    /// calibrated grid first.
    pub fn interpolate_volatility(
        &self,
        expiry: Tenor,
        tenor: Tenor,
        strike: Real,
    ) -> Result<Volatility> {
        sabr_core::ensure!(strike > 0.0, "strike must be positive, got {strike}");
        if self.nodes.is_empty() {
            sabr_core::not_found!(
                "The Calibration Engine with Key({expiry},{tenor}) not found."
            );
        }
        let expiry_time = expiry.in_years();
        if let Some(node) = self.lookup(expiry, tenor) {
            return Ok(hagan_volatility(node.forward, strike, expiry_time, &node.params));
        }

        let (alpha, nu, rho, forward) = self.interpolated_parameters(expiry, tenor);
        let params = SabrParameters {
            alpha,
            beta: self.beta,
            nu,
            rho,
        };
        Ok(hagan_volatility(forward, strike, expiry_time, &params))
    }

    /// Parameter-wise bilinear interpolation across the calibrated node
    /// grid, clamped at the boundary in both directions.
    fn interpolated_parameters(&self, expiry: Tenor, tenor: Tenor) -> (Real, Real, Real, Rate) {
        let te = expiry.in_years();
        let tt = tenor.in_years();

        let mut expiry_axis: Vec<Tenor> = self.nodes.keys().map(|k| k.0).collect();
        expiry_axis.dedup();
        let (e_lo, e_hi) = bracket(&expiry_axis, te);

        let lo = self.row_parameters(expiry_axis[e_lo], tt);
        let hi = self.row_parameters(expiry_axis[e_hi], tt);
        let t_lo = expiry_axis[e_lo].in_years();
        let t_hi = expiry_axis[e_hi].in_years();
        let w = if (t_hi - t_lo).abs() < 1e-12 {
            0.0
        } else {
            ((te - t_lo) / (t_hi - t_lo)).clamp(0.0, 1.0)
        };
        (
            lerp(lo.0, hi.0, w),
            lerp(lo.1, hi.1, w),
            lerp(lo.2, hi.2, w),
            lerp(lo.3, hi.3, w),
        )
    }

    /// Linear interpolation of (alpha, nu, rho, forward) across the tenors
    /// calibrated for one expiry.
    fn row_parameters(&self, expiry: Tenor, tenor_years: Real) -> (Real, Real, Real, Rate) {
        let row: Vec<(&Tenor, &SabrNode)> = self
            .nodes
            .range((expiry, Tenor::days(0))..=(expiry, Tenor::years(u32::MAX / 365)))
            .map(|(k, v)| (&k.1, v))
            .collect();
        debug_assert!(!row.is_empty(), "expiry {expiry} has no calibrated tenors");

        let tenor_axis: Vec<Tenor> = row.iter().map(|(t, _)| **t).collect();
        let (lo, hi) = bracket(&tenor_axis, tenor_years);
        let (t_lo, n_lo) = (tenor_axis[lo].in_years(), row[lo].1);
        let (t_hi, n_hi) = (tenor_axis[hi].in_years(), row[hi].1);
        let w = if (t_hi - t_lo).abs() < 1e-12 {
            0.0
        } else {
            ((tenor_years - t_lo) / (t_hi - t_lo)).clamp(0.0, 1.0)
        };
        (
            lerp(n_lo.params.alpha, n_hi.params.alpha, w),
            lerp(n_lo.params.nu, n_hi.params.nu, w),
            lerp(n_lo.params.rho, n_hi.params.rho, w),
            lerp(n_lo.forward, n_hi.forward, w),
        )
    }
}

/// Indices of the axis nodes bracketing `t` in years, clamped to the ends.
fn bracket(axis: &[Tenor], t: Real) -> (usize, usize) {
    let n = axis.len();
    if n == 1 || t <= axis[0].in_years() {
        return (0, 0);
    }
    if t >= axis[n - 1].in_years() {
        return (n - 1, n - 1);
    }
    let mut i = 0;
    while i + 1 < n && axis[i + 1].in_years() <= t {
        i += 1;
    }
    (i, (i + 1).min(n - 1))
}

fn lerp(a: Real, b: Real, w: Real) -> Real {
    a + (b - a) * w
}
