//! Cap/floor smile surface calibration.
//!
//! A smile surface combines a fixed-strike caplet curve with an ATM caplet
//! curve: at every bootstrapped expiry the fixed-strike columns give the
//! wings, the ATM curve pins the level at the forward, and a SABR smile is
//! fitted through the pre-smoothed quotes.  Queries evaluate the fitted
//! smile of the expiry closest in time.

use sabr_core::errors::Result;
use sabr_core::{Rate, Real, Time, Volatility};
use sabr_math::interpolation::{
    CubicHermiteInterpolation, Interpolation1D, LinearInterpolation,
};
use sabr_math::sabr::{fit_smile, hagan_volatility, SabrParameters};

use crate::caplet::CapletCurve;
use crate::settings::{SmileInterpolation, SmileSettings};

const DAYS_PER_YEAR: Real = 365.0;
const RESAMPLE_FACTOR: usize = 2;

#[derive(Debug, Clone, Copy)]
struct SmileNode {
    expiry_time: Time,
    forward: Rate,
    params: SabrParameters,
}

/// A calibrated caplet smile surface: one SABR smile per bootstrapped
/// caplet expiry.
#[derive(Debug, Clone)]
pub struct CapletSmileSurface {
    valuation_date: sabr_time::Date,
    nodes: Vec<SmileNode>,
}

impl CapletSmileSurface {
    /// Calibrate the surface from a fixed-strike curve and an ATM curve.
    ///
    /// For each node expiry of the fixed curve the quoted strike columns
    /// are joined with the ATM volatility at that expiry's forward,
    /// pre-smoothed across strikes with the configured interpolation, and
    /// fitted to a SABR smile at the settings beta.  Expiries whose forward
    /// cannot be formed are skipped.
    ///
    /// # Errors
    /// Fails when the curves are of the wrong kind, when no expiry
    /// survives, or when a smile fit fails.
    pub fn calibrate(
        settings: &SmileSettings,
        fixed: &CapletCurve,
        atm: &CapletCurve,
    ) -> Result<Self> {
        sabr_core::ensure!(
            !fixed.is_atm(),
            "the fixed-strike curve of a smile surface must carry quoted strikes"
        );
        sabr_core::ensure!(
            atm.is_atm(),
            "the ATM curve of a smile surface must be bootstrapped at-the-money"
        );

        let properties = fixed.properties();
        let discount = fixed.discount();
        let months = properties.months_per_roll() as i32;

        let mut nodes = Vec::new();
        for offset in fixed.node_offsets() {
            if offset <= 0.0 {
                continue;
            }
            let reset = properties.valuation_date.add_days(offset as i32)?;
            let pay = properties
                .roll_convention
                .adjust(reset.add_months(months)?)?;
            let forward = match discount.forward_rate(reset, pay) {
                Ok(f) if f > 0.0 => f,
                _ => continue,
            };

            let expiry_time = offset / DAYS_PER_YEAR;
            let mut points: Vec<(Real, Volatility)> = fixed
                .strikes()
                .iter()
                .enumerate()
                .map(|(j, &k)| (k, fixed.column_volatility(j, offset)))
                .collect();
            points.push((forward, atm.column_volatility(0, offset)));
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            points.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-8);

            let (strikes, vols) = resample(settings.interpolation, &points)?;
            let fit = fit_smile(forward, expiry_time, settings.beta, &strikes, &vols)?;
            nodes.push(SmileNode {
                expiry_time,
                forward,
                params: fit.params,
            });
        }
        sabr_core::ensure!(
            !nodes.is_empty(),
            "no caplet expiry was usable for the smile surface"
        );
        nodes.sort_by(|a, b| a.expiry_time.total_cmp(&b.expiry_time));
        Ok(Self {
            valuation_date: properties.valuation_date,
            nodes,
        })
    }

    /// Number of fitted smiles.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The fitted expiry times in years.
    pub fn expiries(&self) -> Vec<Time> {
        self.nodes.iter().map(|n| n.expiry_time).collect()
    }

    /// Volatilities at `strikes` for a caplet expiring on `target`, with
    /// the expiry measured ACT/365 from the surface's valuation date.
    pub fn compute_volatility_at(
        &self,
        target: sabr_time::Date,
        strikes: &[Real],
    ) -> Result<Vec<Volatility>> {
        let t = self.valuation_date.days_until(target) as Real / DAYS_PER_YEAR;
        self.compute_volatility(t, strikes)
    }

    /// Volatilities at `strikes` for a caplet expiring at `expiry_time`
    /// years, read off the fitted smile closest in time.
    ///
    /// # Errors
    /// Fails for a non-positive expiry or strike.
    pub fn compute_volatility(
        &self,
        expiry_time: Time,
        strikes: &[Real],
    ) -> Result<Vec<Volatility>> {
        sabr_core::ensure!(
            expiry_time > 0.0,
            "caplet expiry must be positive, got {expiry_time}"
        );
        sabr_core::ensure!(
            strikes.iter().all(|&k| k > 0.0),
            "strikes must be positive"
        );
        let node = self
            .nodes
            .iter()
            .min_by(|a, b| {
                (a.expiry_time - expiry_time)
                    .abs()
                    .total_cmp(&(b.expiry_time - expiry_time).abs())
            })
            .ok_or_else(|| sabr_core::Error::Computation("empty smile surface".into()))?;
        Ok(strikes
            .iter()
            .map(|&k| hagan_volatility(node.forward, k, expiry_time, &node.params))
            .collect())
    }
}

/// Pre-smooth the quoted points onto a denser uniform strike mesh through
/// the configured interpolation, so ragged quotes do not whip the SABR fit.
fn resample(
    method: SmileInterpolation,
    points: &[(Real, Volatility)],
) -> Result<(Vec<Real>, Vec<Volatility>)> {
    sabr_core::ensure!(
        points.len() >= 3,
        "a smile fit needs at least 3 strike quotes, got {}",
        points.len()
    );
    let xs: Vec<Real> = points.iter().map(|p| p.0).collect();
    let ys: Vec<Real> = points.iter().map(|p| p.1).collect();

    let n = points.len() * RESAMPLE_FACTOR + 1;
    let (lo, hi) = (xs[0], xs[xs.len() - 1]);
    let mesh: Vec<Real> = (0..n)
        .map(|i| lo + (hi - lo) * i as Real / (n - 1) as Real)
        .collect();

    let vols = match method {
        SmileInterpolation::Linear => {
            let interp = LinearInterpolation::new(&xs, &ys)?;
            mesh.iter().map(|&k| interp.value_at(k)).collect()
        }
        SmileInterpolation::CubicHermiteSpline => {
            let interp = CubicHermiteInterpolation::new(&xs, &ys)?;
            mesh.iter().map(|&k| interp.value_at(k)).collect()
        }
    };
    Ok((mesh, vols))
}
