//! Black (1976) option pricing on forwards.
//!
//! The caplet bootstrapper prices each caplet as a call on the forward rate
//! and the stripping solver inverts the cap premium through this formula.

use sabr_core::{Real, Time, Volatility};
use statrs::function::erf::erfc;

/// The standard normal cumulative distribution function Φ(x).
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Black (1976) undiscounted-forward option price, times `discount`.
///
/// `call` selects a call (caplet) or put (floorlet).  A non-positive
/// volatility or expiry collapses to the discounted intrinsic value.
pub fn black_price(
    call: bool,
    strike: Real,
    forward: Real,
    vol: Volatility,
    expiry: Time,
    discount: Real,
) -> Real {
    let omega = if call { 1.0 } else { -1.0 };

    let std_dev = vol * expiry.max(0.0).sqrt();
    if std_dev <= 0.0 || strike <= 0.0 || forward <= 0.0 {
        return discount * (omega * (forward - strike)).max(0.0);
    }

    let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
    let d2 = d1 - std_dev;

    discount * omega * (forward * normal_cdf(omega * d1) - strike * normal_cdf(omega * d2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_symmetry() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-15);
        for x in [0.1, 0.5, 1.0, 2.5] {
            let s = normal_cdf(x) + normal_cdf(-x);
            assert!((s - 1.0).abs() < 1e-14, "x = {x}");
        }
    }

    #[test]
    fn cdf_known_value() {
        // Φ(1.96) ≈ 0.9750021
        assert!((normal_cdf(1.96) - 0.975_002_1).abs() < 1e-6);
    }

    #[test]
    fn atm_call_put_parity() {
        let c = black_price(true, 0.05, 0.05, 0.2, 1.0, 0.95);
        let p = black_price(false, 0.05, 0.05, 0.2, 1.0, 0.95);
        assert!((c - p).abs() < 1e-14, "ATM call {c} != put {p}");
        assert!(c > 0.0);
    }

    #[test]
    fn zero_vol_is_intrinsic() {
        let v = black_price(true, 0.04, 0.05, 0.0, 1.0, 0.9);
        assert!((v - 0.9 * 0.01).abs() < 1e-14);
        let v_otm = black_price(true, 0.06, 0.05, 0.0, 1.0, 0.9);
        assert_eq!(v_otm, 0.0);
    }

    #[test]
    fn price_increases_with_vol() {
        let lo = black_price(true, 0.05, 0.05, 0.1, 2.0, 1.0);
        let hi = black_price(true, 0.05, 0.05, 0.3, 2.0, 1.0);
        assert!(hi > lo);
    }
}
