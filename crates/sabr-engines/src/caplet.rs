//! Caplet volatility bootstrapping.
//!
//! Quoted cap/floor market data mixes two instrument kinds: ETO quotes,
//! which are caplet volatilities observed directly at a day offset, and
//! IRCAP quotes, which are flat volatilities for caps running from the
//! valuation date.  The ETO quotes seed the short end: a 0.75y and a 1y
//! cap are priced off them and solved back to flat volatilities, which
//! extends the quoted par volatility curve below the first cap.  The strip
//! then walks out one roll at a time, repricing a cap at the par
//! volatility interpolated for its maturity; every caplet but the newest
//! is priced at its already stripped volatility and Brent solves the
//! newest one from the remainder.

use std::collections::BTreeMap;

use sabr_core::errors::{Error, Result};
use sabr_core::{Rate, Real, Time, Volatility};
use sabr_math::black::black_price;
use sabr_math::solvers::brent;
use sabr_time::{Actual365Fixed, Date, DayCounter, Tenor};

use crate::discount::DiscountCurve;
use crate::properties::BootstrapProperties;

const DAYS_PER_YEAR: Real = 365.0;
const STRIP_ACCURACY: Real = 1.0e-10;
const STRIKE_MATCH: Real = 1.0e-9;

// ETO quotes are flat-extended out to nine months so the short-end caps
// can be priced even when the quoted offsets stop earlier.
const ETO_COVERAGE_DAYS: Real = 274.0;

// Sub-annual cap maturities solved off the ETO quotes to extend the par
// volatility curve below the first quoted cap.
const SHORT_END_MATURITIES: [Real; 2] = [0.75, 1.0];

/// One parsed quote label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapFloorQuote {
    /// A directly observed caplet volatility at a day offset.
    Eto {
        /// Days from the valuation date to the caplet expiry.
        expiry_days: i32,
    },
    /// A flat cap volatility for a cap of the given tenor.
    Cap {
        /// Cap tenor from the valuation date.
        tenor: Tenor,
    },
}

/// Parse an instrument label such as `"AUD-CAPLET-36D-90D"` or
/// `"USD-IRCAP-2Y"` into its currency and quote kind.
///
/// # Errors
/// Labels that do not follow either shape fail with the label named.
pub fn parse_instrument(label: &str) -> Result<(String, CapFloorQuote)> {
    let parts: Vec<&str> = label.split('-').collect();
    let bad = || Error::Validation(format!("Unknown instrument {label} specified."));
    if parts.len() < 3 {
        return Err(bad());
    }
    let currency = parts[0].to_string();
    match parts[1].to_uppercase().as_str() {
        "CAPLET" => {
            // The offset is usually quoted in days ("36D") but month
            // offsets ("1M") appear in some markets
            let offset = Tenor::parse(parts[2]).map_err(|_| bad())?;
            Ok((
                currency,
                CapFloorQuote::Eto {
                    expiry_days: offset.approx_days() as i32,
                },
            ))
        }
        "IRCAP" => {
            let tenor = Tenor::parse(parts[2]).map_err(|_| bad())?;
            Ok((currency, CapFloorQuote::Cap { tenor }))
        }
        _ => Err(bad()),
    }
}

#[derive(Debug, Clone, Copy)]
struct Caplet {
    reset: Date,
    expiry_days: Real,
    accrual: Real,
    forward: Rate,
    discount: Real,
}

impl Caplet {
    fn expiry_time(&self) -> Time {
        self.expiry_days / DAYS_PER_YEAR
    }
}

/// A bootstrapped caplet volatility curve, one column per quoted strike.
///
/// An ATM curve has a single column, stripped with each cap struck at its
/// par swap rate; a fixed-strike curve strips one column per quoted
/// strike.
#[derive(Debug, Clone)]
pub struct CapletCurve {
    properties: BootstrapProperties,
    discount: DiscountCurve,
    strikes: Vec<Real>,
    columns: Vec<Vec<(Real, Volatility)>>,
    is_atm: bool,
}

impl CapletCurve {
    /// Bootstrap an ATM curve: each cap is struck at its par swap rate.
    ///
    /// `vols` carries one quote per instrument label.
    pub fn bootstrap_atm(
        properties: BootstrapProperties,
        instruments: &[&str],
        vols: &[Volatility],
        discount_dates: &[Date],
        discount_factors: &[Real],
    ) -> Result<Self> {
        let discount = DiscountCurve::new(properties.valuation_date, discount_dates, discount_factors)?;
        let quotes = parse_quotes(instruments, vols)?;
        let nodes = strip_column(&properties, &discount, None, &quotes)?;
        Ok(Self {
            properties,
            discount,
            strikes: vec![0.0],
            columns: vec![nodes],
            is_atm: true,
        })
    }

    /// Bootstrap a fixed-strike curve with one column per quoted strike.
    ///
    /// `vols[i][j]` quotes instrument `i` at strike `strikes[j]`.
    pub fn bootstrap_fixed(
        properties: BootstrapProperties,
        instruments: &[&str],
        strikes: &[Real],
        vols: &[Vec<Volatility>],
        discount_dates: &[Date],
        discount_factors: &[Real],
    ) -> Result<Self> {
        sabr_core::ensure!(!strikes.is_empty(), "no strikes quoted for the bootstrap");
        sabr_core::ensure!(
            vols.len() == instruments.len(),
            "volatility grid has {} rows for {} instruments",
            vols.len(),
            instruments.len()
        );
        let discount = DiscountCurve::new(properties.valuation_date, discount_dates, discount_factors)?;

        let mut columns = Vec::with_capacity(strikes.len());
        for (j, &strike) in strikes.iter().enumerate() {
            sabr_core::ensure!(strike > 0.0, "quoted strike {strike} is not positive");
            let column_vols: Vec<Volatility> = vols
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    if row.len() == strikes.len() {
                        Ok(row[j])
                    } else {
                        Err(Error::Validation(format!(
                            "volatility row {i} has {} entries for {} strikes",
                            row.len(),
                            strikes.len()
                        )))
                    }
                })
                .collect::<Result<_>>()?;
            let quotes = parse_quotes(instruments, &column_vols)?;
            columns.push(strip_column(&properties, &discount, Some(strike), &quotes)?);
        }
        Ok(Self {
            properties,
            discount,
            strikes: strikes.to_vec(),
            columns,
            is_atm: false,
        })
    }

    /// The bootstrap configuration the curve was built with.
    pub fn properties(&self) -> &BootstrapProperties {
        &self.properties
    }

    /// The discount curve used for stripping.
    pub fn discount(&self) -> &DiscountCurve {
        &self.discount
    }

    /// The quoted strike columns (a single zero for an ATM curve).
    pub fn strikes(&self) -> &[Real] {
        &self.strikes
    }

    /// Whether the curve was bootstrapped at-the-money.
    pub fn is_atm(&self) -> bool {
        self.is_atm
    }

    /// Day offsets of the bootstrapped nodes (taken from the first column;
    /// every column shares the same quoted instruments).
    pub fn node_offsets(&self) -> Vec<Real> {
        self.columns[0].iter().map(|n| n.0).collect()
    }

    /// Caplet volatility of column `column` at `offset_days`, interpolated
    /// linearly in total variance.
    pub fn column_volatility(&self, column: usize, offset_days: Real) -> Volatility {
        interpolate_variance(&self.columns[column], offset_days)
    }

    /// Caplet volatility at `strike` for a caplet expiring at `target`.
    ///
    /// The strike must be one the curve was bootstrapped at; an ATM curve
    /// accepts 0 and, when the configuration carries a strike override,
    /// that strike too.  Expiry time is measured ACT/365 from `base_date`.
    ///
    /// # Errors
    /// Unknown strikes and targets before the base date are rejected.
    pub fn compute_caplet_volatility(
        &self,
        strike: Real,
        base_date: Date,
        target: Date,
    ) -> Result<Volatility> {
        let column = if self.is_atm {
            let override_matches = self
                .properties
                .strike
                .is_some_and(|s| (s - strike).abs() < STRIKE_MATCH);
            (strike.abs() < STRIKE_MATCH || override_matches).then_some(0)
        } else {
            self.strikes
                .iter()
                .position(|&s| (s - strike).abs() < STRIKE_MATCH)
        };
        let column = column.ok_or_else(|| {
            Error::Validation(format!(
                "The strike value: {strike} is not valid for this CapletBootstrapper."
            ))
        })?;
        let offset = base_date.days_until(target);
        sabr_core::ensure!(
            offset >= 0,
            "caplet expiry {target} precedes the base date {base_date}"
        );
        Ok(self.column_volatility(column, offset as Real))
    }
}

fn parse_quotes(
    instruments: &[&str],
    vols: &[Volatility],
) -> Result<Vec<(CapFloorQuote, Volatility)>> {
    sabr_core::ensure!(
        instruments.len() == vols.len(),
        "{} instruments quoted with {} volatilities",
        instruments.len(),
        vols.len()
    );
    let mut quotes = Vec::with_capacity(instruments.len());
    for (&label, &vol) in instruments.iter().zip(vols.iter()) {
        sabr_core::ensure!(
            vol.is_finite() && vol >= 0.0,
            "An illegal volatility value: {vol} was quoted for {label}."
        );
        let (_, quote) = parse_instrument(label)?;
        quotes.push((quote, vol));
    }
    // ETO nodes first, then caps in maturity order
    quotes.sort_by_key(|(q, _)| match q {
        CapFloorQuote::Eto { expiry_days } => (0, *expiry_days as u32),
        CapFloorQuote::Cap { tenor } => (1, tenor.approx_days()),
    });
    Ok(quotes)
}

/// The roll schedule of a cap running `maturity_years` from the valuation
/// date, at the index frequency and business-day adjusted.
///
/// A USD cap omits its first caplet by market convention, so its schedule
/// starts at the first roll instead of the valuation date.
fn roll_schedule(properties: &BootstrapProperties, maturity_years: Real) -> Result<Vec<Date>> {
    let rolls = (maturity_years * properties.rolls_per_year() as Real).floor() as u32;
    sabr_core::ensure!(
        rolls >= 1,
        "cap maturity {maturity_years} is shorter than one roll"
    );
    let months = properties.months_per_roll();

    let mut dates = Vec::with_capacity(rolls as usize + 1);
    if !properties.currency.eq_ignore_ascii_case("USD") {
        dates.push(properties.valuation_date);
    }
    for i in 1..=rolls {
        let unadjusted = properties.valuation_date.add_months((months * i) as i32)?;
        dates.push(properties.roll_convention.adjust(unadjusted)?);
    }
    sabr_core::ensure!(
        dates.len() >= 2,
        "cap maturity {maturity_years} has no caplets"
    );
    Ok(dates)
}

/// Caplet `i` resets on roll `i` and pays on roll `i + 1`.  A caplet
/// resetting on the valuation date prices at its discounted intrinsic.
fn cap_caplets(
    properties: &BootstrapProperties,
    discount: &DiscountCurve,
    schedule: &[Date],
) -> Result<Vec<Caplet>> {
    let mut caplets = Vec::with_capacity(schedule.len().saturating_sub(1));
    for pair in schedule.windows(2) {
        let (reset, pay) = (pair[0], pair[1]);
        caplets.push(Caplet {
            reset,
            expiry_days: properties.valuation_date.days_until(reset) as Real,
            accrual: Actual365Fixed.year_fraction(reset, pay),
            forward: discount.forward_rate(reset, pay)?,
            discount: discount.discount_factor(pay)?,
        });
    }
    Ok(caplets)
}

/// ACT/365 year fraction from the valuation date to the last roll date.
fn schedule_maturity(properties: &BootstrapProperties, schedule: &[Date]) -> Real {
    schedule
        .last()
        .map_or(0.0, |&d| properties.valuation_date.days_until(d) as Real / DAYS_PER_YEAR)
}

/// The par swap rate of a cap schedule, from the discount curve.
fn swap_rate(discount: &DiscountCurve, schedule: &[Date]) -> Result<Rate> {
    let mut annuity = 0.0;
    for pair in schedule.windows(2) {
        let tau = Actual365Fixed.year_fraction(pair[0], pair[1]);
        annuity += tau * discount.discount_factor(pair[1])?;
    }
    sabr_core::ensure!(annuity > 0.0, "cap schedule has a degenerate annuity");
    let first = discount.discount_factor(schedule[0])?;
    let last = discount.discount_factor(schedule[schedule.len() - 1])?;
    Ok((first - last) / annuity)
}

fn caplet_price(caplet: &Caplet, strike: Real, vol: Volatility) -> Real {
    caplet.accrual
        * black_price(
            true,
            strike,
            caplet.forward,
            vol,
            caplet.expiry_time(),
            caplet.discount,
        )
}

fn cap_strike(
    strike: Option<Real>,
    discount: &DiscountCurve,
    schedule: &[Date],
) -> Result<Real> {
    match strike {
        Some(k) => Ok(k),
        None => swap_rate(discount, schedule),
    }
}

/// Strip one strike column.  `strike` is `None` for the ATM column, where
/// each cap is struck at its own par swap rate.
fn strip_column(
    properties: &BootstrapProperties,
    discount: &DiscountCurve,
    strike: Option<Real>,
    quotes: &[(CapFloorQuote, Volatility)],
) -> Result<Vec<(Real, Volatility)>> {
    sabr_core::ensure!(!quotes.is_empty(), "no cap/floor quotes to bootstrap");

    let mut eto: Vec<(Real, Volatility)> = Vec::new();
    let mut par: Vec<(Real, Volatility)> = Vec::new();
    let mut cap_tenors: Vec<Tenor> = Vec::new();
    for &(quote, vol) in quotes {
        match quote {
            CapFloorQuote::Eto { expiry_days } => eto.push((expiry_days as Real, vol)),
            CapFloorQuote::Cap { tenor } => {
                let schedule = roll_schedule(properties, tenor.in_years())?;
                par.push((schedule_maturity(properties, &schedule), vol));
                cap_tenors.push(tenor);
            }
        }
    }
    sabr_core::ensure!(!par.is_empty(), "no cap quotes to bootstrap against");

    // Stripped caplet volatilities keyed by reset date.  Later schedules
    // extend earlier ones roll by roll, so every caplet except the newest
    // is already known when its cap is repriced.
    let mut results: BTreeMap<Date, Volatility> = BTreeMap::new();

    let start = if eto.is_empty() {
        // No short end to seed from; the first quoted cap is taken flat
        let schedule = roll_schedule(properties, cap_tenors[0].in_years())?;
        let flat = par[0].1;
        for caplet in cap_caplets(properties, discount, &schedule)? {
            results.insert(caplet.reset, flat);
        }
        par[0].0
    } else {
        eto.sort_by(|a, b| a.0.total_cmp(&b.0));
        if eto[0].0 > 0.0 {
            eto.insert(0, (0.0, eto[0].1));
        }
        let last = eto[eto.len() - 1];
        if last.0 < ETO_COVERAGE_DAYS {
            eto.push((ETO_COVERAGE_DAYS, last.1));
        }

        for &maturity in SHORT_END_MATURITIES.iter() {
            let schedule = roll_schedule(properties, maturity)?;
            let caplets = cap_caplets(properties, discount, &schedule)?;
            let k = cap_strike(strike, discount, &schedule)?;
            let target: Real = caplets
                .iter()
                .map(|c| caplet_price(c, k, interpolate_linear(&eto, c.expiry_days)))
                .sum();
            let flat = brent(
                |x| caplets.iter().map(|c| caplet_price(c, k, x)).sum::<Real>() - target,
                1.0e-4,
                2.0,
                STRIP_ACCURACY,
            )?;
            if !par.iter().any(|&(m, _)| (m - maturity).abs() < 1e-9) {
                par.push((maturity, flat));
            }
        }

        // The 1y schedule's caplets become the short-end curve nodes
        let schedule = roll_schedule(properties, SHORT_END_MATURITIES[1])?;
        for caplet in cap_caplets(properties, discount, &schedule)? {
            results.insert(caplet.reset, interpolate_linear(&eto, caplet.expiry_days));
        }
        SHORT_END_MATURITIES[1]
    };

    par.sort_by(|a, b| a.0.total_cmp(&b.0));
    let finish = par[par.len() - 1].0;
    let increment = 1.0 / properties.rolls_per_year() as Real;

    let mut maturity = start + increment;
    while maturity <= finish + 1e-9 {
        let schedule = roll_schedule(properties, maturity)?;
        let caplets = cap_caplets(properties, discount, &schedule)?;
        let Some((newest, known)) = caplets.split_last() else {
            maturity += increment;
            continue;
        };

        let flat = interpolate_linear(&par, schedule_maturity(properties, &schedule));
        let k = cap_strike(strike, discount, &schedule)?;
        let target: Real = caplets.iter().map(|c| caplet_price(c, k, flat)).sum();

        let mut stripped = 0.0;
        for caplet in known {
            let vol = match results.get(&caplet.reset) {
                Some(v) => *v,
                None => sabr_core::fail!(
                    "no stripped caplet volatility at the {} reset",
                    caplet.reset
                ),
            };
            stripped += caplet_price(caplet, k, vol);
        }

        let objective = |x: Real| stripped + caplet_price(newest, k, x) - target;
        let solved = match brent(objective, 1.0e-4, 2.0, STRIP_ACCURACY) {
            Ok(x) if x > 0.0 => x,
            // An inverted or arbitrageable quote leaves no root; carry
            // the previous caplet volatility forward.
            _ => results.values().next_back().copied().unwrap_or(flat),
        };
        results.insert(newest.reset, solved);
        maturity += increment;
    }

    Ok(results
        .iter()
        .map(|(&d, &v)| (properties.valuation_date.days_until(d) as Real, v))
        .collect())
}

/// Linear interpolation over `(x, y)` nodes sorted by `x`, flat beyond the
/// ends.
fn interpolate_linear(nodes: &[(Real, Real)], x: Real) -> Real {
    debug_assert!(!nodes.is_empty());
    if x <= nodes[0].0 {
        return nodes[0].1;
    }
    let last = nodes[nodes.len() - 1];
    if x >= last.0 {
        return last.1;
    }
    let i = nodes.partition_point(|n| n.0 <= x) - 1;
    let (x0, y0) = nodes[i];
    let (x1, y1) = nodes[i + 1];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Interpolate a caplet volatility at `offset_days`, linear in total
/// variance `v²·t` between nodes and flat beyond the ends.
fn interpolate_variance(nodes: &[(Real, Volatility)], offset_days: Real) -> Volatility {
    debug_assert!(!nodes.is_empty());
    if offset_days <= nodes[0].0 {
        return nodes[0].1;
    }
    let last = nodes[nodes.len() - 1];
    if offset_days >= last.0 {
        return last.1;
    }
    let i = nodes.partition_point(|n| n.0 <= offset_days) - 1;
    let (d0, v0) = nodes[i];
    let (d1, v1) = nodes[i + 1];
    let (t0, t1, t) = (
        d0 / DAYS_PER_YEAR,
        d1 / DAYS_PER_YEAR,
        offset_days / DAYS_PER_YEAR,
    );
    let w0 = v0 * v0 * t0;
    let w1 = v1 * v1 * t1;
    let w = w0 + (w1 - w0) * (t - t0) / (t1 - t0);
    if t <= 0.0 {
        return v0;
    }
    (w / t).max(0.0).sqrt()
}
