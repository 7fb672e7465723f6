//! Caplet smile surface calibration on a USD-style quote set.

use sabr_core::Real;
use sabr_engines::{BootstrapProperties, Engines};
use sabr_time::Date;

const SETTINGS_HANDLE: &str = "Caplet Smile Settings";
const FIXED_HANDLE: &str = "USD Fixed Strike Engine";
const ATM_HANDLE: &str = "USD ATM Engine";
const SMILE_HANDLE: &str = "USD Caplet Smile";
const SMILE_BETA: f64 = 0.5;

const INSTRUMENTS: [&str; 7] = [
    "USD-CAPLET-1M-3M",
    "USD-CAPLET-4M-3M",
    "USD-CAPLET-7M-3M",
    "USD-IRCAP-1Y",
    "USD-IRCAP-2Y",
    "USD-IRCAP-3Y",
    "USD-IRCAP-4Y",
];

const STRIKES: [f64; 4] = [0.03, 0.04, 0.05, 0.06];

// Fixed-strike vol quotes in percent, one row per instrument, skewed
// against the strike the way the USD market quotes.
const FIXED_VOLS: [[f64; 4]; 7] = [
    [36.5, 33.2, 31.8, 31.2],
    [36.9, 33.6, 32.1, 31.5],
    [37.2, 33.9, 32.4, 31.8],
    [37.5, 34.2, 32.7, 32.1],
    [36.1, 33.0, 31.6, 31.0],
    [34.4, 31.5, 30.2, 29.7],
    [32.8, 30.1, 28.9, 28.4],
];

// ATM cap vols in percent for the same instruments.
const ATM_VOLS: [f64; 7] = [33.2, 33.5, 33.8, 34.1, 32.9, 31.3, 29.9];

fn base_date() -> Date {
    Date::from_ymd(2008, 5, 14).unwrap()
}

fn discount_grid() -> (Vec<Date>, Vec<Real>) {
    let base = base_date();
    let mut dates = Vec::new();
    let mut dfs = Vec::new();
    for q in 1..=20 {
        let d = base.add_months(3 * q).unwrap();
        let t = base.days_until(d) as Real / 365.0;
        dates.push(d);
        dfs.push((-0.045 * t).exp());
    }
    (dates, dfs)
}

fn percent(rows: &[[f64; 4]]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| row.iter().map(|v| v / 100.0).collect())
        .collect()
}

fn bootstrap_curves(engines: &Engines) {
    let (dates, dfs) = discount_grid();
    let fixed =
        BootstrapProperties::new("USD-LIBOR-3M", "USD", base_date(), FIXED_HANDLE);
    engines
        .create_cap_floor_curve(
            fixed,
            &INSTRUMENTS,
            &STRIKES,
            &percent(&FIXED_VOLS),
            &dates,
            &dfs,
        )
        .unwrap();
    let atm = BootstrapProperties::new("USD-LIBOR-3M", "USD", base_date(), ATM_HANDLE);
    let atm_vols: Vec<Real> = ATM_VOLS.iter().map(|v| v / 100.0).collect();
    engines
        .create_atm_cap_floor_curve(atm, &INSTRUMENTS, &atm_vols, &dates, &dfs)
        .unwrap();
}

fn calibrated_engines() -> Engines {
    let engines = Engines::new();
    bootstrap_curves(&engines);
    engines
        .add_smile_settings(SETTINGS_HANDLE, SMILE_BETA, "CubicHermiteSpline")
        .unwrap();
    let handle = engines
        .calibrate_smile_surface(SMILE_HANDLE, SETTINGS_HANDLE, ATM_HANDLE, FIXED_HANDLE)
        .unwrap();
    assert_eq!(handle, SMILE_HANDLE);
    engines
}

#[test]
fn surface_reproduces_the_quoted_skew_shape() {
    let engines = calibrated_engines();
    let vols = engines
        .smile_volatility(SMILE_HANDLE, 2.0, &STRIKES)
        .unwrap();
    assert_eq!(vols.len(), STRIKES.len());
    assert!(vols.iter().all(|v| *v > 0.15 && *v < 0.55), "{vols:?}");
    // Low strikes are quoted rich; the fitted smile must keep that shape
    assert!(vols[0] > vols[3], "{vols:?}");
}

#[test]
fn smile_level_tracks_the_atm_quotes() {
    let engines = calibrated_engines();
    // Near the forward (~4.5%) the smile should sit close to the ATM curve
    let vols = engines
        .smile_volatility(SMILE_HANDLE, 1.5, &[0.045])
        .unwrap();
    assert!((vols[0] - 0.33).abs() < 0.06, "{vols:?}");
}

#[test]
fn date_query_matches_the_time_query() {
    let engines = calibrated_engines();
    let target = base_date().add_days(730).unwrap();
    let by_date = engines
        .smile_volatility_at(SMILE_HANDLE, target, &[0.05])
        .unwrap();
    let by_time = engines
        .smile_volatility(SMILE_HANDLE, 2.0, &[0.05])
        .unwrap();
    assert!((by_date[0] - by_time[0]).abs() < 1e-12, "{by_date:?} vs {by_time:?}");
}

#[test]
fn missing_dependencies_are_reported_in_order() {
    let engines = Engines::new();

    let err = engines
        .calibrate_smile_surface(SMILE_HANDLE, SETTINGS_HANDLE, ATM_HANDLE, FIXED_HANDLE)
        .unwrap_err();
    assert_eq!(err.to_string(), "ATM CapFloor Bootstrap engine not found.");

    bootstrap_curves(&engines);
    let err = engines
        .calibrate_smile_surface(SMILE_HANDLE, SETTINGS_HANDLE, ATM_HANDLE, "No Fixed")
        .unwrap_err();
    assert_eq!(err.to_string(), "Fixed Strike Bootstrap engines not found.");

    let err = engines
        .calibrate_smile_surface(SMILE_HANDLE, "No Settings", ATM_HANDLE, FIXED_HANDLE)
        .unwrap_err();
    assert_eq!(err.to_string(), "Caplet Smile Settings not found.");
}

#[test]
fn missing_surface_is_reported() {
    let engines = Engines::new();
    let err = engines
        .smile_volatility("Not a Surface", 2.0, &[0.05])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "SABR Caplet Smile Calibration engine not found."
    );
}

#[test]
fn recalibration_replaces_the_surface() {
    let engines = calibrated_engines();
    // Re-running under the same handle must overwrite, not error
    let handle = engines
        .calibrate_smile_surface(SMILE_HANDLE, SETTINGS_HANDLE, ATM_HANDLE, FIXED_HANDLE)
        .unwrap();
    assert_eq!(handle, SMILE_HANDLE);
    assert!(engines.smile_volatility(SMILE_HANDLE, 2.0, &[0.05]).is_ok());
}

#[test]
fn linear_presmoothing_also_calibrates() {
    let engines = Engines::new();
    bootstrap_curves(&engines);
    engines
        .add_smile_settings(SETTINGS_HANDLE, SMILE_BETA, "Linear")
        .unwrap();
    engines
        .calibrate_smile_surface(SMILE_HANDLE, SETTINGS_HANDLE, ATM_HANDLE, FIXED_HANDLE)
        .unwrap();
    let vols = engines
        .smile_volatility(SMILE_HANDLE, 1.0, &[0.035, 0.045, 0.055])
        .unwrap();
    assert!(vols.iter().all(|v| v.is_finite() && *v > 0.0), "{vols:?}");
}
