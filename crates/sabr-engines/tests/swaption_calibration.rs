//! End-to-end swaption SABR calibration on an AUD market snapshot.

use sabr_engines::Engines;

const SETTINGS_HANDLE: &str = "SABR Settings 1";
const ENGINE_HANDLE: &str = "SABR Full Calibration 1";
const ATM_ENGINE_HANDLE: &str = "SABR ATM Calibration 1";
const BETA: f64 = 0.95;

const EXPIRIES: [&str; 7] = ["1y", "2y", "3y", "4y", "5y", "7y", "10y"];

const STRIKE_OFFSETS: [f64; 9] = [
    -0.01, -0.0075, -0.005, -0.0025, 0.0, 0.0025, 0.005, 0.0075, 0.01,
];

// Quoted lognormal vols in percent, one row per expiry.  The 4y row was
// not quoted on the snapshot date and comes through as zeros.
const VOL_QUOTES: [[f64; 9]; 7] = [
    [
        10.64927747244750,
        10.39994584260630,
        10.20193111881570,
        10.06617143365560,
        9.97219920761609,
        9.91915214635118,
        9.79728404410501,
        9.95835207658104,
        9.72665759006778,
    ],
    [
        10.71945067933860,
        10.47225313931150,
        10.26013281169220,
        10.09352837649130,
        9.99562871347315,
        9.93462583875790,
        9.83277616774097,
        9.96292868333144,
        10.07995797075100,
    ],
    [
        10.73464076629010,
        10.47782408038430,
        10.27969109831760,
        10.13079982425510,
        10.01932817283930,
        9.95142328386115,
        9.84832497447229,
        9.92376362935676,
        9.79126953081919,
    ],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [
        10.71284746646270,
        10.42348311645850,
        10.21182829617250,
        10.05813933315390,
        9.95608449408524,
        9.87432868808041,
        9.76560385799806,
        9.87023985544692,
        9.69248020548528,
    ],
    [
        10.73741477761890,
        10.47825361823840,
        10.28001650952580,
        10.10364290373030,
        9.98568013928443,
        9.90003220294389,
        9.77431532150208,
        9.85123467628954,
        9.67881771828221,
    ],
    [
        10.62690693405300,
        10.35220865860990,
        10.12715394280070,
        9.94815984494852,
        9.82843523464171,
        9.74581252646963,
        9.61090280165564,
        9.71961846875728,
        9.51894989184063,
    ],
];

const ASSET_EXPIRIES: [&str; 11] = [
    "1m", "2m", "3m", "6m", "1y", "2y", "3y", "4y", "5y", "7y", "10y",
];

const ASSET_TENORS: [&str; 7] = ["1y", "2y", "3y", "4y", "5y", "7y", "10y"];

// Forward swap rates in percent, one row per asset expiry.
const ASSET_RATES: [[f64; 7]; 11] = [
    [6.8256130, 6.8257000, 6.8242390, 6.8589220, 6.8315520, 6.7394660, 6.6439270],
    [6.8199790, 6.8226730, 6.8201770, 6.8543610, 6.8243310, 6.7334150, 6.6393830],
    [6.8158210, 6.8206630, 6.8165900, 6.8504960, 6.8181570, 6.7280850, 6.6355410],
    [6.8244690, 6.8255620, 6.8126460, 6.8440240, 6.8027940, 6.7148050, 6.6258740],
    [6.8247790, 6.8263350, 6.7950840, 6.8227380, 6.7580700, 6.6822070, 6.6026460],
    [6.8280000, 6.7787050, 6.7430000, 6.7183970, 6.6737840, 6.6039100, 6.5483780],
    [6.7262630, 6.6961020, 6.5945490, 6.6113380, 6.5806990, 6.5071840, 6.4826110],
    [6.6636030, 6.5141040, 6.4932670, 6.5210020, 6.4874660, 6.4551160, 6.4188970],
    [6.3394940, 6.3997920, 6.3953630, 6.4201080, 6.3850090, 6.4008770, 6.3521360],
    [6.3856010, 6.3350830, 6.2844070, 6.3705400, 6.3760590, 6.3450100, 6.2871660],
    [6.4446620, 6.3995600, 6.3530720, 6.3555290, 6.3071830, 6.2514870, 6.1309310],
];

fn percent(rows: &[[f64; 9]]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| row.iter().map(|v| v / 100.0).collect())
        .collect()
}

fn forwards() -> Vec<Vec<f64>> {
    ASSET_RATES
        .iter()
        .map(|row| row.iter().map(|v| v / 100.0).collect())
        .collect()
}

fn calibrated_engines() -> Engines {
    let engines = Engines::new();
    engines
        .add_calibration_settings(SETTINGS_HANDLE, "Swaption", "AUD", BETA)
        .unwrap();
    let handle = engines
        .calibrate_sabr_model(
            ENGINE_HANDLE,
            SETTINGS_HANDLE,
            &EXPIRIES,
            &STRIKE_OFFSETS,
            &percent(&VOL_QUOTES),
            &ASSET_EXPIRIES,
            &ASSET_TENORS,
            &forwards(),
        )
        .unwrap();
    assert_eq!(handle, ENGINE_HANDLE);
    engines
}

#[test]
fn full_calibration_reprices_the_market_point() {
    let engines = calibrated_engines();
    let vol = engines
        .sabr_interpolate_volatility(ENGINE_HANDLE, "3y", "2y", 6.594549 / 100.0)
        .unwrap();
    assert!(
        (vol - 0.100330471262802).abs() < 1e-2,
        "interpolated vol {vol}"
    );
}

#[test]
fn quoted_pairs_are_calibrated_and_the_blank_row_is_not() {
    let engines = calibrated_engines();
    assert!(engines.is_model_calibrated(ENGINE_HANDLE, "3y", "2y"));
    assert!(engines.is_model_calibrated(ENGINE_HANDLE, "10y", "7y"));
    // The 4y expiry row was all zeros and must be skipped silently
    assert!(!engines.is_model_calibrated(ENGINE_HANDLE, "4y", "2y"));
    assert!(!engines.is_model_calibrated(ENGINE_HANDLE, "42y", "2y"));
}

#[test]
fn beta_is_held_fixed_and_the_error_is_the_accuracy_target() {
    let engines = calibrated_engines();
    let beta = engines
        .sabr_parameter("Beta", ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    assert_eq!(beta, BETA);
    let error = engines
        .sabr_calibration_error(ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    assert_eq!(error, 1e-5);
}

#[test]
fn fitted_parameters_are_in_range() {
    let engines = calibrated_engines();
    for expiry in ["1y", "3y", "10y"] {
        for tenor in ["1y", "5y"] {
            let alpha = engines
                .sabr_parameter("Alpha", ENGINE_HANDLE, expiry, tenor)
                .unwrap();
            let nu = engines
                .sabr_parameter("Nu", ENGINE_HANDLE, expiry, tenor)
                .unwrap();
            let rho = engines
                .sabr_parameter("Rho", ENGINE_HANDLE, expiry, tenor)
                .unwrap();
            assert!(alpha > 0.0, "alpha {alpha} at ({expiry},{tenor})");
            assert!(nu >= 0.0, "nu {nu} at ({expiry},{tenor})");
            assert!((-1.0..=1.0).contains(&rho), "rho {rho} at ({expiry},{tenor})");
        }
    }
}

#[test]
fn missing_engine_and_key_messages() {
    let engines = calibrated_engines();
    let err = engines
        .sabr_parameter("Alpha", "Not an Engine", "3y", "2y")
        .unwrap_err();
    assert_eq!(err.to_string(), "Calibration Engine Not an Engine not found.");

    let err = engines
        .sabr_calibration_error(ENGINE_HANDLE, "4y", "2y")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The Calibration Engine with Key(4y,2y) not found."
    );
}

#[test]
fn recalibration_under_the_same_handle_is_idempotent() {
    let engines = calibrated_engines();
    let before = engines
        .sabr_parameter("Alpha", ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    // The whole pipeline is deterministic, so a re-run stores the same node
    engines
        .calibrate_sabr_model(
            ENGINE_HANDLE,
            SETTINGS_HANDLE,
            &EXPIRIES,
            &STRIKE_OFFSETS,
            &percent(&VOL_QUOTES),
            &ASSET_EXPIRIES,
            &ASSET_TENORS,
            &forwards(),
        )
        .unwrap();
    let after = engines
        .sabr_parameter("Alpha", ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn atm_calibration_from_a_single_quote() {
    let engines = Engines::new();
    engines
        .add_calibration_settings(SETTINGS_HANDLE, "Swaption", "AUD", BETA)
        .unwrap();
    let handle = engines
        .calibrate_sabr_atm_model(
            ATM_ENGINE_HANDLE,
            SETTINGS_HANDLE,
            0.1045,
            -0.47,
            0.1154,
            0.1098,
            "3y",
            None,
        )
        .unwrap();
    assert_eq!(handle, ATM_ENGINE_HANDLE);
    assert!(engines.is_model_calibrated(ATM_ENGINE_HANDLE, "3y", "0y"));
    let alpha = engines
        .sabr_parameter("Alpha", ATM_ENGINE_HANDLE, "3y", "0y")
        .unwrap();
    assert!(alpha > 0.0 && alpha < 1.0, "alpha {alpha}");
    // ATM vol is recovered by evaluating the smile at the forward
    let vol = engines
        .sabr_interpolate_volatility(ATM_ENGINE_HANDLE, "3y", "0y", 0.1098)
        .unwrap();
    assert!((vol - 0.1154).abs() < 1e-4, "ATM vol {vol}");
}

#[test]
fn atm_engine_answers_for_any_asset_tenor() {
    let engines = Engines::new();
    engines
        .add_calibration_settings(SETTINGS_HANDLE, "Swaption", "AUD", BETA)
        .unwrap();
    engines
        .calibrate_sabr_atm_model(
            ATM_ENGINE_HANDLE,
            SETTINGS_HANDLE,
            0.1045,
            -0.47,
            0.1154,
            0.1098,
            "3y",
            None,
        )
        .unwrap();
    // The quote carried no asset tenor, so the expiry alone matches
    assert!(engines.is_model_calibrated(ATM_ENGINE_HANDLE, "3y", "2y"));
    assert!(!engines.is_model_calibrated(ATM_ENGINE_HANDLE, "5y", "2y"));
    let at_sentinel = engines
        .sabr_parameter("Alpha", ATM_ENGINE_HANDLE, "3y", "0y")
        .unwrap();
    let at_tenor = engines
        .sabr_parameter("Alpha", ATM_ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    assert_eq!(at_sentinel, at_tenor);
    let error = engines
        .sabr_calibration_error(ATM_ENGINE_HANDLE, "3y", "2y")
        .unwrap();
    assert_eq!(error, 1e-5);
}

#[test]
fn calibration_requires_settings() {
    let engines = Engines::new();
    let err = engines
        .calibrate_sabr_atm_model(
            ATM_ENGINE_HANDLE,
            "No Settings",
            0.1045,
            -0.47,
            0.1154,
            0.1098,
            "3y",
            None,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Calibration Settings No Settings not found.");
}
