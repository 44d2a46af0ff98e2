//! Threshold calibration
//!
//! Derives sleeper/trap/bomb/playable/synergy cutoffs from the empirical
//! distribution of the current data set instead of fixed constants.
//!
//! The expected win rate model below is shared by the calibrator and the
//! irregularity detector. Its coefficients move every downstream
//! classification at once, so they live in one place.

mod calibrator;
mod validation;

pub use calibrator::{Calibration, CalibrationStats, Calibrator, MIN_CALIBRATION_GAMES};
pub use validation::{validate_calibration, CalibrationValidation, DetectionMetrics};

use crate::models::CardStats;

/// Baseline win rate of a card nobody wants
pub const EXPECTED_WR_BASE: f64 = 0.50;
/// Win rate gained per unit of pick rate
pub const EXPECTED_WR_PICK_RATE_COEF: f64 = 0.12;
/// Win rate lost per pick of ALSA after pick 7
pub const EXPECTED_WR_ALSA_COEF: f64 = 0.01;

/// Win rate the draft signals predict for a card:
/// `0.50 + pick_rate * 0.12 - (alsa - 7) * 0.01`
pub fn expected_win_rate(stats: &CardStats) -> f64 {
    EXPECTED_WR_BASE + stats.pick_rate() * EXPECTED_WR_PICK_RATE_COEF
        - (stats.alsa - 7.0) * EXPECTED_WR_ALSA_COEF
}
