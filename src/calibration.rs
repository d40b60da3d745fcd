//! Calibration tables for the COSTIC and RE2020 draw methods.
//!
//! COSTIC models relative hot-water intensity as the product of an hourly, a
//! weekly and a monthly factor taken from the COSTIC measurement campaign on
//! collective housing. RE2020 uses the regulation's fixed hourly repartition
//! keys (weekday / Saturday / Sunday, most off-peak hours zero) scaled by a
//! conventional daily draw per adult equivalent.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;

/// Calculation method selecting one of the two coefficient models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Method {
    /// COSTIC measurement-campaign coefficients (default).
    #[default]
    #[serde(rename = "COSTIC")]
    Costic,
    /// RE2020 regulation repartition keys.
    #[serde(rename = "RE2020")]
    Re2020,
}

impl Method {
    /// Regulation-style name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Costic => "COSTIC",
            Self::Re2020 => "RE2020",
        }
    }
}

/// COSTIC hourly factors, midnight through 23h.
pub const COSTIC_HOURLY: [f64; 24] = [
    0.264, 0.096, 0.048, 0.024, 0.048, 0.120, 0.480, 1.104, 1.536, 1.680, 1.728, 1.752, 1.440,
    1.200, 0.960, 0.840, 0.792, 0.888, 1.128, 1.320, 1.392, 1.200, 0.816, 0.480,
];

/// COSTIC weekly factors, Monday through Sunday.
pub const COSTIC_WEEKLY: [f64; 7] = [1.13, 1.04, 1.06, 1.01, 0.94, 0.72, 0.92];

/// COSTIC monthly factors, January through December.
pub const COSTIC_MONTHLY: [f64; 12] = [
    1.13, 1.11, 1.08, 1.00, 0.95, 0.88, 0.84, 1.02, 1.13, 1.04, 1.08, 1.10,
];

/// RE2020 hourly repartition keys for Monday through Friday.
pub const RE2020_KEYS_WEEKDAY: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.011, 0.055, 0.044, 0.022, 0.011, 0.011, 0.011, 0.011, 0.0,
    0.0, 0.0, 0.011, 0.011, 0.033, 0.022, 0.055, 0.044, 0.011,
];

/// RE2020 hourly repartition keys for Saturday.
pub const RE2020_KEYS_SATURDAY: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.033, 0.055, 0.044, 0.022, 0.011, 0.011, 0.011, 0.0, 0.0,
    0.0, 0.011, 0.022, 0.033, 0.022, 0.044, 0.033, 0.011,
];

/// RE2020 hourly repartition keys for Sunday.
pub const RE2020_KEYS_SUNDAY: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.029, 0.058, 0.044, 0.022, 0.011, 0.011, 0.011, 0.0, 0.0,
    0.0, 0.011, 0.011, 0.022, 0.033, 0.044, 0.033, 0.011,
];

/// Regulation safety factor applied on top of the RE2020 repartition keys.
pub const RE2020_REGULATION_FACTOR: f64 = 0.95;

/// Conventional RE2020 daily draw at 40 °C per adult equivalent, in liters,
/// before hourly key weighting. The key tables integrate to roughly 0.376
/// per day, so a dwelling's daily need lands near the regulation's 56 L per
/// adult equivalent.
pub const RE2020_DAILY_DRAW_L: f64 = 156.8;

/// COSTIC intensity coefficient at `t`.
///
/// Product of the hourly, weekly and monthly factors; dimensionless, around
/// 1.0 on an average hour.
pub fn costic_coefficient(t: NaiveDateTime) -> f64 {
    let hourly = COSTIC_HOURLY[t.hour() as usize];
    let weekly = COSTIC_WEEKLY[t.weekday().num_days_from_monday() as usize];
    let monthly = COSTIC_MONTHLY[t.month() as usize - 1];
    hourly * weekly * monthly
}

/// RE2020 repartition key for the given weekday and hour of day.
pub fn re2020_key(weekday: Weekday, hour: u32) -> f64 {
    let table = match weekday {
        Weekday::Sat => &RE2020_KEYS_SATURDAY,
        Weekday::Sun => &RE2020_KEYS_SUNDAY,
        _ => &RE2020_KEYS_WEEKDAY,
    };
    table[hour as usize]
}

/// RE2020 intensity coefficient at `t` (repartition key times the
/// regulation factor).
pub fn re2020_coefficient(t: NaiveDateTime) -> f64 {
    re2020_key(t.weekday(), t.hour()) * RE2020_REGULATION_FACTOR
}

/// RE2020 adult equivalents per dwelling as a function of the average
/// dwelling floor area in square meters (piecewise per the regulation).
pub fn adult_equivalents(s_moy_dwelling: f64) -> f64 {
    if s_moy_dwelling < 10.0 {
        1.0
    } else if s_moy_dwelling < 50.0 {
        1.75 - 0.01875 * (50.0 - s_moy_dwelling)
    } else {
        0.035 * s_moy_dwelling
    }
}
