//! Flow-rate to thermal-power conversion.

use crate::error::Result;
use crate::frame::{TimeFrame, TimePoint};

/// Joules per kilowatt-hour, the denominator turning `L × J/(kg·K) × K`
/// into kilowatts on an hourly series.
const KWH_TO_J: f64 = 3.6e6;

/// Converts every `flow_rate*` column of `frame` into thermal power.
///
/// Each matching column `X` yields an output column `P_X(kW)` holding
/// `value × cp × delta_t / 3.6e6`. The conversion is exact and elementwise,
/// the index and row count are preserved, and columns that do not match are
/// dropped.
///
/// # Errors
///
/// Never fails for a well-formed frame; the `Result` only propagates the
/// frame-construction invariants.
pub fn calculate_power<T: TimePoint>(
    frame: &TimeFrame<T>,
    delta_t: f64,
    cp: f64,
) -> Result<TimeFrame<T>> {
    let mut out = TimeFrame::new(frame.index().to_vec())?;
    for (name, values) in frame.columns() {
        if !name.starts_with("flow_rate") {
            continue;
        }
        let power: Vec<f64> = values.iter().map(|v| v * cp * delta_t / KWH_TO_J).collect();
        out.insert(format!("P_{name}(kW)"), power)?;
    }
    Ok(out)
}
