//! Demand-side boundary conditions for building energy simulations.
//!
//! Generates time-stamped domestic hot/cold water demand profiles for
//! multi-dwelling residential buildings (deterministic envelopes and
//! seed-reproducible stochastic event draws under the COSTIC or RE2020
//! methods), plus volume-conserving resampling, flow-to-power conversion,
//! and expansion of compact day/week/period schedules into full-year,
//! timezone-localized setpoint series.

pub mod calibration;
pub mod config;
pub mod error;
pub mod export;
pub mod frame;
pub mod generator;
pub mod power;
pub mod resample;
pub mod schedule;

pub use calibration::Method;
pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use frame::TimeFrame;
pub use generator::DomesticWaterGenerator;
pub use power::calculate_power;
pub use resample::resample_flow_rate;
pub use schedule::{ScheduleSpec, Scheduler};
