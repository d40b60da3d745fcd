//! Shared test fixtures for integration tests.

use building_profiles::config::GeneratorConfig;
use building_profiles::generator::DomesticWaterGenerator;
use building_profiles::schedule::ScheduleSpec;
use building_profiles::Method;
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp literal helper.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid literal date")
}

/// COSTIC generator with default physical parameters.
pub fn costic_generator(n_dwellings: u32) -> DomesticWaterGenerator {
    DomesticWaterGenerator::new(GeneratorConfig {
        n_dwellings,
        ..GeneratorConfig::default()
    })
    .expect("valid config")
}

/// RE2020 generator for a given building geometry.
pub fn re2020_generator(n_dwellings: u32, s_moy: f64, s_tot: f64) -> DomesticWaterGenerator {
    DomesticWaterGenerator::new(GeneratorConfig {
        n_dwellings,
        method: Method::Re2020,
        s_moy_dwelling: s_moy,
        s_tot_building: s_tot,
        ..GeneratorConfig::default()
    })
    .expect("valid config")
}

/// Asserts `actual` is within `rtol` relative tolerance of `expected`.
pub fn assert_close(actual: f64, expected: f64, rtol: f64) {
    assert!(
        (actual - expected).abs() <= rtol * expected.abs(),
        "expected {actual} to be within {rtol} relative tolerance of {expected}"
    );
}

/// Heating/ventilation schedule with distinct winter and summer weeks under
/// a DST-observing timezone.
pub fn reference_schedule_spec() -> ScheduleSpec {
    toml::from_str(
        r#"
        tz = "Europe/Paris"

        [days.working_day]
        "09:15" = { heating = 17.0, extraction_flow_rate = 0.0 }
        "18:00" = { heating = 21.0, extraction_flow_rate = 3000.0 }
        "19:00" = { heating = 22.0 }
        "23:00" = { heating = 17.0, extraction_flow_rate = 0.0 }

        [days.Off]
        "23:00" = { heating = 17.0, extraction_flow_rate = 0.0 }

        [weeks.winter_week]
        Monday = "working_day"
        Tuesday = "working_day"
        Wednesday = "working_day"
        Thursday = "working_day"
        Friday = "working_day"
        Saturday = "Off"
        Sunday = "Off"

        [weeks.summer_week]
        Monday = "Off"
        Tuesday = "Off"
        Wednesday = "Off"
        Thursday = "Off"
        Friday = "Off"
        Saturday = "Off"
        Sunday = "Off"

        [[periods]]
        start = "01-01"
        end = "03-31"
        week = "winter_week"

        [[periods]]
        start = "04-01"
        end = "09-30"
        week = "summer_week"

        [[periods]]
        start = "10-01"
        end = "12-31"
        week = "winter_week"
        "#,
    )
    .expect("valid spec toml")
}
