//! Integration tests for the domestic water demand generators.

mod common;

use building_profiles::export::write_csv;
use building_profiles::{TimeFrame, calculate_power, resample_flow_rate};
use chrono::TimeDelta;
use common::{assert_close, at, costic_generator, re2020_generator};

#[test]
fn random_shower_sum_converges_to_deterministic_envelope() {
    let generator = costic_generator(50);
    let start = at(2022, 1, 1, 0);
    let end = at(2024, 10, 20, 1);

    let envelope = generator
        .costic_shower_distribution(start, end)
        .expect("deterministic envelope");
    let expected = envelope.sum("Q_ECS_COSTIC").expect("column exists");

    let seeded = generator
        .costic_random_shower_distribution(start, end, Some(42))
        .expect("seeded draw");
    assert_close(seeded.sum("Q_ECS_COSTIC_rd").expect("column exists"), expected, 0.05);

    let unseeded = generator
        .costic_random_shower_distribution(start, end, None)
        .expect("entropy draw");
    assert_close(unseeded.sum("Q_ECS_COSTIC_rd").expect("column exists"), expected, 0.05);
}

#[test]
fn seeded_draws_are_reproducible_and_isolated() {
    let generator = costic_generator(20);
    let start = at(2023, 1, 1, 0);
    let end = at(2023, 6, 30, 23);

    let first = generator
        .costic_random_shower_distribution(start, end, Some(7))
        .expect("draw");
    // An interleaved call with a different seed must not disturb the next one.
    let _ = generator
        .costic_random_shower_distribution(start, end, Some(1234))
        .expect("draw");
    let second = generator
        .costic_random_shower_distribution(start, end, Some(7))
        .expect("draw");
    assert_eq!(first, second);
}

#[test]
fn re2020_envelope_reproduces_reference_points() {
    let frame = re2020_generator(50, 49.6, 2480.0)
        .re2020_shower_distribution(at(2022, 1, 1, 0), at(2024, 10, 20, 1))
        .expect("envelope");
    // Wednesday in April: off-peak hour.
    assert_eq!(frame.at(at(2023, 4, 5, 0), "Q_ECS_RE2020"), Some(0.0));
    // Saturday in August, 20h.
    assert_close(
        frame.at(at(2023, 8, 26, 20), "Q_ECS_RE2020").expect("row exists"),
        285.5,
        0.05,
    );
    // Sunday in September, 08h.
    assert_close(
        frame.at(at(2023, 9, 10, 8), "Q_ECS_RE2020").expect("row exists"),
        752.7,
        0.05,
    );

    let frame = re2020_generator(12, 72.0, 1000.0)
        .re2020_shower_distribution(at(2022, 1, 1, 0), at(2024, 10, 20, 1))
        .expect("envelope");
    assert_close(
        frame.at(at(2023, 9, 10, 8), "Q_ECS_RE2020").expect("row exists"),
        261.3,
        0.05,
    );
}

#[test]
fn appliance_volumes_follow_cycle_counts() {
    let generator = costic_generator(14);
    let start = at(2020, 1, 1, 0);
    let end = at(2020, 12, 30, 23);
    let config = generator.config();
    let n_days = 365.0; // inclusive of both endpoint dates

    let frame = generator
        .appliances_water_distribution(start, end, Some(42), true, true)
        .expect("draw");

    let dish_total = (config.cycles_dish_pers / 365.0 * n_days).floor()
        * config.v_water_dish
        * f64::from(config.n_dwellings)
        * config.n_people_per_dwelling;
    let washer_total = (config.cycles_clothes_pers / 365.0 * n_days).floor()
        * config.v_water_clothes
        * f64::from(config.n_dwellings)
        * config.n_people_per_dwelling;

    assert_close(frame.sum("Q_dish").expect("column exists"), dish_total, 0.05);
    assert_close(frame.sum("Q_washer").expect("column exists"), washer_total, 0.05);
}

#[test]
fn single_appliance_yields_single_column() {
    let generator = costic_generator(3);
    let frame = generator
        .appliances_water_distribution(at(2023, 1, 1, 0), at(2023, 1, 31, 23), Some(1), true, false)
        .expect("draw");
    assert_eq!(frame.column_names(), vec!["Q_dish"]);
}

#[test]
fn cold_water_aggregate_matches_daily_washbasin_draw() {
    let generator = costic_generator(100);
    let start = at(2022, 1, 1, 0);
    let end = at(2022, 1, 20, 0);

    let frame = generator
        .costic_random_cold_water_distribution(start, end, Some(11))
        .expect("draw");

    // Both endpoint dates count, so Jan 1 through Jan 20 is 20 days.
    let expected = generator.config().v_washbasin.round() * 100.0 * 20.0;
    let total = frame.sum("Q_washbasin_COSTIC_rd").expect("column exists");
    assert_eq!(total, expected);
}

#[test]
fn cold_water_single_day_boundary() {
    let generator = costic_generator(5);
    let frame = generator
        .costic_random_cold_water_distribution(at(2022, 3, 1, 0), at(2022, 3, 1, 23), Some(2))
        .expect("draw");
    assert_eq!(frame.len(), 24);
    let expected = generator.config().v_washbasin.round() * 5.0;
    assert_eq!(frame.sum("Q_washbasin_COSTIC_rd"), Some(expected));
}

#[test]
fn resampling_generated_profiles_conserves_volume() {
    let generator = costic_generator(30);
    let envelope = generator
        .costic_shower_distribution(at(2023, 1, 1, 0), at(2023, 1, 31, 23))
        .expect("envelope");
    let total = envelope.sum("Q_ECS_COSTIC").expect("column exists");

    let finer = resample_flow_rate(&envelope, TimeDelta::minutes(30)).expect("upsample");
    let finer_total = finer.sum("Q_ECS_COSTIC").expect("column exists");
    assert!((finer_total - total).abs() <= 0.1 * total);

    let coarser = resample_flow_rate(&envelope, TimeDelta::hours(2)).expect("downsample");
    let coarser_total = coarser.sum("Q_ECS_COSTIC").expect("column exists");
    assert!((coarser_total - total).abs() <= 1e-6 * total);
}

#[test]
fn profile_to_power_pipeline() {
    let generator = costic_generator(30);
    let envelope = generator
        .costic_shower_distribution(at(2023, 1, 1, 0), at(2023, 1, 7, 23))
        .expect("envelope");

    // Downstream tools expect flow_rate-prefixed columns.
    let mut flows = TimeFrame::new(envelope.index().to_vec()).expect("same index");
    flows
        .insert(
            "flow_rate_shower",
            envelope.column("Q_ECS_COSTIC").expect("column exists").to_vec(),
        )
        .expect("matching length");

    let half_hourly = resample_flow_rate(&flows, TimeDelta::minutes(30)).expect("upsample");
    let power = calculate_power(&half_hourly, 35.0, 4186.0).expect("convert");

    assert_eq!(power.column_names(), vec!["P_flow_rate_shower(kW)"]);
    assert_eq!(power.len(), half_hourly.len());

    let flow_sum = half_hourly.sum("flow_rate_shower").expect("column exists");
    let power_sum = power.sum("P_flow_rate_shower(kW)").expect("column exists");
    assert!((power_sum - flow_sum * 4186.0 * 35.0 / 3.6e6).abs() < 1e-9);
}

#[test]
fn generated_profiles_export_to_csv() {
    let generator = costic_generator(8);
    let frame = generator
        .costic_random_shower_distribution(at(2023, 5, 1, 0), at(2023, 5, 2, 23), Some(5))
        .expect("draw");

    let mut buf = Vec::new();
    write_csv(&frame, &mut buf).expect("csv export");
    let csv = String::from_utf8(buf).expect("valid UTF-8");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("timestamp,Q_ECS_COSTIC_rd"));
    assert_eq!(lines.count(), 48);
}
