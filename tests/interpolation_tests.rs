use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use glucochart::core::interpolate::{interpolated_point, interpolated_value};
use glucochart::core::{ChartLayout, CoordinateMapper, GlucoseSample, ValueBounds, Viewport};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
        .single()
        .expect("valid date")
}

fn sample(minutes: i64, value: f64) -> GlucoseSample {
    GlucoseSample::new(base() + Duration::minutes(minutes), value).expect("valid sample")
}

fn secs(minutes: i64) -> f64 {
    (base() + Duration::minutes(minutes)).timestamp() as f64
}

fn test_mapper() -> CoordinateMapper {
    CoordinateMapper::new(
        Viewport::new(1000, 600, 5),
        ChartLayout::default(),
        ValueBounds::new(100.0, 200.0).expect("valid bounds"),
        secs(0),
    )
    .expect("valid mapper")
}

#[test]
fn midpoint_query_lands_halfway_in_pixel_space() {
    let mapper = test_mapper();
    let samples = vec![sample(0, 100.0), sample(10, 200.0)];

    let point = interpolated_point(secs(5), &samples, &mapper, 0.0);

    let y_low = mapper.value_to_y(100.0);
    let y_high = mapper.value_to_y(200.0);
    assert_relative_eq!(point.x, mapper.time_to_x(secs(5)));
    assert_relative_eq!(point.y, (y_low + y_high) / 2.0);
}

#[test]
fn interpolated_value_recovers_the_midpoint() {
    let mapper = test_mapper();
    let samples = vec![sample(0, 100.0), sample(10, 200.0)];

    let value = interpolated_value(secs(5), &samples, &mapper, 0.0);
    assert_relative_eq!(value, 150.0, max_relative = 1e-9);
}

#[test]
fn query_before_first_sample_holds_its_value() {
    let mapper = test_mapper();
    let samples = vec![sample(10, 120.0), sample(20, 180.0)];

    let point = interpolated_point(secs(2), &samples, &mapper, 0.0);

    assert_relative_eq!(point.x, mapper.time_to_x(secs(2)));
    assert_relative_eq!(point.y, mapper.value_to_y(120.0));
}

#[test]
fn query_past_last_sample_holds_its_value() {
    let mapper = test_mapper();
    let samples = vec![sample(0, 120.0), sample(10, 180.0)];

    let point = interpolated_point(secs(30), &samples, &mapper, 0.0);

    assert_relative_eq!(point.x, mapper.time_to_x(secs(30)));
    assert_relative_eq!(point.y, mapper.value_to_y(180.0));
}

#[test]
fn empty_series_uses_the_default_value() {
    let mapper = test_mapper();

    let point = interpolated_point(secs(5), &[], &mapper, 150.0);

    assert_relative_eq!(point.y, mapper.value_to_y(150.0));
}

#[test]
fn coincident_samples_do_not_divide_by_zero() {
    let mapper = test_mapper();
    let samples = vec![sample(10, 120.0), sample(10, 180.0)];

    let point = interpolated_point(secs(10), &samples, &mapper, 0.0);

    assert!(point.y.is_finite());
    assert_relative_eq!(point.y, mapper.value_to_y(180.0));
}

#[test]
fn query_on_a_sample_timestamp_matches_that_sample() {
    let mapper = test_mapper();
    let samples = vec![sample(0, 100.0), sample(10, 180.0), sample(20, 140.0)];

    // Strictly-after bracketing: an exact hit interpolates at fraction 1.0.
    let point = interpolated_point(secs(10), &samples, &mapper, 0.0);
    assert_relative_eq!(point.y, mapper.value_to_y(180.0));
}
