use crate::core::mapper::CoordinateMapper;
use crate::core::types::{GlucoseSample, PixelPoint};

/// Estimates where a dependent event at `time_secs` sits on the plotted
/// glucose curve.
///
/// Interpolation happens in pixel space, not value space: both bracketing
/// samples are projected first and the query's fractional X position is
/// applied to the Y span. That keeps dependent geometry visually glued to
/// the drawn curve.
///
/// Boundary behavior: before the first sample the first sample's value is
/// used; past the last sample the last sample's value; for an empty series
/// the caller-supplied `default_value`.
#[must_use]
pub fn interpolated_point(
    time_secs: f64,
    samples: &[GlucoseSample],
    mapper: &CoordinateMapper,
    default_value: f64,
) -> PixelPoint {
    let x = mapper.time_to_x(time_secs);

    let next_index = samples
        .iter()
        .position(|sample| sample.time_secs() > time_secs);

    match next_index {
        None => {
            let value = samples.last().map_or(default_value, |sample| sample.value);
            PixelPoint::new(x, mapper.value_to_y(value))
        }
        Some(0) => {
            let value = samples.first().map_or(default_value, |sample| sample.value);
            PixelPoint::new(x, mapper.value_to_y(value))
        }
        Some(next) => {
            let prev = samples[next - 1];
            let next = samples[next];
            let prev_px = mapper.point(prev.time_secs(), prev.value);
            let next_px = mapper.point(next.time_secs(), next.value);

            let span = next_px.x - prev_px.x;
            if span == 0.0 {
                return PixelPoint::new(x, prev_px.y);
            }
            let fraction = (x - prev_px.x) / span;
            PixelPoint::new(x, prev_px.y + (next_px.y - prev_px.y) * fraction)
        }
    }
}

/// Value-domain form of [`interpolated_point`], recovered through the
/// mapper's inverse Y transform.
#[must_use]
pub fn interpolated_value(
    time_secs: f64,
    samples: &[GlucoseSample],
    mapper: &CoordinateMapper,
    default_value: f64,
) -> f64 {
    mapper.y_to_value(interpolated_point(time_secs, samples, mapper, default_value).y)
}
