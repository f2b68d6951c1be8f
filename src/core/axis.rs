use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::core::mapper::{CoordinateMapper, GlucoseYRange};
use crate::core::primitives::SECONDS_PER_HOUR;
use crate::core::types::GlucoseUnits;

/// One value-axis label: its Y position and the display-unit value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub y: f64,
    pub value: Decimal,
}

/// One hourly tick on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourMark {
    pub x: f64,
    pub time_secs: f64,
}

/// Evenly spaced horizontal grid-line Y positions across the glucose plot,
/// `line_count + 1` lines from the top of the range to the bottom.
#[must_use]
pub fn grid_line_ys(range: GlucoseYRange, line_count: u32) -> Vec<f64> {
    if line_count == 0 {
        return Vec::new();
    }
    let step = (range.max_y - range.min_y) / f64::from(line_count);
    (0..=line_count)
        .map(|line| range.min_y + f64::from(line) * step)
        .collect()
}

/// Axis label values for each grid line, top to bottom.
///
/// Values are rounded in mg/dL first, then converted to the display unit, so
/// mg/dL and mmol/L charts label the same physical lines.
#[must_use]
pub fn glucose_axis_labels(
    range: GlucoseYRange,
    line_count: u32,
    units: GlucoseUnits,
) -> Vec<AxisLabel> {
    if line_count == 0 {
        return Vec::new();
    }
    let y_step = (range.max_y - range.min_y) / f64::from(line_count);
    let value_step = (range.max_value - range.min_value) / f64::from(line_count);

    (0..=line_count)
        .filter_map(|line| {
            let mgdl = (range.max_value - f64::from(line) * value_step).round();
            let value = Decimal::from_f64(mgdl)?;
            Some(AxisLabel {
                y: range.min_y + f64::from(line) * y_step,
                value: units.display_value(value),
            })
        })
        .collect()
}

/// Hourly tick marks anchored at the top of the anchor time's hour, spanning
/// twice the visible hours so a scrolled canvas keeps its ticks.
#[must_use]
pub fn hour_marks(mapper: &CoordinateMapper) -> Vec<HourMark> {
    let first_hour = (mapper.anchor() / SECONDS_PER_HOUR).floor() * SECONDS_PER_HOUR;
    let count = mapper.viewport().hours_visible * 2;

    (0..count)
        .map(|hour| {
            let time_secs = first_hour + f64::from(hour) * SECONDS_PER_HOUR;
            HourMark {
                x: mapper.time_to_x(time_secs),
                time_secs,
            }
        })
        .collect()
}
