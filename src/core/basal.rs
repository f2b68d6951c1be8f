use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::mapper::CoordinateMapper;
use crate::core::primitives::{
    SECONDS_PER_DAY, SECONDS_PER_MINUTE, datetime_to_unix_seconds, decimal_to_f64,
};
use crate::core::types::{PixelPoint, ScheduledBasalEntry, TempBasalOverride, TimeWindow};
use crate::error::{ChartError, ChartResult};

/// A point where the delivered basal rate changes.
///
/// `rate` holds from `time` until the next breakpoint (right-continuous step
/// function).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBreakpoint {
    pub time: f64,
    pub rate: f64,
}

/// Reconstructs the effective delivered rate over `window`: the recurring
/// daily schedule overlaid with temporary overrides.
///
/// Overrides are trusted as ordered and non-overlapping (upstream contract).
/// Violations stay crash-free: overrides are processed in given order and a
/// later override silently wins over an earlier one still open at its start.
/// An override starting exactly on a schedule breakpoint takes precedence.
pub fn effective_rate_breakpoints(
    schedule: &[ScheduledBasalEntry],
    overrides: &[TempBasalOverride],
    window: TimeWindow,
    schedule_offset: FixedOffset,
) -> ChartResult<Vec<RateBreakpoint>> {
    if schedule.is_empty() {
        return Ok(Vec::new());
    }

    let expanded = expand_schedule(schedule, window.start, schedule_offset)?;
    let mut out = Vec::new();
    let mut cursor = window.start;

    for tb in overrides {
        let start = tb.start_secs();
        let end = tb.end_secs();
        if end <= window.start || start >= window.end {
            continue;
        }

        let segment_end = start.min(window.end);
        if cursor < segment_end {
            schedule_points_in(&expanded, cursor, segment_end, &mut out);
        }
        out.push(RateBreakpoint {
            time: start.max(window.start),
            rate: decimal_to_f64(tb.rate_per_hour, "override rate")?,
        });
        cursor = end.min(window.end).max(window.start);
    }

    if cursor < window.end {
        schedule_points_in(&expanded, cursor, window.end, &mut out);
    }

    Ok(out)
}

/// Schedule-only reconstruction, ignoring overrides. Used for the stroked
/// profile reference path drawn under the effective staircase.
pub fn schedule_rate_breakpoints(
    schedule: &[ScheduledBasalEntry],
    window: TimeWindow,
    schedule_offset: FixedOffset,
) -> ChartResult<Vec<RateBreakpoint>> {
    effective_rate_breakpoints(schedule, &[], window, schedule_offset)
}

/// The rate in force at a single instant; the oracle form of the staircase.
///
/// Returns `None` when the schedule is empty. Later overrides win when
/// overrides overlap, matching `effective_rate_breakpoints`.
pub fn effective_rate_at(
    schedule: &[ScheduledBasalEntry],
    overrides: &[TempBasalOverride],
    time_secs: f64,
    schedule_offset: FixedOffset,
) -> ChartResult<Option<f64>> {
    for tb in overrides.iter().rev() {
        if time_secs >= tb.start_secs() && time_secs < tb.end_secs() {
            return decimal_to_f64(tb.rate_per_hour, "override rate").map(Some);
        }
    }

    let Some(last_entry) = schedule.last() else {
        return Ok(None);
    };

    let day_start = day_start_secs(time_secs, schedule_offset)?;
    let secs_into_day = time_secs - day_start;

    // The last entry's rate holds across the midnight wraparound.
    let mut active = last_entry.rate_per_hour;
    for entry in schedule {
        if f64::from(entry.minutes_from_midnight) * SECONDS_PER_MINUTE <= secs_into_day {
            active = entry.rate_per_hour;
        } else {
            break;
        }
    }

    decimal_to_f64(active, "schedule rate").map(Some)
}

/// Projects rate breakpoints into the basal lane as a staircase polyline:
/// a horizontal run per held rate, a vertical jump per change, extrapolated
/// at the last known rate out to `end_time_secs`.
///
/// `max_basal` fixes the pixels-per-rate-unit scale so the lane top equals
/// the pump's maximum rate.
pub fn project_basal_staircase(
    breakpoints: &[RateBreakpoint],
    end_time_secs: f64,
    mapper: &CoordinateMapper,
    max_basal: f64,
) -> ChartResult<Vec<PixelPoint>> {
    if breakpoints.is_empty() {
        return Ok(Vec::new());
    }
    if !max_basal.is_finite() || max_basal <= 0.0 {
        return Err(ChartError::InvalidData(
            "max basal rate must be finite and > 0".to_owned(),
        ));
    }

    let lane_height = mapper.layout().basal_lane_height;
    let px_per_rate = lane_height / max_basal;
    let rate_to_y = |rate: f64| lane_height - rate * px_per_rate;

    let mut path = Vec::with_capacity(breakpoints.len() * 2 + 1);
    let first = breakpoints[0];
    let mut held_y = rate_to_y(first.rate);
    path.push(PixelPoint::new(mapper.time_to_x(first.time), held_y));

    for bp in &breakpoints[1..] {
        let x = mapper.time_to_x(bp.time);
        let y = rate_to_y(bp.rate);
        path.push(PixelPoint::new(x, held_y));
        if y != held_y {
            path.push(PixelPoint::new(x, y));
            held_y = y;
        }
    }

    path.push(PixelPoint::new(mapper.time_to_x(end_time_secs), held_y));
    Ok(path)
}

/// Expands the recurring schedule across the calendar day containing
/// `window_start` and the two following days, so any window spanning a
/// midnight boundary stays covered.
fn expand_schedule(
    schedule: &[ScheduledBasalEntry],
    window_start: f64,
    schedule_offset: FixedOffset,
) -> ChartResult<Vec<RateBreakpoint>> {
    let day_start = day_start_secs(window_start, schedule_offset)?;

    let mut expanded = Vec::with_capacity(schedule.len() * 3);
    for day in 0..3 {
        let day_offset = day_start + f64::from(day) * SECONDS_PER_DAY;
        for entry in schedule {
            expanded.push(RateBreakpoint {
                time: day_offset
                    + f64::from(entry.minutes_from_midnight) * SECONDS_PER_MINUTE,
                rate: decimal_to_f64(entry.rate_per_hour, "schedule rate")?,
            });
        }
    }
    Ok(expanded)
}

/// Emits one breakpoint at `from` with the rate active there, then one per
/// expanded schedule breakpoint strictly inside `[from, to)`. The strict
/// upper bound is what gives an override starting exactly on a schedule
/// breakpoint precedence over it.
fn schedule_points_in(expanded: &[RateBreakpoint], from: f64, to: f64, out: &mut Vec<RateBreakpoint>) {
    if let Some(last) = expanded.last()
        && from >= last.time
    {
        out.push(RateBreakpoint {
            time: from,
            rate: last.rate,
        });
        return;
    }

    // Before the day's first entry the previous day's last rate still holds.
    if let (Some(first), Some(last)) = (expanded.first(), expanded.last())
        && from < first.time
    {
        out.push(RateBreakpoint {
            time: from,
            rate: last.rate,
        });
    }

    for pair in expanded.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.time < from && next.time > from {
            out.push(RateBreakpoint {
                time: from,
                rate: current.rate,
            });
        } else if current.time >= from && current.time < to {
            out.push(current);
        }
    }
}

fn day_start_secs(time_secs: f64, schedule_offset: FixedOffset) -> ChartResult<f64> {
    if !time_secs.is_finite() {
        return Err(ChartError::InvalidData(
            "timestamp must be finite".to_owned(),
        ));
    }
    let utc = DateTime::<Utc>::from_timestamp(time_secs as i64, 0).ok_or_else(|| {
        ChartError::InvalidData("timestamp out of representable range".to_owned())
    })?;
    let local = utc.with_timezone(&schedule_offset);
    let midnight = local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ChartError::InvalidData("cannot construct local midnight".to_owned()))?
        .and_local_timezone(schedule_offset)
        .single()
        .ok_or_else(|| ChartError::InvalidData("ambiguous local midnight".to_owned()))?;
    Ok(datetime_to_unix_seconds(midnight.with_timezone(&Utc)))
}
