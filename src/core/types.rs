use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, minutes_to_seconds};
use crate::error::{ChartError, ChartResult};

/// Drawing surface supplied by the embedding view per render pass.
///
/// `hours_visible` is the zoom level: the number of timeline hours the full
/// pixel width represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub hours_visible: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32, hours_visible: u32) -> Self {
        Self {
            width,
            height,
            hours_visible,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0 && self.hours_visible > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a square rect of the given side length centered on `center`.
    #[must_use]
    pub fn centered_square(center: PixelPoint, side: f64) -> Self {
        Self {
            x: center.x - side / 2.0,
            y: center.y - side / 2.0,
            width: side,
            height: side,
        }
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn max_y(self) -> f64 {
        self.y + self.height
    }
}

/// Display units for glucose concentration labels.
///
/// Geometry is always computed in mg/dL; the unit only affects axis-label
/// values handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GlucoseUnits {
    #[default]
    MgDl,
    MmolL,
}

impl GlucoseUnits {
    /// mg/dL to mmol/L conversion factor.
    pub const EXCHANGE_RATE: Decimal = Decimal::from_parts(555, 0, 0, false, 4);

    /// Converts a mg/dL label value into this display unit.
    pub fn display_value(self, mgdl: Decimal) -> Decimal {
        match self {
            Self::MgDl => mgdl,
            Self::MmolL => mgdl * Self::EXCHANGE_RATE,
        }
    }
}

/// A single sensor glucose reading in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl GlucoseSample {
    pub fn new(time: DateTime<Utc>, value: f64) -> ChartResult<Self> {
        if !value.is_finite() {
            return Err(ChartError::InvalidData(
                "glucose value must be finite".to_owned(),
            ));
        }
        Ok(Self { time, value })
    }

    #[must_use]
    pub fn time_secs(self) -> f64 {
        datetime_to_unix_seconds(self.time)
    }
}

/// An insulin bolus delivery event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub time: DateTime<Utc>,
    pub amount_units: Decimal,
}

impl DoseEvent {
    pub fn new(time: DateTime<Utc>, amount_units: Decimal) -> ChartResult<Self> {
        if amount_units.is_sign_negative() {
            return Err(ChartError::InvalidData(
                "bolus amount must be non-negative".to_owned(),
            ));
        }
        Ok(Self { time, amount_units })
    }

    #[must_use]
    pub fn time_secs(self) -> f64 {
        datetime_to_unix_seconds(self.time)
    }
}

/// A carbohydrate intake event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbEvent {
    pub time: DateTime<Utc>,
    pub grams: Decimal,
}

impl CarbEvent {
    pub fn new(time: DateTime<Utc>, grams: Decimal) -> ChartResult<Self> {
        if grams.is_sign_negative() {
            return Err(ChartError::InvalidData(
                "carb grams must be non-negative".to_owned(),
            ));
        }
        Ok(Self { time, grams })
    }

    #[must_use]
    pub fn time_secs(self) -> f64 {
        datetime_to_unix_seconds(self.time)
    }
}

/// One entry of the recurring daily basal schedule.
///
/// The schedule as a whole is expected sorted by `minutes_from_midnight` and
/// covering the full day: the last entry's rate holds until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBasalEntry {
    pub minutes_from_midnight: u32,
    pub rate_per_hour: Decimal,
}

impl ScheduledBasalEntry {
    pub fn new(minutes_from_midnight: u32, rate_per_hour: Decimal) -> ChartResult<Self> {
        if minutes_from_midnight >= 1440 {
            return Err(ChartError::InvalidData(
                "schedule entry minutes must be < 1440".to_owned(),
            ));
        }
        if rate_per_hour.is_sign_negative() {
            return Err(ChartError::InvalidData(
                "basal rate must be non-negative".to_owned(),
            ));
        }
        Ok(Self {
            minutes_from_midnight,
            rate_per_hour,
        })
    }
}

/// A temporary basal rate superseding the schedule for its interval.
///
/// Overrides are expected temporally ordered and mutually non-overlapping;
/// that precondition is an upstream contract and is not validated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempBasalOverride {
    pub start: DateTime<Utc>,
    pub duration_minutes: f64,
    pub rate_per_hour: Decimal,
}

impl TempBasalOverride {
    pub fn new(
        start: DateTime<Utc>,
        duration_minutes: f64,
        rate_per_hour: Decimal,
    ) -> ChartResult<Self> {
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(ChartError::InvalidData(
                "override duration must be finite and non-negative".to_owned(),
            ));
        }
        if rate_per_hour.is_sign_negative() {
            return Err(ChartError::InvalidData(
                "override rate must be non-negative".to_owned(),
            ));
        }
        Ok(Self {
            start,
            duration_minutes,
            rate_per_hour,
        })
    }

    #[must_use]
    pub fn start_secs(self) -> f64 {
        datetime_to_unix_seconds(self.start)
    }

    #[must_use]
    pub fn end_secs(self) -> f64 {
        self.start_secs() + minutes_to_seconds(self.duration_minutes)
    }
}

/// A temporary glycemic target window, bounds in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempTargetWindow {
    pub start: DateTime<Utc>,
    pub duration_minutes: f64,
    pub low_bound: f64,
    pub high_bound: f64,
}

impl TempTargetWindow {
    pub fn new(
        start: DateTime<Utc>,
        duration_minutes: f64,
        low_bound: f64,
        high_bound: f64,
    ) -> ChartResult<Self> {
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(ChartError::InvalidData(
                "target duration must be finite and non-negative".to_owned(),
            ));
        }
        if !low_bound.is_finite() || !high_bound.is_finite() || low_bound > high_bound {
            return Err(ChartError::InvalidData(
                "target bounds must be finite with low <= high".to_owned(),
            ));
        }
        Ok(Self {
            start,
            duration_minutes,
            low_bound,
            high_bound,
        })
    }

    #[must_use]
    pub fn start_secs(self) -> f64 {
        datetime_to_unix_seconds(self.start)
    }

    #[must_use]
    pub fn end_secs(self) -> f64 {
        self.start_secs() + minutes_to_seconds(self.duration_minutes)
    }
}

/// The four named future-glucose trajectories output by the dosing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionKind {
    Iob,
    Cob,
    Zt,
    Uam,
}

impl PredictionKind {
    pub const ALL: [Self; 4] = [Self::Iob, Self::Cob, Self::Zt, Self::Uam];
}

/// Prediction values in mg/dL, each series implicitly time-indexed at a fixed
/// 5-minute step from a shared anchor timestamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionSeries {
    pub iob: Vec<f64>,
    pub cob: Vec<f64>,
    pub zt: Vec<f64>,
    pub uam: Vec<f64>,
}

impl PredictionSeries {
    #[must_use]
    pub fn values(&self, kind: PredictionKind) -> &[f64] {
        match kind {
            PredictionKind::Iob => &self.iob,
            PredictionKind::Cob => &self.cob,
            PredictionKind::Zt => &self.zt,
            PredictionKind::Uam => &self.uam,
        }
    }

    /// Length of the longest of the four series.
    #[must_use]
    pub fn max_len(&self) -> usize {
        PredictionKind::ALL
            .iter()
            .map(|kind| self.values(*kind).len())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_len() == 0
    }
}

/// Half-open `[start, end)` interval in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> ChartResult<Self> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ChartError::InvalidData(
                "time window must be finite with start < end".to_owned(),
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}
