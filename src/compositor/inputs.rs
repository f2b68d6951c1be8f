use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;

use crate::core::layout::ChartLayout;
use crate::core::mapper::{self, CoordinateMapper, ValueBounds};
use crate::core::primitives::{SECONDS_PER_DAY, SECONDS_PER_HOUR, datetime_to_unix_seconds};
use crate::core::types::{
    CarbEvent, DoseEvent, GlucoseSample, GlucoseUnits, PredictionSeries, ScheduledBasalEntry,
    TempBasalOverride, TempTargetWindow, TimeWindow, Viewport,
};
use crate::error::ChartResult;

/// One immutable bundle of everything a compute pass reads.
///
/// Geometry is a pure function of `(ChartInputs, Viewport, ChartLayout)`;
/// that is why the clock (`now`) and the schedule's day-boundary offset are
/// explicit fields instead of ambient reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInputs {
    /// Glucose samples ordered by time (upstream contract).
    pub glucose: Vec<GlucoseSample>,
    pub boluses: Vec<DoseEvent>,
    pub carbs: Vec<CarbEvent>,
    /// Active basal profile, sorted by minutes from midnight.
    pub basal_profile: Vec<ScheduledBasalEntry>,
    /// Temporary overrides, ordered and non-overlapping (upstream contract).
    pub temp_basals: Vec<TempBasalOverride>,
    pub temp_targets: Vec<TempTargetWindow>,
    pub predictions: Option<PredictionSeries>,
    /// Anchor timestamp the prediction series are indexed from.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Pump maximum basal rate; fixes the basal lane's pixel-per-rate scale.
    pub max_basal: Decimal,
    pub units: GlucoseUnits,
    /// Offset determining local midnight for basal schedule expansion.
    pub schedule_offset: FixedOffset,
    pub now: DateTime<Utc>,
}

impl ChartInputs {
    /// Empty inputs at a reference instant. Collections are filled in by the
    /// event store and algorithm-output collaborators.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            glucose: Vec::new(),
            boluses: Vec::new(),
            carbs: Vec::new(),
            basal_profile: Vec::new(),
            temp_basals: Vec::new(),
            temp_targets: Vec::new(),
            predictions: None,
            delivered_at: None,
            max_basal: Decimal::ONE,
            units: GlucoseUnits::MgDl,
            schedule_offset: Utc.fix(),
            now,
        }
    }

    #[must_use]
    pub fn now_secs(&self) -> f64 {
        datetime_to_unix_seconds(self.now)
    }

    #[must_use]
    pub fn anchor_time(&self) -> f64 {
        mapper::anchor_time(&self.glucose, self.now_secs())
    }

    #[must_use]
    pub fn delivered_at_secs(&self) -> Option<f64> {
        self.delivered_at.map(datetime_to_unix_seconds)
    }

    #[must_use]
    pub fn last_sample_secs(&self) -> Option<f64> {
        self.glucose.last().map(|sample| sample.time_secs())
    }

    /// The basal reconstruction window: the trailing day plus a six-hour
    /// forward margin so the staircase reaches the canvas's right edge.
    pub fn basal_window(&self) -> ChartResult<TimeWindow> {
        let now = self.now_secs();
        TimeWindow::new(now - SECONDS_PER_DAY, now + 6.0 * SECONDS_PER_HOUR)
    }

    pub fn value_bounds(&self, layout: &ChartLayout) -> ChartResult<ValueBounds> {
        ValueBounds::from_series(&self.glucose, self.predictions.as_ref(), layout)
    }

    pub fn mapper(&self, viewport: Viewport, layout: ChartLayout) -> ChartResult<CoordinateMapper> {
        CoordinateMapper::new(
            viewport,
            layout,
            self.value_bounds(&layout)?,
            self.anchor_time(),
        )
    }
}
