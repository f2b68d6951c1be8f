use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::layout::ChartLayout;
use crate::core::primitives::{PREDICTION_STEP_SECONDS, SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::core::types::{GlucoseSample, PixelPoint, PredictionSeries, Viewport};
use crate::error::{ChartError, ChartResult};

/// Physiological value bounds (mg/dL) across every value-bearing series in
/// scope: glucose samples unioned with all prediction points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBounds {
    min: f64,
    max: f64,
}

impl ValueBounds {
    pub fn new(min: f64, max: f64) -> ChartResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ChartError::InvalidData(
                "value bounds must be finite with min < max".to_owned(),
            ));
        }
        Ok(Self { min, max })
    }

    /// Fits bounds from glucose samples and prediction points.
    ///
    /// Each side falls back to the layout default when no glucose samples
    /// exist; prediction values still widen the fitted range.
    pub fn from_series(
        samples: &[GlucoseSample],
        predictions: Option<&PredictionSeries>,
        layout: &ChartLayout,
    ) -> ChartResult<Self> {
        for sample in samples {
            if !sample.value.is_finite() {
                return Err(ChartError::InvalidData(
                    "glucose values must be finite".to_owned(),
                ));
            }
        }

        let mut min = samples
            .iter()
            .map(|sample| OrderedFloat(sample.value))
            .min()
            .map_or(layout.fallback_min_glucose, |value| value.0);
        let mut max = samples
            .iter()
            .map(|sample| OrderedFloat(sample.value))
            .max()
            .map_or(layout.fallback_max_glucose, |value| value.0);

        if let Some(series) = predictions {
            for kind in crate::core::types::PredictionKind::ALL {
                for value in series.values(kind) {
                    if !value.is_finite() {
                        return Err(ChartError::InvalidData(
                            "prediction values must be finite".to_owned(),
                        ));
                    }
                    min = min.min(*value);
                    max = max.max(*value);
                }
            }
        }

        // A flat series would collapse the value axis; pad like a scale fit.
        if min == max {
            min -= 1.0;
            max += 1.0;
        }

        Self::new(min, max)
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }
}

/// Axis-label tuple for the glucose value axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseYRange {
    pub min_value: f64,
    pub min_y: f64,
    pub max_value: f64,
    pub max_y: f64,
}

/// Affine, invertible mapping between `(time, value)` pairs and pixel space.
///
/// Time maps left-to-right anchored at `anchor_time` (the earliest glucose
/// sample, or one day before "now" when none exists); value maps inverted
/// (larger value, smaller Y) into the band between the basal lane and the
/// time-axis lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    viewport: Viewport,
    layout: ChartLayout,
    bounds: ValueBounds,
    anchor_time: f64,
    px_per_second: f64,
    px_per_value: f64,
}

/// Time origin of the X axis: the earliest sample, else one day before `now`.
#[must_use]
pub fn anchor_time(samples: &[GlucoseSample], now_secs: f64) -> f64 {
    samples
        .first()
        .map_or(now_secs - SECONDS_PER_DAY, |sample| sample.time_secs())
}

impl CoordinateMapper {
    pub fn new(
        viewport: Viewport,
        layout: ChartLayout,
        bounds: ValueBounds,
        anchor_time: f64,
    ) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
                hours_visible: viewport.hours_visible,
            });
        }
        let layout = layout.validate()?;
        if !anchor_time.is_finite() {
            return Err(ChartError::InvalidData(
                "anchor time must be finite".to_owned(),
            ));
        }

        let plot_height = f64::from(viewport.height) - layout.plot_top() - layout.bottom_padding;
        if plot_height <= 0.0 {
            return Err(ChartError::InvalidData(
                "viewport height leaves no room for the glucose plot".to_owned(),
            ));
        }

        let px_per_second =
            f64::from(viewport.width) / (f64::from(viewport.hours_visible) * SECONDS_PER_HOUR);
        let px_per_value = plot_height / (bounds.max() - bounds.min());

        Ok(Self {
            viewport,
            layout,
            bounds,
            anchor_time,
            px_per_second,
            px_per_value,
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn layout(&self) -> ChartLayout {
        self.layout
    }

    #[must_use]
    pub fn bounds(&self) -> ValueBounds {
        self.bounds
    }

    #[must_use]
    pub fn anchor(&self) -> f64 {
        self.anchor_time
    }

    #[must_use]
    pub fn time_to_x(&self, time_secs: f64) -> f64 {
        (time_secs - self.anchor_time) * self.px_per_second
    }

    #[must_use]
    pub fn x_to_time(&self, x: f64) -> f64 {
        self.anchor_time + x / self.px_per_second
    }

    #[must_use]
    pub fn value_to_y(&self, value: f64) -> f64 {
        f64::from(self.viewport.height)
            - self.layout.bottom_padding
            - (value - self.bounds.min()) * self.px_per_value
    }

    #[must_use]
    pub fn y_to_value(&self, y: f64) -> f64 {
        self.bounds.min()
            + (f64::from(self.viewport.height) - self.layout.bottom_padding - y) / self.px_per_value
    }

    #[must_use]
    pub fn point(&self, time_secs: f64, value: f64) -> PixelPoint {
        PixelPoint::new(self.time_to_x(time_secs), self.value_to_y(value))
    }

    /// Axis-label tuple covering the fitted glucose range.
    #[must_use]
    pub fn glucose_y_range(&self) -> GlucoseYRange {
        GlucoseYRange {
            min_value: self.bounds.min(),
            min_y: self.value_to_y(self.bounds.max()),
            max_value: self.bounds.max(),
            max_y: self.value_to_y(self.bounds.min()),
        }
    }

    /// Extra width needed past the last sample so prediction points stay
    /// visible, never less than the configured minimum.
    #[must_use]
    pub fn trailing_width(
        &self,
        predictions: Option<&PredictionSeries>,
        delivered_at_secs: Option<f64>,
        last_sample_secs: Option<f64>,
    ) -> f64 {
        let (Some(series), Some(delivered_at), Some(last_sample)) =
            (predictions, delivered_at_secs, last_sample_secs)
        else {
            return self.layout.min_trailing_width;
        };
        if series.is_empty() {
            return self.layout.min_trailing_width;
        }

        let horizon_secs = series.max_len() as f64 * PREDICTION_STEP_SECONDS;
        let lead_secs = last_sample - delivered_at;
        let trailing = (horizon_secs - lead_secs) * self.px_per_second;
        trailing.max(self.layout.min_trailing_width)
    }

    /// Full canvas width for the embedding scroll view: the projected extent
    /// of the last event plus the trailing prediction width.
    #[must_use]
    pub fn canvas_width(
        &self,
        last_event_secs: f64,
        predictions: Option<&PredictionSeries>,
        delivered_at_secs: Option<f64>,
    ) -> f64 {
        let data_width = self.time_to_x(last_event_secs).max(0.0);
        data_width + self.trailing_width(predictions, delivered_at_secs, Some(last_event_secs))
    }
}
