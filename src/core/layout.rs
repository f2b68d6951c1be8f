use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Tuning controls for timeline layout and event dot sizing.
///
/// Pixel paddings partition the viewport vertically: a basal-rate lane at the
/// top, the glucose plot in the middle, a time-axis lane at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Height of the basal-rate lane pinned to the top edge.
    pub basal_lane_height: f64,
    /// Extra padding between the basal lane and the glucose plot.
    pub top_padding: f64,
    /// Height reserved at the bottom for the time axis.
    pub bottom_padding: f64,
    /// Minimum trailing width kept free of the right edge for predictions.
    pub min_trailing_width: f64,
    /// Glucose bound fallbacks (mg/dL) when no value-bearing series exists.
    pub fallback_min_glucose: f64,
    pub fallback_max_glucose: f64,
    /// Number of horizontal grid lines across the glucose plot.
    pub grid_line_count: u32,
    pub glucose_dot_side: f64,
    pub bolus_dot_base: f64,
    /// Extra bolus dot diameter per insulin unit.
    pub bolus_dot_scale: f64,
    pub carb_dot_base: f64,
    /// Extra carb dot diameter per gram.
    pub carb_dot_scale: f64,
    pub prediction_dot_side: f64,
    /// Label anchor offset below a bolus dot.
    pub bolus_label_offset: f64,
    /// Label anchor offset above a carb dot.
    pub carb_label_offset: f64,
    /// Vertical outset applied to temp-target bands beyond their bounds.
    pub target_band_outset: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            basal_lane_height: 60.0,
            top_padding: 20.0,
            bottom_padding: 50.0,
            min_trailing_width: 150.0,
            fallback_min_glucose: 70.0,
            fallback_max_glucose: 450.0,
            grid_line_count: 5,
            glucose_dot_side: 4.0,
            bolus_dot_base: 8.0,
            bolus_dot_scale: 3.0,
            carb_dot_base: 10.0,
            carb_dot_scale: 0.3,
            prediction_dot_side: 4.0,
            bolus_label_offset: 8.0,
            carb_label_offset: 8.0,
            target_band_outset: 3.0,
        }
    }
}

impl ChartLayout {
    pub fn validate(self) -> ChartResult<Self> {
        let paddings = [
            self.basal_lane_height,
            self.top_padding,
            self.bottom_padding,
            self.min_trailing_width,
            self.target_band_outset,
            self.bolus_label_offset,
            self.carb_label_offset,
        ];
        if paddings.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ChartError::InvalidData(
                "layout paddings must be finite and >= 0".to_owned(),
            ));
        }

        let sizes = [
            self.glucose_dot_side,
            self.bolus_dot_base,
            self.carb_dot_base,
            self.prediction_dot_side,
        ];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ChartError::InvalidData(
                "layout dot sizes must be finite and > 0".to_owned(),
            ));
        }

        if !self.bolus_dot_scale.is_finite()
            || self.bolus_dot_scale < 0.0
            || !self.carb_dot_scale.is_finite()
            || self.carb_dot_scale < 0.0
        {
            return Err(ChartError::InvalidData(
                "layout dot scales must be finite and >= 0".to_owned(),
            ));
        }

        if !self.fallback_min_glucose.is_finite()
            || !self.fallback_max_glucose.is_finite()
            || self.fallback_min_glucose >= self.fallback_max_glucose
        {
            return Err(ChartError::InvalidData(
                "fallback glucose bounds must be finite with min < max".to_owned(),
            ));
        }

        if self.grid_line_count == 0 {
            return Err(ChartError::InvalidData(
                "grid line count must be > 0".to_owned(),
            ));
        }

        Ok(self)
    }

    /// Total vertical space above the glucose plot.
    #[must_use]
    pub fn plot_top(self) -> f64 {
        self.basal_lane_height + self.top_padding
    }
}
