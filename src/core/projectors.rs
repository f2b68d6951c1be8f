use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::interpolate::interpolated_point;
use crate::core::mapper::CoordinateMapper;
use crate::core::primitives::{PREDICTION_STEP_SECONDS, decimal_to_f64};
use crate::core::types::{
    CarbEvent, DoseEvent, GlucoseSample, PixelPoint, PixelRect, PredictionKind, PredictionSeries,
};
use crate::error::ChartResult;

/// A magnitude-carrying dot: the ellipse rect, the raw source value for its
/// label, and the anchor the label is positioned at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotInfo {
    pub rect: PixelRect,
    pub value: Decimal,
    pub label_anchor: PixelPoint,
}

/// Projects glucose samples as fixed-size dots on the plotted curve.
pub fn project_glucose_dots(
    samples: &[GlucoseSample],
    mapper: &CoordinateMapper,
) -> Vec<PixelRect> {
    let side = mapper.layout().glucose_dot_side;
    let project = |sample: &GlucoseSample| {
        PixelRect::centered_square(mapper.point(sample.time_secs(), sample.value), side)
    };

    #[cfg(feature = "parallel-projection")]
    {
        samples.par_iter().map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        samples.iter().map(project).collect()
    }
}

/// Projects bolus events as dots sized by delivered units, centered on the
/// interpolated glucose curve, labeled below the dot.
pub fn project_dose_dots(
    doses: &[DoseEvent],
    samples: &[GlucoseSample],
    mapper: &CoordinateMapper,
) -> ChartResult<Vec<DotInfo>> {
    let layout = mapper.layout();
    let mut dots = Vec::with_capacity(doses.len());
    for dose in doses {
        let amount = decimal_to_f64(dose.amount_units, "bolus amount")?;
        let side = layout.bolus_dot_base + amount * layout.bolus_dot_scale;
        let center = interpolated_point(dose.time_secs(), samples, mapper, 0.0);
        let rect = PixelRect::centered_square(center, side);
        dots.push(DotInfo {
            rect,
            value: dose.amount_units,
            label_anchor: PixelPoint::new(
                rect.center_x(),
                rect.max_y() + layout.bolus_label_offset,
            ),
        });
    }
    Ok(dots)
}

/// Projects carb events as dots sized by grams, labeled above the dot.
pub fn project_carb_dots(
    carbs: &[CarbEvent],
    samples: &[GlucoseSample],
    mapper: &CoordinateMapper,
) -> ChartResult<Vec<DotInfo>> {
    let layout = mapper.layout();
    let mut dots = Vec::with_capacity(carbs.len());
    for carb in carbs {
        let grams = decimal_to_f64(carb.grams, "carb grams")?;
        let side = layout.carb_dot_base + grams * layout.carb_dot_scale;
        let center = interpolated_point(carb.time_secs(), samples, mapper, 0.0);
        let rect = PixelRect::centered_square(center, side);
        dots.push(DotInfo {
            rect,
            value: carb.grams,
            label_anchor: PixelPoint::new(rect.center_x(), rect.y - layout.carb_label_offset),
        });
    }
    Ok(dots)
}

/// Projects one named prediction series: the i-th point sits at
/// `delivered_at + i * 5 minutes`.
pub fn project_prediction_dots(
    kind: PredictionKind,
    series: &PredictionSeries,
    delivered_at_secs: f64,
    mapper: &CoordinateMapper,
) -> Vec<PixelRect> {
    let side = mapper.layout().prediction_dot_side;
    let values = series.values(kind);

    let project = |(index, value): (usize, &f64)| {
        let time = delivered_at_secs + index as f64 * PREDICTION_STEP_SECONDS;
        PixelRect::centered_square(mapper.point(time, *value), side)
    };

    #[cfg(feature = "parallel-projection")]
    {
        values.par_iter().enumerate().map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        values.iter().enumerate().map(project).collect()
    }
}
