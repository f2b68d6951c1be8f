use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::axis::{AxisLabel, HourMark};
use crate::core::mapper::GlucoseYRange;
use crate::core::projectors::DotInfo;
use crate::core::types::{PixelPoint, PixelRect, PredictionKind};
use crate::error::{ChartError, ChartResult};

/// Identifier of one independently recomputed geometry subset.
///
/// Subsets have disjoint inputs and outputs; each carries its own sequence
/// counter and published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometrySubset {
    BasalPath,
    GlucoseDots,
    BolusDots,
    CarbDots,
    TempTargetBands,
    PredictionDots(PredictionKind),
}

impl GeometrySubset {
    pub const ALL: [Self; 9] = [
        Self::BasalPath,
        Self::GlucoseDots,
        Self::BolusDots,
        Self::CarbDots,
        Self::TempTargetBands,
        Self::PredictionDots(PredictionKind::Iob),
        Self::PredictionDots(PredictionKind::Cob),
        Self::PredictionDots(PredictionKind::Zt),
        Self::PredictionDots(PredictionKind::Uam),
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::BasalPath => 0,
            Self::GlucoseDots => 1,
            Self::BolusDots => 2,
            Self::CarbDots => 3,
            Self::TempTargetBands => 4,
            Self::PredictionDots(PredictionKind::Iob) => 5,
            Self::PredictionDots(PredictionKind::Cob) => 6,
            Self::PredictionDots(PredictionKind::Zt) => 7,
            Self::PredictionDots(PredictionKind::Uam) => 8,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BasalPath => "basal_path",
            Self::GlucoseDots => "glucose_dots",
            Self::BolusDots => "bolus_dots",
            Self::CarbDots => "carb_dots",
            Self::TempTargetBands => "temp_target_bands",
            Self::PredictionDots(PredictionKind::Iob) => "prediction_dots_iob",
            Self::PredictionDots(PredictionKind::Cob) => "prediction_dots_cob",
            Self::PredictionDots(PredictionKind::Zt) => "prediction_dots_zt",
            Self::PredictionDots(PredictionKind::Uam) => "prediction_dots_uam",
        }
    }
}

/// Lifecycle of a subset as observed from the interactive thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsetState {
    Idle,
    Computing,
    Published,
}

/// Basal lane output: the effective staircase (overrides applied) and the
/// schedule-only reference path drawn under it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasalGeometry {
    pub effective_path: Vec<PixelPoint>,
    pub scheduled_path: Vec<PixelPoint>,
}

/// Glucose subset output: the dot set plus the axis geometry derived from
/// the same fitted value bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseGeometry {
    pub dots: Vec<PixelRect>,
    pub y_range: GlucoseYRange,
    pub grid_line_ys: Vec<f64>,
    pub axis_labels: Vec<AxisLabel>,
    pub hour_marks: Vec<HourMark>,
    /// Canvas width the embedding scroll view should allocate.
    pub canvas_width: f64,
}

/// Immutable payload published for one subset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SubsetGeometry {
    #[default]
    Empty,
    Basal(BasalGeometry),
    Glucose(GlucoseGeometry),
    Dots(Vec<DotInfo>),
    PredictionDots(Vec<PixelRect>),
    Bands(Vec<PixelRect>),
}

/// A published subset snapshot: the geometry and the sequence number of the
/// trigger that produced it. `seq == 0` means nothing was published yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishedSubset {
    pub seq: u64,
    pub geometry: SubsetGeometry,
}

/// Read-side bundle of the currently published subsets.
///
/// Each entry is the `Arc` published at collection time; the bundle stays
/// coherent per subset even while newer computations land afterwards.
#[derive(Debug, Clone)]
pub struct ChartGeometry {
    subsets: IndexMap<GeometrySubset, Arc<PublishedSubset>>,
}

impl ChartGeometry {
    pub(crate) fn new(subsets: IndexMap<GeometrySubset, Arc<PublishedSubset>>) -> Self {
        Self { subsets }
    }

    #[must_use]
    pub fn subset(&self, subset: GeometrySubset) -> Option<&PublishedSubset> {
        self.subsets.get(&subset).map(Arc::as_ref)
    }

    #[must_use]
    pub fn basal(&self) -> Option<&BasalGeometry> {
        match self.subset(GeometrySubset::BasalPath)? {
            PublishedSubset {
                geometry: SubsetGeometry::Basal(basal),
                ..
            } => Some(basal),
            _ => None,
        }
    }

    #[must_use]
    pub fn glucose(&self) -> Option<&GlucoseGeometry> {
        match self.subset(GeometrySubset::GlucoseDots)? {
            PublishedSubset {
                geometry: SubsetGeometry::Glucose(glucose),
                ..
            } => Some(glucose),
            _ => None,
        }
    }

    #[must_use]
    pub fn boluses(&self) -> Option<&[DotInfo]> {
        match self.subset(GeometrySubset::BolusDots)? {
            PublishedSubset {
                geometry: SubsetGeometry::Dots(dots),
                ..
            } => Some(dots.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn carbs(&self) -> Option<&[DotInfo]> {
        match self.subset(GeometrySubset::CarbDots)? {
            PublishedSubset {
                geometry: SubsetGeometry::Dots(dots),
                ..
            } => Some(dots.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn temp_target_bands(&self) -> Option<&[PixelRect]> {
        match self.subset(GeometrySubset::TempTargetBands)? {
            PublishedSubset {
                geometry: SubsetGeometry::Bands(bands),
                ..
            } => Some(bands.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn predictions(&self, kind: PredictionKind) -> Option<&[PixelRect]> {
        match self.subset(GeometrySubset::PredictionDots(kind))? {
            PublishedSubset {
                geometry: SubsetGeometry::PredictionDots(dots),
                ..
            } => Some(dots.as_slice()),
            _ => None,
        }
    }

    /// Serializes every published subset keyed by its label, for snapshot
    /// diffing and fixture tests.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        let labeled: IndexMap<&'static str, &PublishedSubset> = self
            .subsets
            .iter()
            .map(|(subset, published)| (subset.label(), published.as_ref()))
            .collect();
        serde_json::to_string_pretty(&labeled).map_err(|err| {
            ChartError::InvalidData(format!("snapshot serialization failed: {err}"))
        })
    }
}
