pub mod axis;
pub mod basal;
pub mod interpolate;
pub mod layout;
pub mod mapper;
pub mod primitives;
pub mod projectors;
pub mod targets;
pub mod types;

pub use layout::ChartLayout;
pub use mapper::{CoordinateMapper, GlucoseYRange, ValueBounds};
pub use types::{
    CarbEvent, DoseEvent, GlucoseSample, GlucoseUnits, PixelPoint, PixelRect, PredictionKind,
    PredictionSeries, ScheduledBasalEntry, TempBasalOverride, TempTargetWindow, TimeWindow,
    Viewport,
};
